use crate::config::GeoEndpoints;
use crate::domain::ports::GeoProvider;
use crate::utils::error::{EtlError, Result};
use geojson::{FeatureCollection, GeoJson};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Municipal-level GeoJSON mesh at the lowest resolution.
const MESH_QUERY: [(&str, &str); 3] = [
    ("formato", "application/vnd.geo+json"),
    ("qualidade", "minima"),
    ("intrarregiao", "municipio"),
];

/// IBGE mesh and locality services.
#[derive(Debug, Clone)]
pub struct IbgeGeoProvider {
    client: Client,
    endpoints: GeoEndpoints,
}

#[derive(Debug, Deserialize)]
struct Locality {
    id: serde_json::Value,
    nome: String,
}

impl IbgeGeoProvider {
    pub fn new(endpoints: GeoEndpoints, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoints })
    }

    fn boundaries_url(&self, region: &str) -> String {
        format!(
            "{}/estados/{}/",
            self.endpoints.malhas_url.trim_end_matches('/'),
            region
        )
    }

    fn names_url(&self, region: &str) -> String {
        format!(
            "{}/estados/{}/municipios",
            self.endpoints.localidades_url.trim_end_matches('/'),
            region
        )
    }

    async fn get_text(
        &self,
        region: &str,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<String> {
        tracing::debug!("🗺️ GET {} {:?}", url, params);
        let provider_error = |e: reqwest::Error| EtlError::GeoProviderError {
            region: region.to_string(),
            message: e.to_string(),
        };

        // 添加查詢參數
        self.client
            .get(url)
            .query(params)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(provider_error)?
            .text()
            .await
            .map_err(provider_error)
    }
}

impl GeoProvider for IbgeGeoProvider {
    async fn fetch_boundaries(&self, region: &str) -> Result<FeatureCollection> {
        let body = self
            .get_text(region, &self.boundaries_url(region), &MESH_QUERY)
            .await?;

        match body.parse::<GeoJson>() {
            Ok(GeoJson::FeatureCollection(collection)) => Ok(collection),
            Ok(_) => Err(EtlError::GeoProviderError {
                region: region.to_string(),
                message: "boundary response is not a FeatureCollection".to_string(),
            }),
            Err(e) => Err(EtlError::GeoProviderError {
                region: region.to_string(),
                message: format!("invalid GeoJSON: {}", e),
            }),
        }
    }

    async fn fetch_municipality_names(&self, region: &str) -> Result<HashMap<String, String>> {
        let body = self.get_text(region, &self.names_url(region), &[]).await?;
        let localities: Vec<Locality> =
            serde_json::from_str(&body).map_err(|e| EtlError::GeoProviderError {
                region: region.to_string(),
                message: format!("invalid locality list: {}", e),
            })?;

        // id 可能是數字或字串
        Ok(localities
            .into_iter()
            .map(|locality| {
                let code = match locality.id {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (code, locality.nome)
            })
            .collect())
    }
}
