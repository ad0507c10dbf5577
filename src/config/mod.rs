#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod toml_config;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ELECTION_YEAR: u16 = 2024;
pub const DEFAULT_BUCKET_URL: &str = "https://storage.googleapis.com/eleicoes-2024-dados/data";
pub const DEFAULT_MALHAS_URL: &str = "https://servicodados.ibge.gov.br/api/v3/malhas";
pub const DEFAULT_LOCALIDADES_URL: &str = "https://servicodados.ibge.gov.br/api/v1/localidades";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 5;

/// Which backend serves the per-region result files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataSourceConfig {
    Local {
        data_dir: String,
        election_year: u16,
    },
    Remote {
        base_url: String,
        election_year: u16,
    },
    #[cfg(feature = "lambda")]
    S3 {
        bucket: String,
        prefix: String,
        region: String,
        election_year: u16,
    },
}

impl DataSourceConfig {
    pub fn validate(&self) -> crate::utils::error::Result<()> {
        use crate::utils::validation::*;

        match self {
            DataSourceConfig::Local { data_dir, .. } => validate_path("source.data_dir", data_dir),
            DataSourceConfig::Remote { base_url, .. } => validate_url("source.base_url", base_url),
            #[cfg(feature = "lambda")]
            DataSourceConfig::S3 { bucket, region, .. } => {
                validate_non_empty_string("source.bucket", bucket)?;
                validate_non_empty_string("source.region", region)
            }
        }
    }
}

/// IBGE base URLs for boundaries (`malhas`) and municipality names (`localidades`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoEndpoints {
    pub malhas_url: String,
    pub localidades_url: String,
}

impl Default for GeoEndpoints {
    fn default() -> Self {
        Self {
            malhas_url: DEFAULT_MALHAS_URL.to_string(),
            localidades_url: DEFAULT_LOCALIDADES_URL.to_string(),
        }
    }
}

impl GeoEndpoints {
    pub fn validate(&self) -> crate::utils::error::Result<()> {
        crate::utils::validation::validate_url("geo.malhas_url", &self.malhas_url)?;
        crate::utils::validation::validate_url("geo.localidades_url", &self.localidades_url)
    }
}

/// Builds the navigation level from optional state/municipality selections.
pub fn navigation_level(
    state: Option<&str>,
    municipality: Option<&str>,
) -> crate::utils::error::Result<crate::domain::model::NavigationLevel> {
    use crate::domain::model::NavigationLevel;
    use crate::utils::error::EtlError;

    match (state, municipality) {
        (None, None) => Ok(NavigationLevel::Country),
        (Some(region), None) => Ok(NavigationLevel::State {
            region: region.trim().to_uppercase(),
        }),
        (Some(region), Some(municipality)) => Ok(NavigationLevel::Municipality {
            region: region.trim().to_uppercase(),
            municipality: municipality.trim().to_string(),
        }),
        (None, Some(_)) => Err(EtlError::MissingConfigError {
            field: "state (required when a municipality is selected)".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::NavigationLevel;

    #[test]
    fn test_navigation_level_from_selections() {
        assert_eq!(navigation_level(None, None).unwrap(), NavigationLevel::Country);
        assert_eq!(
            navigation_level(Some("sp"), None).unwrap(),
            NavigationLevel::State {
                region: "SP".to_string()
            }
        );
        assert!(navigation_level(None, Some("Santos")).is_err());
    }
}
