use crate::core::geo_match::MapOutcome;
use crate::core::normalize::normalize_name;
use crate::core::session::ReportSession;
use crate::core::views::{self, format_votes};
use crate::domain::model::{ElectionReport, LoadedDataset, NavigationLevel, ReportRequest};
use crate::domain::ports::{DataSource, GeoProvider, Pipeline, Storage};
use crate::utils::error::{EtlError, Result};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use zip::write::{FileOptions, ZipWriter};

pub const SUMMARY_FILE: &str = "summary.json";
pub const WINNERS_FILE: &str = "winners.csv";
pub const PARTY_DISTRIBUTION_FILE: &str = "party_distribution.csv";
pub const STATE_WINNERS_FILE: &str = "state_winners.csv";
pub const STATE_MAP_FILE: &str = "state_map.geojson";
pub const MUNICIPALITY_CANDIDATES_FILE: &str = "municipality_candidates.csv";

/// Builds one report bundle for a request, reusing the session's memoized data.
pub struct ElectionPipeline<S, G, St> {
    session: Arc<ReportSession<S, G>>,
    storage: St,
    request: ReportRequest,
    output_path: String,
}

impl<S, G, St> ElectionPipeline<S, G, St>
where
    S: DataSource + 'static,
    G: GeoProvider,
    St: Storage,
{
    pub fn new(
        session: Arc<ReportSession<S, G>>,
        storage: St,
        request: ReportRequest,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            session,
            storage,
            request,
            output_path: output_path.into(),
        }
    }

    /// Official spelling of a municipality in the loaded rows, matched
    /// accent- and case-insensitively.
    fn resolve_municipality(
        records: &[crate::domain::model::VoteRecord],
        region: &str,
        requested: &str,
    ) -> Result<String> {
        let wanted = normalize_name(requested);
        views::municipalities(records, region)
            .into_iter()
            .find(|name| normalize_name(name) == wanted)
            .ok_or_else(|| EtlError::ValidationError {
                message: format!("Município '{}' não encontrado em {}", requested, region),
            })
    }
}

fn to_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

fn summary(report: &ElectionReport, files: &[&str]) -> serde_json::Value {
    let state = report.state.as_ref().map(|state| {
        serde_json::json!({
            "region": state.region,
            "municipalities": state.municipalities,
            "total_votes": state.total_votes,
            "total_votes_display": format_votes(state.total_votes),
            "leading_party": state.leading_party,
        })
    });
    let municipality = report.municipality.as_ref().map(|view| {
        serde_json::json!({
            "region": view.region,
            "municipality": view.municipality,
            "candidates": view.candidates.len(),
            "winner": view.winner,
        })
    });

    serde_json::json!({
        "request": report.request,
        "effective_round": report.effective_round,
        "generated_at": report.generated_at.to_rfc3339(),
        "metrics": {
            "municipalities": report.country.municipalities,
            "regions": views::regions(&report.winners).len(),
            "total_votes": report.country.total_votes,
            "total_votes_display": format_votes(report.country.total_votes),
            "top_winners": report.country.top_winners,
            "party_distribution": report.country.party_distribution,
        },
        "state": state,
        "municipality": municipality,
        "map": report.map.as_ref().map(MapOutcome::status),
        "warnings": report.warnings,
        "files": files,
    })
}

#[async_trait::async_trait]
impl<S, G, St> Pipeline for ElectionPipeline<S, G, St>
where
    S: DataSource + 'static,
    G: GeoProvider,
    St: Storage,
{
    async fn extract(&self) -> Result<LoadedDataset> {
        let dataset = self.session.dataset(self.request.office).await;

        for warning in &dataset.warnings {
            tracing::warn!("⚠️ Skipped region {}: {}", warning.region, warning.message);
        }
        if dataset.is_empty() {
            return Err(EtlError::NoData {
                office: self.request.office.label().to_string(),
            });
        }

        Ok(dataset.as_ref().clone())
    }

    async fn transform(&self, data: LoadedDataset) -> Result<ElectionReport> {
        let results = self
            .session
            .round_results(self.request.office, self.request.round)
            .await;
        let country = views::country_view(&results.winners);

        let (state, map, municipality) = match &self.request.level {
            NavigationLevel::Country => (None, None, None),
            NavigationLevel::State { region } => {
                let state = views::state_view(&results.winners, region);
                let map = self.session.map_layer(region, &results.winners).await;
                tracing::info!("🗺️ {} map: {}", region, map.status());
                (Some(state), Some(map), None)
            }
            NavigationLevel::Municipality {
                region,
                municipality,
            } => {
                let name = Self::resolve_municipality(&results.records, region, municipality)?;
                let view = views::municipality_view(&results.records, region, &name);
                (
                    Some(views::state_view(&results.winners, region)),
                    None,
                    Some(view),
                )
            }
        };

        Ok(ElectionReport {
            request: self.request.clone(),
            effective_round: results.round,
            generated_at: chrono::Utc::now(),
            warnings: data.warnings,
            winners: results.winners.clone(),
            country,
            state,
            map,
            municipality,
        })
    }

    async fn load(&self, report: ElectionReport) -> Result<String> {
        let bundle_name = self.request.bundle_name();

        let mut entries: Vec<(&str, Vec<u8>)> = vec![
            (WINNERS_FILE, to_csv(&report.winners)?),
            (
                PARTY_DISTRIBUTION_FILE,
                to_csv(&views::party_distribution(&report.winners))?,
            ),
        ];
        if let Some(state) = &report.state {
            entries.push((STATE_WINNERS_FILE, to_csv(&state.winners)?));
        }
        if let Some(MapOutcome::Ready(layer)) = &report.map {
            entries.push((STATE_MAP_FILE, serde_json::to_vec(&layer.features)?));
        }
        if let Some(view) = &report.municipality {
            entries.push((MUNICIPALITY_CANDIDATES_FILE, to_csv(&view.candidates)?));
        }

        let mut files: Vec<&str> = vec![SUMMARY_FILE];
        files.extend(entries.iter().map(|(name, _)| *name));
        let summary_json = serde_json::to_vec_pretty(&summary(&report, &files))?;

        // 建立ZIP檔案
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>(SUMMARY_FILE, FileOptions::default())?;
            zip.write_all(&summary_json)?;

            for (name, data) in &entries {
                zip.start_file::<_, ()>(*name, FileOptions::default())?;
                zip.write_all(data)?;
            }

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(&bundle_name, &zip_data).await?;

        Ok(format!("{}/{}", self.output_path, bundle_name))
    }
}
