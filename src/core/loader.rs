use crate::core::records::parse_region_file;
use crate::domain::model::{LoadedDataset, OfficeType, RegionWarning, VoteRecord};
use crate::domain::ports::DataSource;
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Loads every region the source offers, keeping rows for `office`.
///
/// A region that cannot be fetched or parsed becomes a [`RegionWarning`];
/// it never fails the whole load. The result may be empty.
pub async fn load_office<S>(source: Arc<S>, office: OfficeType, concurrency: usize) -> LoadedDataset
where
    S: DataSource + 'static,
{
    tracing::info!("📥 Loading {} results from {}", office, source.describe());

    let regions = match source.available_regions().await {
        Ok(regions) => regions,
        Err(e) => {
            tracing::warn!("⚠️ Could not list regions: {}", e);
            return LoadedDataset {
                records: Arc::new(Vec::new()),
                warnings: vec![RegionWarning {
                    region: "*".to_string(),
                    message: e.to_string(),
                }],
            };
        }
    };

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();
    for region in regions {
        let source = Arc::clone(&source);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let outcome = fetch_region_records(source.as_ref(), &region, office).await;
            (region, outcome)
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => tracing::error!("Region task aborted: {}", e),
        }
    }
    // 依 UF 排序，確保輸出順序與並行度無關
    outcomes.sort_by(|a, b| a.0.cmp(&b.0));

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    for (region, outcome) in outcomes {
        match outcome {
            Ok(region_records) => {
                tracing::debug!("{}: {} rows", region, region_records.len());
                records.extend(region_records);
            }
            Err(e) => {
                tracing::warn!("⚠️ Erro ao carregar {}: {}", region, e);
                warnings.push(RegionWarning {
                    region,
                    message: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        "📊 Loaded {} {} rows ({} regions skipped)",
        records.len(),
        office,
        warnings.len()
    );

    LoadedDataset {
        records: Arc::new(records),
        warnings,
    }
}

async fn fetch_region_records<S: DataSource>(
    source: &S,
    region: &str,
    office: OfficeType,
) -> Result<Vec<VoteRecord>> {
    let bytes = source.fetch_region(region).await?;
    parse_region_file(region, &bytes, office)
}
