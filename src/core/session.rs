use crate::core::aggregate::{aggregate, identify_winners};
use crate::core::cache::MemoCache;
use crate::core::geo_match::{enrich_features, MapOutcome};
use crate::core::loader::load_office;
use crate::core::rounds::{effective_selection, select_rounds};
use crate::domain::model::{
    AggregatedTally, BRAZILIAN_STATES, LoadedDataset, OfficeType, RoundSelection, VoteRecord,
    Winner,
};
use crate::domain::ports::{DataSource, GeoProvider};
use crate::utils::error::{EtlError, Result};
use geojson::FeatureCollection;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Records of the selected round(s) and what was derived from them.
#[derive(Debug, Clone)]
pub struct RoundResults {
    pub round: RoundSelection,
    pub records: Vec<VoteRecord>,
    pub tallies: Vec<AggregatedTally>,
    pub winners: Vec<Winner>,
}

/// Capacity of each memo table.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub datasets: usize,
    pub round_results: usize,
    pub regions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            datasets: 2,
            round_results: 8,
            regions: BRAZILIAN_STATES.len(),
        }
    }
}

/// One user's working state: sources plus memoized results.
///
/// Nothing here is shared between sessions. Geo failures are not cached so
/// the next request retries them.
pub struct ReportSession<S, G> {
    source: Arc<S>,
    geo: G,
    concurrency: usize,
    geo_timeout: Duration,
    datasets: Mutex<MemoCache<OfficeType, Arc<LoadedDataset>>>,
    round_results: Mutex<MemoCache<(OfficeType, RoundSelection), Arc<RoundResults>>>,
    boundaries: Mutex<MemoCache<String, Arc<FeatureCollection>>>,
    names: Mutex<MemoCache<String, Arc<HashMap<String, String>>>>,
}

impl<S, G> ReportSession<S, G>
where
    S: DataSource + 'static,
    G: GeoProvider,
{
    pub fn new(source: S, geo: G, concurrency: usize, geo_timeout: Duration) -> Self {
        Self::with_limits(source, geo, concurrency, geo_timeout, SessionLimits::default())
    }

    pub fn with_limits(
        source: S,
        geo: G,
        concurrency: usize,
        geo_timeout: Duration,
        limits: SessionLimits,
    ) -> Self {
        Self {
            source: Arc::new(source),
            geo,
            concurrency,
            geo_timeout,
            datasets: Mutex::new(MemoCache::new(limits.datasets)),
            round_results: Mutex::new(MemoCache::new(limits.round_results)),
            boundaries: Mutex::new(MemoCache::new(limits.regions)),
            names: Mutex::new(MemoCache::new(limits.regions)),
        }
    }

    pub async fn dataset(&self, office: OfficeType) -> Arc<LoadedDataset> {
        if let Some(cached) = self.datasets.lock().await.get(&office) {
            tracing::debug!("♻️ Using cached {} dataset", office);
            return cached;
        }

        let dataset = Arc::new(load_office(Arc::clone(&self.source), office, self.concurrency).await);
        self.datasets.lock().await.insert(office, Arc::clone(&dataset));
        dataset
    }

    /// Round selection, aggregation and winners for an office.
    pub async fn round_results(
        &self,
        office: OfficeType,
        requested: RoundSelection,
    ) -> Arc<RoundResults> {
        let round = effective_selection(office, requested);
        if round != requested {
            tracing::info!("ℹ️ {} has a single round, using {:?}", office, round);
        }

        let key = (office, round);
        if let Some(cached) = self.round_results.lock().await.get(&key) {
            return cached;
        }

        let dataset = self.dataset(office).await;
        let records = select_rounds(&dataset.records, round);
        let tallies = aggregate(&records);
        let winners = identify_winners(&tallies);
        tracing::info!(
            "🏆 {} {:?}: {} rows, {} tallies, {} winners",
            office,
            round,
            records.len(),
            tallies.len(),
            winners.len()
        );

        let results = Arc::new(RoundResults {
            round,
            records,
            tallies,
            winners,
        });
        self.round_results.lock().await.insert(key, Arc::clone(&results));
        results
    }

    async fn boundaries(&self, region: &str) -> Result<Arc<FeatureCollection>> {
        if let Some(cached) = self.boundaries.lock().await.get(&region.to_string()) {
            return Ok(cached);
        }
        let collection = self
            .with_timeout(region, self.geo.fetch_boundaries(region))
            .await?;
        let collection = Arc::new(collection);
        self.boundaries
            .lock()
            .await
            .insert(region.to_string(), Arc::clone(&collection));
        Ok(collection)
    }

    async fn municipality_names(&self, region: &str) -> Result<Arc<HashMap<String, String>>> {
        if let Some(cached) = self.names.lock().await.get(&region.to_string()) {
            return Ok(cached);
        }
        let names = self
            .with_timeout(region, self.geo.fetch_municipality_names(region))
            .await?;
        let names = Arc::new(names);
        self.names
            .lock()
            .await
            .insert(region.to_string(), Arc::clone(&names));
        Ok(names)
    }

    async fn with_timeout<T>(
        &self,
        region: &str,
        call: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.geo_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(EtlError::GeoProviderError {
                region: region.to_string(),
                message: format!("no response within {:?}", self.geo_timeout),
            }),
        }
    }

    /// Map layer for a state. Provider failures degrade to
    /// [`MapOutcome::Unavailable`] rather than an error.
    pub async fn map_layer(&self, region: &str, winners: &[Winner]) -> MapOutcome {
        let fetched = async {
            let boundaries = self.boundaries(region).await?;
            let names = self.municipality_names(region).await?;
            Ok::<_, EtlError>((boundaries, names))
        }
        .await;

        match fetched {
            Ok((boundaries, names)) => MapOutcome::Ready(enrich_features(
                region,
                boundaries.as_ref().clone(),
                &names,
                winners,
            )),
            Err(e) => {
                tracing::warn!("⚠️ Erro ao carregar mapa de {}: {}", region, e);
                MapOutcome::Unavailable {
                    region: region.to_string(),
                    message: e.to_string(),
                }
            }
        }
    }

    /// (hits, misses) of the dataset table.
    pub async fn dataset_cache_stats(&self) -> (u64, u64) {
        self.datasets.lock().await.stats()
    }
}
