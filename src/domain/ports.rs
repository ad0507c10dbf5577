use crate::config::{DataSourceConfig, GeoEndpoints};
use crate::domain::model::{ElectionReport, LoadedDataset, ReportRequest};
use crate::utils::error::Result;
use async_trait::async_trait;
use geojson::FeatureCollection;
use std::collections::HashMap;
use std::time::Duration;

/// Where the per-region result files come from.
pub trait DataSource: Send + Sync {
    /// UF codes this source can serve.
    fn available_regions(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    /// Raw file bytes for one region.
    fn fetch_region(
        &self,
        region: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    fn describe(&self) -> String;
}

/// Municipality boundaries and official names per state.
pub trait GeoProvider: Send + Sync {
    fn fetch_boundaries(
        &self,
        region: &str,
    ) -> impl std::future::Future<Output = Result<FeatureCollection>> + Send;

    /// Area code (`codarea`) to official municipality name.
    fn fetch_municipality_names(
        &self,
        region: &str,
    ) -> impl std::future::Future<Output = Result<HashMap<String, String>>> + Send;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn report_request(&self) -> Result<ReportRequest>;
    fn data_source(&self) -> DataSourceConfig;
    fn geo_endpoints(&self) -> GeoEndpoints;
    fn output_path(&self) -> &str;
    fn concurrent_requests(&self) -> usize;
    fn request_timeout(&self) -> Duration;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<LoadedDataset>;
    async fn transform(&self, data: LoadedDataset) -> Result<ElectionReport>;
    async fn load(&self, report: ElectionReport) -> Result<String>;
}
