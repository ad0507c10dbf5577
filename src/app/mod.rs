pub mod pipelines;

use crate::adapters::{ConfiguredSource, IbgeGeoProvider};
use crate::core::session::ReportSession;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;

/// Session wired to the configured result source and the IBGE services.
pub async fn session_from_config<C: ConfigProvider>(
    config: &C,
) -> Result<ReportSession<ConfiguredSource, IbgeGeoProvider>> {
    let timeout = config.request_timeout();
    let source = ConfiguredSource::from_config(&config.data_source(), timeout).await?;
    let geo = IbgeGeoProvider::new(config.geo_endpoints(), timeout)?;

    tracing::debug!("Result source: {}", crate::domain::ports::DataSource::describe(&source));
    Ok(ReportSession::new(
        source,
        geo,
        config.concurrent_requests(),
        timeout,
    ))
}
