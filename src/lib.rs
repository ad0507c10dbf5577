pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::toml_config::TomlConfig;

#[cfg(feature = "lambda")]
pub use adapters::s3::{S3DataSource, S3Storage};
#[cfg(feature = "lambda")]
pub use config::lambda::LambdaConfig;

pub use adapters::{ConfiguredSource, IbgeGeoProvider, LocalStorage};
pub use app::pipelines::ElectionPipeline;
pub use crate::core::{etl::EtlEngine, session::ReportSession};
pub use domain::model::{NavigationLevel, OfficeType, ReportRequest, RoundSelection};
pub use utils::error::{EtlError, Result};
