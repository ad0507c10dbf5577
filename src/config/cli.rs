use crate::config::{
    navigation_level, DataSourceConfig, GeoEndpoints, DEFAULT_BUCKET_URL,
    DEFAULT_CONCURRENT_REQUESTS, DEFAULT_ELECTION_YEAR, DEFAULT_LOCALIDADES_URL,
    DEFAULT_MALHAS_URL, DEFAULT_TIMEOUT_SECS,
};
use crate::domain::model::{OfficeType, ReportRequest, RoundSelection};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Folder with one CSV per UF
    Local,
    /// Public bucket over HTTPS
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "election-report")]
#[command(about = "Municipal election winners per municipality, state and country")]
pub struct CliConfig {
    #[arg(long, value_enum, default_value = "mayor")]
    pub office: OfficeType,

    #[arg(long, value_enum, default_value = "final-winners")]
    pub round: RoundSelection,

    /// UF code for the state view, e.g. SP
    #[arg(long)]
    pub state: Option<String>,

    /// Municipality name for the municipality view (needs --state)
    #[arg(long)]
    pub municipality: Option<String>,

    #[arg(long, value_enum, default_value = "remote")]
    pub source: SourceKind,

    #[arg(long, default_value = "./data")]
    pub data_dir: String,

    #[arg(long, default_value = DEFAULT_BUCKET_URL)]
    pub bucket_url: String,

    #[arg(long, default_value_t = DEFAULT_ELECTION_YEAR)]
    pub election_year: u16,

    #[arg(long, default_value = DEFAULT_MALHAS_URL)]
    pub malhas_url: String,

    #[arg(long, default_value = DEFAULT_LOCALIDADES_URL)]
    pub localidades_url: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value_t = DEFAULT_CONCURRENT_REQUESTS)]
    pub concurrent_requests: usize,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn report_request(&self) -> Result<ReportRequest> {
        Ok(ReportRequest {
            office: self.office,
            round: self.round,
            level: navigation_level(self.state.as_deref(), self.municipality.as_deref())?,
        })
    }

    fn data_source(&self) -> DataSourceConfig {
        match self.source {
            SourceKind::Local => DataSourceConfig::Local {
                data_dir: self.data_dir.clone(),
                election_year: self.election_year,
            },
            SourceKind::Remote => DataSourceConfig::Remote {
                base_url: self.bucket_url.clone(),
                election_year: self.election_year,
            },
        }
    }

    fn geo_endpoints(&self) -> GeoEndpoints {
        GeoEndpoints {
            malhas_url: self.malhas_url.clone(),
            localidades_url: self.localidades_url.clone(),
        }
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        self.data_source().validate()?;
        self.geo_endpoints().validate()?;
        validate_path("output_path", &self.output_path)?;
        validate_range("concurrent_requests", self.concurrent_requests, 1, 27)?;
        validate_range("request_timeout_secs", self.request_timeout_secs, 1, 600)?;

        if let Some(state) = &self.state {
            validate_state_code("state", &state.trim().to_uppercase())?;
        }
        if let Some(municipality) = &self.municipality {
            validate_non_empty_string("municipality", municipality)?;
        }
        // --municipality 需搭配 --state
        self.report_request()?;

        tracing::debug!("✅ CLI configuration validation passed");
        Ok(())
    }
}
