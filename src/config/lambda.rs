use crate::config::{
    navigation_level, DataSourceConfig, GeoEndpoints, DEFAULT_BUCKET_URL,
    DEFAULT_CONCURRENT_REQUESTS, DEFAULT_ELECTION_YEAR, DEFAULT_TIMEOUT_SECS,
};
use crate::domain::model::{OfficeType, ReportRequest, RoundSelection};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_AWS_REGION: &str = "sa-east-1";

#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub source: DataSourceConfig,
    pub geo: GeoEndpoints,
    pub output_bucket: String,
    pub output_prefix: String,
    pub output_region: String,
    pub office: OfficeType,
    pub round: RoundSelection,
    pub state: Option<String>,
    pub municipality: Option<String>,
    pub concurrent_requests: usize,
    pub request_timeout_secs: u64,
}

impl LambdaConfig {
    /// `DATA_BUCKET` selects S3 input; otherwise `DATA_BASE_URL` (or the
    /// public bucket) is read over HTTPS. `OUTPUT_BUCKET` is required.
    pub fn from_env() -> Result<Self> {
        let election_year = parse_env("ELECTION_YEAR", DEFAULT_ELECTION_YEAR)?;

        let source = match env::var("DATA_BUCKET") {
            Ok(bucket) => DataSourceConfig::S3 {
                bucket,
                prefix: env::var("DATA_PREFIX").unwrap_or_else(|_| "data".to_string()),
                region: env::var("DATA_REGION")
                    .unwrap_or_else(|_| DEFAULT_AWS_REGION.to_string()),
                election_year,
            },
            Err(_) => DataSourceConfig::Remote {
                base_url: env::var("DATA_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BUCKET_URL.to_string()),
                election_year,
            },
        };

        let defaults = GeoEndpoints::default();
        let geo = GeoEndpoints {
            malhas_url: env::var("IBGE_MALHAS_URL").unwrap_or(defaults.malhas_url),
            localidades_url: env::var("IBGE_LOCALIDADES_URL").unwrap_or(defaults.localidades_url),
        };

        Ok(Self {
            source,
            geo,
            output_bucket: env::var("OUTPUT_BUCKET").map_err(|_| EtlError::MissingConfigError {
                field: "OUTPUT_BUCKET".to_string(),
            })?,
            output_prefix: env::var("OUTPUT_PREFIX")
                .unwrap_or_else(|_| "election-reports".to_string()),
            output_region: env::var("OUTPUT_REGION")
                .unwrap_or_else(|_| DEFAULT_AWS_REGION.to_string()),
            office: parse_env("OFFICE", OfficeType::Mayor)?,
            round: parse_env("ROUND", RoundSelection::FinalWinners)?,
            state: env::var("STATE").ok(),
            municipality: env::var("MUNICIPALITY").ok(),
            concurrent_requests: parse_env("CONCURRENT_REQUESTS", DEFAULT_CONCURRENT_REQUESTS)?,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        })
    }

    /// 事件內容覆蓋環境變數設定
    pub fn with_overrides(
        mut self,
        office: Option<OfficeType>,
        round: Option<RoundSelection>,
        state: Option<String>,
        municipality: Option<String>,
    ) -> Self {
        if let Some(office) = office {
            self.office = office;
        }
        if let Some(round) = round {
            self.round = round;
        }
        if state.is_some() {
            self.state = state;
            self.municipality = None;
        }
        if municipality.is_some() {
            self.municipality = municipality;
        }
        self
    }
}

fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| EtlError::InvalidConfigValueError {
            field: name.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

impl ConfigProvider for LambdaConfig {
    fn report_request(&self) -> Result<ReportRequest> {
        Ok(ReportRequest {
            office: self.office,
            round: self.round,
            level: navigation_level(self.state.as_deref(), self.municipality.as_deref())?,
        })
    }

    fn data_source(&self) -> DataSourceConfig {
        self.source.clone()
    }

    fn geo_endpoints(&self) -> GeoEndpoints {
        self.geo.clone()
    }

    fn output_path(&self) -> &str {
        &self.output_prefix
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl crate::utils::validation::Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        self.source.validate()?;
        if let DataSourceConfig::S3 { bucket, region, .. } = &self.source {
            validate_s3_bucket_name("DATA_BUCKET", bucket)?;
            validate_aws_region("DATA_REGION", region)?;
        }
        self.geo.validate()?;

        // 驗證輸出 bucket
        validate_s3_bucket_name("OUTPUT_BUCKET", &self.output_bucket)?;
        validate_non_empty_string("OUTPUT_PREFIX", &self.output_prefix)?;
        validate_aws_region("OUTPUT_REGION", &self.output_region)?;

        validate_range("CONCURRENT_REQUESTS", self.concurrent_requests, 1, 27)?;
        if let Some(state) = &self.state {
            validate_state_code("STATE", &state.trim().to_uppercase())?;
        }
        self.report_request()?;

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name must be between 3 and 63 characters".to_string(),
        });
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots"
                .to_string(),
        });
    }

    if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name cannot start or end with a hyphen".to_string(),
        });
    }

    Ok(())
}

fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    crate::utils::validation::validate_non_empty_string(field_name, region)?;

    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}
