use crate::config::{
    navigation_level, DataSourceConfig, GeoEndpoints, DEFAULT_CONCURRENT_REQUESTS,
    DEFAULT_TIMEOUT_SECS,
};
use crate::domain::model::{OfficeType, ReportRequest, RoundSelection};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub report: ReportSection,
    pub source: SourceSection,
    #[serde(default)]
    pub geo: GeoSection,
    pub load: LoadSection,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub office: OfficeType,
    #[serde(default)]
    pub round: RoundSelection,
    pub state: Option<String>,
    pub municipality: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSection {
    #[serde(flatten)]
    pub data: DataSourceConfig,
    pub concurrent_requests: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoSection {
    pub malhas_url: Option<String>,
    pub localidades_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSection {
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn report_request(&self) -> Result<ReportRequest> {
        Ok(ReportRequest {
            office: self.report.office,
            round: self.report.round,
            level: navigation_level(
                self.report.state.as_deref(),
                self.report.municipality.as_deref(),
            )?,
        })
    }

    fn data_source(&self) -> DataSourceConfig {
        self.source.data.clone()
    }

    fn geo_endpoints(&self) -> GeoEndpoints {
        let defaults = GeoEndpoints::default();
        GeoEndpoints {
            malhas_url: self.geo.malhas_url.clone().unwrap_or(defaults.malhas_url),
            localidades_url: self
                .geo
                .localidades_url
                .clone()
                .unwrap_or(defaults.localidades_url),
        }
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn concurrent_requests(&self) -> usize {
        self.source
            .concurrent_requests
            .unwrap_or(DEFAULT_CONCURRENT_REQUESTS)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.geo.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        self.source.data.validate()?;
        self.geo_endpoints().validate()?;
        validate_path("load.output_path", &self.load.output_path)?;
        validate_range("source.concurrent_requests", self.concurrent_requests(), 1, 27)?;
        if let Some(state) = &self.report.state {
            validate_state_code("report.state", &state.trim().to_uppercase())?;
        }
        self.report_request()?;
        Ok(())
    }
}
