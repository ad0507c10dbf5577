use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJsonError(#[from] geojson::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Schema error in region {region}: {message}")]
    SchemaError { region: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Geographic provider error for {region}: {message}")]
    GeoProviderError { region: String, message: String },

    #[error("No election data found for office '{office}'")]
    NoData { office: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 根據錯誤嚴重程度決定退出碼
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,      // 警告，但成功
            ErrorSeverity::Medium => 2,   // 重試錯誤
            ErrorSeverity::High => 1,     // 處理錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        }
    }
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::GeoProviderError { .. } => ErrorCategory::Network,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::GeoJsonError(_)
            | EtlError::SchemaError { .. }
            | EtlError::ProcessingError { .. }
            | EtlError::ValidationError { .. }
            | EtlError::NoData { .. } => ErrorCategory::Data,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) | EtlError::ZipError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 地圖失敗不影響表格輸出
            EtlError::GeoProviderError { .. } => ErrorSeverity::Low,
            EtlError::ApiError(_) | EtlError::SchemaError { .. } => ErrorSeverity::Medium,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::GeoJsonError(_)
            | EtlError::ProcessingError { .. }
            | EtlError::ValidationError { .. }
            | EtlError::NoData { .. }
            | EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorSeverity::High,
            EtlError::IoError(_) | EtlError::ZipError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::ApiError(_) => {
                "Check network connectivity and the configured endpoints, then retry".to_string()
            }
            EtlError::GeoProviderError { .. } => {
                "The IBGE service may be unavailable or rate limiting; tables are still produced, retry the map later".to_string()
            }
            EtlError::CsvError(_) | EtlError::SchemaError { .. } => {
                "Verify the input files are the TSE ';'-delimited latin1 exports".to_string()
            }
            EtlError::NoData { .. } => {
                "Select another office or check that the data source contains files for it".to_string()
            }
            EtlError::ValidationError { .. } => {
                "Check the requested state and municipality names".to_string()
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Review the command line arguments or configuration file".to_string()
            }
            EtlError::IoError(_) | EtlError::ZipError(_) => {
                "Check file permissions and available disk space".to_string()
            }
            EtlError::SerializationError(_)
            | EtlError::GeoJsonError(_)
            | EtlError::ProcessingError { .. } => {
                "Run again with --verbose and inspect the logs".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::NoData { office } => {
                format!("Nenhum dado encontrado para o cargo selecionado ({})", office)
            }
            EtlError::GeoProviderError { region, .. } => {
                format!("Erro ao carregar mapa de {}", region)
            }
            EtlError::ApiError(_) => "Failed to reach a remote service".to_string(),
            EtlError::MissingConfigError { field } => {
                format!("Missing required setting: {}", field)
            }
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
