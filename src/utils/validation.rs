use crate::domain::model::BRAZILIAN_STATES;
use crate::utils::error::{EtlError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// UF 代碼必須是 27 個聯邦單位之一
pub fn validate_state_code(field_name: &str, code: &str) -> Result<()> {
    if BRAZILIAN_STATES.contains(&code) {
        return Ok(());
    }
    Err(EtlError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: code.to_string(),
        reason: "Expected a two-letter upper-case UF code such as SP or RJ".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("bucket_url", "https://storage.googleapis.com/b/data").is_ok());
        assert!(validate_url("bucket_url", "http://localhost:8080").is_ok());
        assert!(validate_url("bucket_url", "").is_err());
        assert!(validate_url("bucket_url", "invalid-url").is_err());
        assert!(validate_url("bucket_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_state_code() {
        assert!(validate_state_code("state", "SP").is_ok());
        assert!(validate_state_code("state", "DF").is_ok());
        assert!(validate_state_code("state", "sp").is_err());
        assert!(validate_state_code("state", "BRASIL").is_err());
    }
}
