use crate::config::DataSourceConfig;
use crate::domain::model::BRAZILIAN_STATES;
use crate::domain::ports::DataSource;
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

/// `votacao_candidato_munzona_2024_SP.csv`
pub fn region_file_name(election_year: u16, region: &str) -> String {
    format!("votacao_candidato_munzona_{}_{}.csv", election_year, region)
}

/// Folder holding one TSE export per UF.
#[derive(Debug, Clone)]
pub struct LocalDataSource {
    data_dir: PathBuf,
    election_year: u16,
}

impl LocalDataSource {
    pub fn new(data_dir: impl Into<PathBuf>, election_year: u16) -> Self {
        Self {
            data_dir: data_dir.into(),
            election_year,
        }
    }
}

impl DataSource for LocalDataSource {
    /// UFs with a file in the folder; the national `BRASIL` file is ignored.
    async fn available_regions(&self) -> Result<Vec<String>> {
        let pattern = format!(
            r"^votacao_candidato_munzona_{}_([A-Z]{{2}})\.csv$",
            self.election_year
        );
        let re = Regex::new(&pattern).map_err(|e| EtlError::ConfigError {
            message: format!("invalid file pattern: {}", e),
        })?;

        let mut regions = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.data_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            if let Some(caps) = file_name.to_str().and_then(|name| re.captures(name)) {
                regions.push(caps[1].to_string());
            }
        }
        regions.sort();

        tracing::debug!("Found {} region files in {}", regions.len(), self.data_dir.display());
        Ok(regions)
    }

    async fn fetch_region(&self, region: &str) -> Result<Vec<u8>> {
        let path = self
            .data_dir
            .join(region_file_name(self.election_year, region));
        Ok(tokio::fs::read(path).await?)
    }

    fn describe(&self) -> String {
        format!("local folder {}", self.data_dir.display())
    }
}

/// Public bucket mirroring the local file names under a base URL.
#[derive(Debug, Clone)]
pub struct HttpBucketSource {
    client: Client,
    base_url: String,
    election_year: u16,
}

impl HttpBucketSource {
    pub fn new(base_url: &str, election_year: u16, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            election_year,
        })
    }

    fn region_url(&self, region: &str) -> String {
        format!(
            "{}/{}",
            self.base_url,
            region_file_name(self.election_year, region)
        )
    }
}

impl DataSource for HttpBucketSource {
    async fn available_regions(&self) -> Result<Vec<String>> {
        Ok(BRAZILIAN_STATES.iter().map(|uf| uf.to_string()).collect())
    }

    async fn fetch_region(&self, region: &str) -> Result<Vec<u8>> {
        let url = self.region_url(region);
        tracing::debug!("Fetching {}", url);

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        format!("bucket {}", self.base_url)
    }
}

/// The source chosen by configuration.
pub enum ConfiguredSource {
    Local(LocalDataSource),
    Remote(HttpBucketSource),
    #[cfg(feature = "lambda")]
    S3(crate::adapters::s3::S3DataSource),
}

impl ConfiguredSource {
    pub async fn from_config(config: &DataSourceConfig, timeout: Duration) -> Result<Self> {
        match config {
            DataSourceConfig::Local {
                data_dir,
                election_year,
            } => Ok(ConfiguredSource::Local(LocalDataSource::new(
                data_dir,
                *election_year,
            ))),
            DataSourceConfig::Remote {
                base_url,
                election_year,
            } => Ok(ConfiguredSource::Remote(HttpBucketSource::new(
                base_url,
                *election_year,
                timeout,
            )?)),
            #[cfg(feature = "lambda")]
            DataSourceConfig::S3 {
                bucket,
                prefix,
                region,
                election_year,
            } => {
                let client = crate::adapters::s3::client_for_region(region).await;
                Ok(ConfiguredSource::S3(crate::adapters::s3::S3DataSource::new(
                    client,
                    bucket.clone(),
                    prefix.clone(),
                    *election_year,
                )))
            }
        }
    }
}

impl DataSource for ConfiguredSource {
    async fn available_regions(&self) -> Result<Vec<String>> {
        match self {
            ConfiguredSource::Local(source) => source.available_regions().await,
            ConfiguredSource::Remote(source) => source.available_regions().await,
            #[cfg(feature = "lambda")]
            ConfiguredSource::S3(source) => source.available_regions().await,
        }
    }

    async fn fetch_region(&self, region: &str) -> Result<Vec<u8>> {
        match self {
            ConfiguredSource::Local(source) => source.fetch_region(region).await,
            ConfiguredSource::Remote(source) => source.fetch_region(region).await,
            #[cfg(feature = "lambda")]
            ConfiguredSource::S3(source) => source.fetch_region(region).await,
        }
    }

    fn describe(&self) -> String {
        match self {
            ConfiguredSource::Local(source) => source.describe(),
            ConfiguredSource::Remote(source) => source.describe(),
            #[cfg(feature = "lambda")]
            ConfiguredSource::S3(source) => source.describe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_local_source_discovers_state_files() {
        let dir = TempDir::new().unwrap();
        for name in [
            "votacao_candidato_munzona_2024_SP.csv",
            "votacao_candidato_munzona_2024_AC.csv",
            "votacao_candidato_munzona_2024_BRASIL.csv",
            "votacao_candidato_munzona_2020_RJ.csv",
            "leiame.pdf",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let source = LocalDataSource::new(dir.path(), 2024);
        let regions = tokio_test::block_on(source.available_regions()).unwrap();
        assert_eq!(regions, vec!["AC", "SP"]);
    }

    #[tokio::test]
    async fn test_local_source_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let source = LocalDataSource::new(dir.path(), 2024);
        assert!(source.fetch_region("SP").await.is_err());
    }

    #[tokio::test]
    async fn test_bucket_source_fetches_region_file() {
        let server = MockServer::start();
        let file_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/data/votacao_candidato_munzona_2024_SP.csv");
            then.status(200).body("SG_UF;NM_MUNICIPIO\n");
        });

        let source =
            HttpBucketSource::new(&server.url("/data/"), 2024, Duration::from_secs(5)).unwrap();
        let bytes = source.fetch_region("SP").await.unwrap();

        file_mock.assert();
        assert_eq!(bytes, b"SG_UF;NM_MUNICIPIO\n");
    }

    #[tokio::test]
    async fn test_bucket_source_http_error_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(404);
        });

        let source = HttpBucketSource::new(&server.base_url(), 2024, Duration::from_secs(5)).unwrap();
        let err = source.fetch_region("AC").await.unwrap_err();
        assert!(matches!(err, EtlError::ApiError(_)));
    }
}
