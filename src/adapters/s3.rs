use crate::adapters::source::region_file_name;
use crate::domain::model::BRAZILIAN_STATES;
use crate::domain::ports::{DataSource, Storage};
use crate::utils::error::{EtlError, Result};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client as S3Client;

/// S3 client pinned to a region, path-style addressing.
pub async fn client_for_region(region: &str) -> S3Client {
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let config = aws_sdk_s3::config::Builder::from(&config)
        .region(Region::new(region.to_string()))
        .force_path_style(true)
        .build();
    S3Client::from_conf(config)
}

fn object_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

/// Region files stored as objects under a prefix.
#[derive(Debug, Clone)]
pub struct S3DataSource {
    client: S3Client,
    bucket: String,
    prefix: String,
    election_year: u16,
}

impl S3DataSource {
    pub fn new(client: S3Client, bucket: String, prefix: String, election_year: u16) -> Self {
        Self {
            client,
            bucket,
            prefix,
            election_year,
        }
    }
}

impl DataSource for S3DataSource {
    async fn available_regions(&self) -> Result<Vec<String>> {
        Ok(BRAZILIAN_STATES.iter().map(|uf| uf.to_string()).collect())
    }

    async fn fetch_region(&self, region: &str) -> Result<Vec<u8>> {
        let key = object_key(&self.prefix, &region_file_name(self.election_year, region));
        read_object(&self.client, &self.bucket, &key).await
    }

    fn describe(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.prefix)
    }
}

/// Report bundles written as S3 objects under a prefix.
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
    prefix: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String, prefix: String) -> Self {
        Self {
            client,
            bucket,
            prefix,
        }
    }
}

impl Storage for S3Storage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        read_object(&self.client, &self.bucket, &object_key(&self.prefix, path)).await
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let key = object_key(&self.prefix, path);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("application/zip")
            .body(data.to_vec().into())
            .send()
            .await
            .map_err(|e| EtlError::ProcessingError {
                message: format!(
                    "Failed to write s3://{}/{}: {}",
                    self.bucket,
                    key,
                    e.into_service_error()
                ),
            })?;

        tracing::info!("☁️ Uploaded s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

async fn read_object(client: &S3Client, bucket: &str, key: &str) -> Result<Vec<u8>> {
    let resp = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| EtlError::ProcessingError {
            message: format!("Failed to read s3://{}/{}: {}", bucket, key, e.into_service_error()),
        })?;

    let data = resp.body.collect().await.map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to collect s3://{}/{}: {}", bucket, key, e),
    })?;

    Ok(data.into_bytes().to_vec())
}
