//! S3/MinIO-compatible remote blob backend
//!
//! Uses the rust-s3 crate. Objects are stored at `{folder}/{filename}` with a
//! `public-read` ACL, and their URL is built from the public endpoint.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use crate::core::config::S3Config;
use crate::core::error::{AppError, Result};
use crate::modules::storage::{generate_filename, BlobStore, Folder, StoredBlob};

pub struct S3BlobStore {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    public_endpoint: String,
}

impl S3BlobStore {
    pub fn new(config: S3Config) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| {
            AppError::DependencyUnavailable(format!("Failed to create S3 credentials: {}", e))
        })?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| {
                AppError::DependencyUnavailable(format!("Failed to create S3 bucket handle: {}", e))
            })?;

        // Path-style URLs (http://endpoint/bucket) work for both MinIO and S3
        bucket.set_path_style();
        bucket.add_header("x-amz-acl", "public-read");

        info!(
            "S3 blob store initialized for endpoint: {}, bucket: {}",
            config.endpoint,
            bucket.name()
        );

        Ok(Self {
            bucket,
            region,
            credentials,
            public_endpoint: config.public_endpoint,
        })
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    /// Creates the bucket when missing; any other failure is only logged
    pub async fn ensure_bucket_exists(&self) {
        let result = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(_) => info!("Bucket '{}' created successfully", self.bucket.name()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
            }
        }
    }

    fn object_key(folder: Folder, filename: &str) -> String {
        format!("{}/{}", folder.as_str(), filename)
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_endpoint, self.bucket.name(), key)
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn save(
        &self,
        folder: Folder,
        data: Vec<u8>,
        original_name: &str,
        content_type: &str,
    ) -> Result<StoredBlob> {
        let filename = generate_filename(original_name);
        let key = Self::object_key(folder, &filename);

        let response = self
            .bucket
            .put_object_with_content_type(&key, &data, content_type)
            .await
            .map_err(|e| {
                AppError::DependencyUnavailable(format!("Failed to upload '{}': {}", key, e))
            })?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(AppError::DependencyUnavailable(format!(
                "Failed to upload '{}': storage responded with status {}",
                key, status
            )));
        }

        debug!("Uploaded '{}' to bucket '{}'", key, self.bucket.name());

        Ok(StoredBlob {
            url: self.public_url(&key),
            filename,
            remote: true,
        })
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> S3Config {
        S3Config {
            endpoint: "http://localhost:9000".to_string(),
            public_endpoint: "https://cdn.example.test".to_string(),
            region: "us-east-1".to_string(),
            bucket: "fire-guard-test".to_string(),
            access_key: "access".to_string(),
            secret_key: "secret".to_string(),
        }
    }

    #[test]
    fn test_object_key_is_folder_scoped() {
        assert_eq!(
            S3BlobStore::object_key(Folder::Certificates, "1-2.png"),
            "certificates/1-2.png"
        );
    }

    #[test]
    fn test_public_url_uses_public_endpoint() {
        let store = S3BlobStore::new(config()).unwrap();
        assert_eq!(store.bucket_name(), "fire-guard-test");
        assert_eq!(
            store.public_url("fires/1-2.jpg"),
            "https://cdn.example.test/fire-guard-test/fires/1-2.jpg"
        );
    }
}
