//! Blob storage for uploaded images
//!
//! Images are written once under a logical [`Folder`] with a freshly generated
//! name and never overwritten. Two backends exist: the local filesystem (served
//! back under `/uploads`) and an S3/MinIO-compatible bucket.

mod local_store;
mod s3_store;

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;

use crate::core::error::Result;
use crate::shared::constants::UPLOADS_URL_PREFIX;

pub use local_store::LocalBlobStore;
pub use s3_store::S3BlobStore;

/// Upper bound of the random filename component
const FILENAME_RANDOM_MAX: u32 = 1_000_000_000;

/// Logical bucket partitioning stored images by purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Folder {
    Fires,
    Certificates,
}

impl Folder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Folder::Fires => "fires",
            Folder::Certificates => "certificates",
        }
    }

    /// Path under which the local backend serves `filename`
    pub fn default_url(&self, filename: &str) -> String {
        format!("{}/{}/{}", UPLOADS_URL_PREFIX, self.as_str(), filename)
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub filename: String,
    pub url: String,
    /// Whether `url` points at the remote backend
    pub remote: bool,
}

impl StoredBlob {
    /// URL worth persisting alongside the record; local URLs are derivable
    pub fn remote_url(&self) -> Option<String> {
        self.remote.then(|| self.url.clone())
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn save(
        &self,
        folder: Folder,
        data: Vec<u8>,
        original_name: &str,
        content_type: &str,
    ) -> Result<StoredBlob>;

    fn backend_name(&self) -> &'static str;
}

/// `{millis}-{random}{ext}`, keeping the extension of the uploaded name
///
/// Uniqueness is probabilistic: two saves in the same millisecond collide only
/// if they draw the same random number.
pub fn generate_filename(original_name: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let random = rand::thread_rng().gen_range(0..=FILENAME_RANDOM_MAX);
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();

    format!("{}-{}{}", millis, random, extension)
}
