use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::modules::storage::{generate_filename, BlobStore, Folder, StoredBlob};

/// Writes images below `root/{folder}/` on the local disk
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn save(
        &self,
        folder: Folder,
        data: Vec<u8>,
        original_name: &str,
        _content_type: &str,
    ) -> Result<StoredBlob> {
        let dir = self.root.join(folder.as_str());
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::DependencyUnavailable(format!(
                "Failed to create upload directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        let filename = generate_filename(original_name);
        let path = dir.join(&filename);
        tokio::fs::write(&path, &data).await.map_err(|e| {
            AppError::DependencyUnavailable(format!(
                "Failed to write '{}': {}",
                path.display(),
                e
            ))
        })?;

        debug!("Stored {} bytes at {}", data.len(), path.display());

        Ok(StoredBlob {
            url: folder.default_url(&filename),
            filename,
            remote: false,
        })
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
