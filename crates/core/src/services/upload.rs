//! Photo uploads.

use std::sync::Arc;

use cidadao_common::{AppError, AppResult, StorageBackend, UploadedFile, generate_storage_key};
use tracing::info;

/// Upload service.
#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn StorageBackend>,
    max_bytes: usize,
}

impl UploadService {
    /// Create a new upload service.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>, max_bytes: usize) -> Self {
        Self { storage, max_bytes }
    }

    /// Store a client file and return where it can be fetched.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> AppResult<UploadedFile> {
        if file_name.trim().is_empty() {
            return Err(AppError::BadRequest("No file selected".to_string()));
        }

        if data.len() > self.max_bytes {
            return Err(AppError::BadRequest(format!(
                "File exceeds the {} byte limit",
                self.max_bytes
            )));
        }

        let key = generate_storage_key(file_name);
        let content_type = content_type.unwrap_or("application/octet-stream");

        let uploaded = self.storage.upload(&key, data, content_type).await?;
        info!(key = %uploaded.key, size = uploaded.size, "Stored upload");

        Ok(uploaded)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cidadao_common::LocalStorage;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("cidadao-upload-{}", std::process::id()))
    }

    #[tokio::test]
    async fn test_upload_returns_public_url() {
        let dir = temp_dir().join("ok");
        let service = UploadService::new(
            Arc::new(LocalStorage::new(dir.clone(), "/uploads".to_string())),
            1024,
        );

        let uploaded = service
            .upload("foto rua.jpg", Some("image/jpeg"), b"jpeg")
            .await
            .unwrap();

        assert!(uploaded.url.starts_with("/uploads/"));
        assert!(uploaded.url.ends_with("_foto_rua.jpg"));
        assert_eq!(uploaded.content_type, "image/jpeg");

        tokio::fs::remove_dir_all(dir).await.ok();
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_and_unnamed() {
        let service = UploadService::new(
            Arc::new(LocalStorage::new(temp_dir().join("rejected"), "/uploads".to_string())),
            4,
        );

        assert!(matches!(
            service.upload("big.png", None, b"12345").await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            service.upload("", None, b"1").await,
            Err(AppError::BadRequest(_))
        ));
    }
}
