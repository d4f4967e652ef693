//! Blob storage abstraction for uploaded files.
//!
//! The core only ever keeps the returned URL; file bytes live with the backend.

use std::path::PathBuf;

use crate::{AppError, AppResult, config::UploadConfig};

/// Uploaded file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (relative path).
    pub key: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Upload a file.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str)
    -> AppResult<UploadedFile>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }

    /// Create a local storage backend from the upload configuration.
    #[must_use]
    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(PathBuf::from(&config.path), config.base_url.clone())
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let path = self.base_path.join(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// Reduce a client-supplied file name to a safe, flat ASCII name.
///
/// Returns `None` when nothing usable remains.
#[must_use]
pub fn sanitize_file_name(original_name: &str) -> Option<String> {
    // Only the final path component is considered.
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    let cleaned = cleaned.trim_start_matches(['.', '_']).to_string();
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

/// Generate a unique storage key for an uploaded file.
///
/// Keys look like `20250101_120000_1a2b3c4d_photo.jpg`.
#[must_use]
pub fn generate_storage_key(original_name: &str) -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let unique = uuid::Uuid::new_v4().simple().to_string();
    let suffix = &unique[..8];
    let name = sanitize_file_name(original_name).unwrap_or_else(|| "upload.bin".to_string());

    format!("{timestamp}_{suffix}_{name}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_path_and_unsafe_chars() {
        assert_eq!(
            sanitize_file_name("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_file_name("C:\\Users\\joao\\foto rua.jpg").as_deref(),
            Some("foto_rua.jpg")
        );
        assert_eq!(
            sanitize_file_name("iluminação.png").as_deref(),
            Some("iluminao.png")
        );
        assert_eq!(sanitize_file_name("...").as_deref(), None);
        assert_eq!(sanitize_file_name("").as_deref(), None);
    }

    #[test]
    fn test_generate_storage_key() {
        let key = generate_storage_key("photo.jpg");
        assert!(key.ends_with("_photo.jpg"));
        assert!(!key.contains('/'));

        let fallback = generate_storage_key("///");
        assert!(fallback.ends_with("_upload.bin"));
    }

    #[test]
    fn test_public_url_joins_base() {
        let storage = LocalStorage::new(PathBuf::from("uploads"), "/uploads/".to_string());
        assert_eq!(storage.public_url("a.jpg"), "/uploads/a.jpg");
    }

    #[tokio::test]
    async fn test_local_upload_writes_file() {
        let dir = std::env::temp_dir().join(format!("cidadao-storage-{}", uuid::Uuid::new_v4()));
        let storage = LocalStorage::new(dir.clone(), "/uploads".to_string());

        let uploaded = storage
            .upload("test.txt", b"hello", "text/plain")
            .await
            .unwrap();
        assert_eq!(uploaded.url, "/uploads/test.txt");
        assert_eq!(uploaded.size, 5);
        assert_eq!(tokio::fs::read(dir.join("test.txt")).await.unwrap(), b"hello");

        tokio::fs::remove_dir_all(dir).await.ok();
    }
}
