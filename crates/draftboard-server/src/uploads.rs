//! Filesystem store for uploaded images.
//!
//! Files are kept in one flat directory under fresh generated names
//! (`<uuid>.<ext>`), so nothing the uploader controls ever becomes a
//! path component except a sanitized extension.

use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ServerError;

/// Longest extension kept from an uploaded file name.
const MAX_EXT_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub async fn new(dir: PathBuf, max_bytes: usize) -> Result<Self, ServerError> {
        fs::create_dir_all(&dir).await.map_err(|e| {
            ServerError::Internal(format!(
                "Failed to create upload directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        info!(path = %dir.display(), "Upload store initialized");

        Ok(Self { dir, max_bytes })
    }

    /// Store `data` under a fresh name derived from the original file's
    /// extension.  Returns the stored file name.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<String, ServerError> {
        if data.is_empty() {
            return Err(ServerError::BadRequest("Empty upload".to_string()));
        }
        if data.len() > self.max_bytes {
            return Err(ServerError::UploadTooLarge {
                size: data.len(),
                max: self.max_bytes,
            });
        }

        let name = format!("{}.{}", Uuid::new_v4(), sanitize_extension(original_name));
        let path = self.dir.join(&name);

        fs::write(&path, data)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to write upload {}: {}", name, e)))?;

        debug!(name = %name, size = data.len(), "Stored upload");
        Ok(name)
    }

    /// Read a stored file back for serving.
    pub async fn load(&self, name: &str) -> Result<Vec<u8>, ServerError> {
        let path = self.safe_path(name)?;

        if !path.exists() {
            return Err(ServerError::NotFound(format!("Upload not found: {name}")));
        }

        let data = fs::read(&path)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to read upload {}: {}", name, e)))?;

        debug!(name = %name, size = data.len(), "Retrieved upload");
        Ok(data)
    }

    /// Validate a requested name against traversal before touching the
    /// filesystem.  Stored names never contain separators, so any request
    /// that does is hostile.
    fn safe_path(&self, name: &str) -> Result<PathBuf, ServerError> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
        {
            return Err(ServerError::BadRequest(
                "Path traversal detected".to_string(),
            ));
        }
        Ok(self.dir.join(name))
    }
}

/// Keep only a short alphanumeric extension from the client's file name.
fn sanitize_extension(original_name: &str) -> String {
    let Some((_, raw)) = original_name.rsplit_once('.') else {
        return "bin".to_string();
    };

    let ext: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_EXT_LEN)
        .collect::<String>()
        .to_ascii_lowercase();

    if ext.is_empty() {
        "bin".to_string()
    } else {
        ext
    }
}

/// Response content type for a stored file, by extension.
pub fn content_type_for(name: &str) -> &'static str {
    match name.rsplit('.').next().unwrap_or("") {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (UploadStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path().to_path_buf(), 1024 * 1024)
            .await
            .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (store, _dir) = test_store().await;
        let data = b"fake-png-bytes";

        let name = store.save("mockup.png", data).await.unwrap();
        assert!(name.ends_with(".png"));
        let retrieved = store.load(&name).await.unwrap();
        assert_eq!(retrieved, data);
    }

    #[tokio::test]
    async fn test_hostile_extension_is_sanitized() {
        let (store, _dir) = test_store().await;
        let name = store.save("../../etc/passwd.P%N/G", b"x").await.unwrap();
        let ext = name.rsplit('.').next().unwrap();
        assert!(ext.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn test_name_without_extension_gets_bin() {
        let (store, _dir) = test_store().await;
        let name = store.save("README", b"x").await.unwrap();
        assert!(name.ends_with(".bin"));
    }

    #[tokio::test]
    async fn test_load_rejects_traversal() {
        let (store, _dir) = test_store().await;
        assert!(matches!(
            store.load("../secret").await,
            Err(ServerError::BadRequest(_))
        ));
        assert!(matches!(
            store.load("a/b.png").await,
            Err(ServerError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let (store, _dir) = test_store().await;
        assert!(store.save("a.png", b"").await.is_err());
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path().to_path_buf(), 4).await.unwrap();
        assert!(matches!(
            store.save("a.png", b"12345").await,
            Err(ServerError::UploadTooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_upload_is_not_found() {
        let (store, _dir) = test_store().await;
        assert!(matches!(
            store.load("missing.png").await,
            Err(ServerError::NotFound(_))
        ));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
    }
}
