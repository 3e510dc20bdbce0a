//! Image Store
//!
//! 商品图片的文件存储。文件名由服务端生成 (uuid)，客户端提供的
//! 文件名只用来取扩展名。

use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::utils::AppError;

/// Maximum file size (5MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Supported image formats
pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

#[derive(Clone)]
pub struct ImageStore {
    images_dir: PathBuf,
}

impl ImageStore {
    /// Create the store rooted at `<work_dir>/images`
    pub async fn new(work_dir: &str) -> Result<Self, AppError> {
        let images_dir = Path::new(work_dir).join("images");
        fs::create_dir_all(&images_dir)
            .await
            .map_err(|e| AppError::internal(format!("Failed to create images dir: {e}")))?;
        Ok(Self { images_dir })
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Validate and persist an uploaded image; returns the stored
    /// filename ("<uuid>.<ext>").
    pub async fn put(&self, original_name: &str, data: &[u8]) -> Result<String, AppError> {
        if data.is_empty() {
            return Err(AppError::validation("Empty file"));
        }
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::validation(format!(
                "File too large. Maximum size is {}MB",
                MAX_FILE_SIZE / 1024 / 1024
            )));
        }

        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
            return Err(AppError::validation(format!(
                "Unsupported file format '{}'. Supported: {}",
                ext,
                SUPPORTED_FORMATS.join(", ")
            )));
        }

        let filename = format!("{}.{ext}", Uuid::new_v4());
        let path = self.images_dir.join(&filename);
        fs::write(&path, data)
            .await
            .map_err(|e| AppError::internal(format!("Failed to write image: {e}")))?;

        tracing::info!(file = %filename, size = data.len(), "image stored");
        Ok(filename)
    }

    /// Remove a stored image; missing files are not an error
    pub async fn delete(&self, filename: &str) -> Result<(), AppError> {
        // stored names are uuid-based, reject anything path-like
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return Err(AppError::validation("Invalid image filename"));
        }
        let path = self.images_dir.join(filename);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::internal(format!("Failed to delete image: {e}"))),
        }
    }
}
