//! Cover image storage under the public uploads directory

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::domain::DomainError;
use crate::infrastructure::config::UploadConfig;

/// URL prefix under which stored covers are served
pub const PUBLIC_PREFIX: &str = "/uploads";

/// An uploaded file as received from a multipart form
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct CoverStorage {
    config: UploadConfig,
}

impl CoverStorage {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    /// Re-encode the upload and write it under a random name.
    /// Returns the public path stored on the book row.
    pub async fn save(&self, upload: Upload) -> Result<String, DomainError> {
        let max_width = self.config.max_width;
        let quality = self.config.jpeg_quality;
        let encoded =
            tokio::task::spawn_blocking(move || encode_cover(&upload.bytes, max_width, quality))
                .await
                .map_err(|e| DomainError::Internal(e.to_string()))??;

        tokio::fs::create_dir_all(&self.config.dir).await?;

        let file_name = format!("{}.jpg", uuid::Uuid::new_v4());
        let path = self.config.dir.join(&file_name);
        tokio::fs::write(&path, &encoded).await?;

        tracing::info!("Stored cover image {} ({} bytes)", path.display(), encoded.len());
        Ok(format!("{}/{}", PUBLIC_PREFIX, file_name))
    }

    /// Best-effort removal of a stored cover. Failures are logged, never returned.
    pub async fn remove(&self, public_path: &str) {
        let Some(path) = self.resolve(public_path) else {
            tracing::warn!("Refusing to delete cover outside uploads: {}", public_path);
            return;
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::info!("Deleted cover image {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Cover image already gone: {}", path.display())
            }
            Err(e) => tracing::warn!("Failed to delete cover image {}: {}", path.display(), e),
        }
    }

    /// Map a stored public path to a file inside the uploads directory.
    /// Only the final path component is kept so `..` cannot escape the directory.
    pub fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let name = Path::new(public_path).file_name()?.to_str()?;
        if name.is_empty() || name == ".." {
            return None;
        }
        Some(self.config.dir.join(name))
    }
}

/// Decode, downscale to `max_width` if wider, and re-encode as JPEG
pub fn encode_cover(bytes: &[u8], max_width: u32, quality: u8) -> Result<Vec<u8>, DomainError> {
    let img = image::load_from_memory(bytes)
        .map_err(|_| DomainError::validation("Cover image must be a valid JPEG or PNG file"))?;

    let img = if img.width() > max_width && max_width > 0 {
        let height = (u64::from(img.height()) * u64::from(max_width) / u64::from(img.width()))
            .max(1) as u32;
        img.resize_exact(max_width, height, FilterType::Triangle)
    } else {
        img
    };

    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| DomainError::Storage(e.to_string()))?;

    Ok(out.into_inner())
}
