use std::path::{Path, PathBuf};

use log::{debug, warn};
use uuid::Uuid;

/// MIME types accepted alongside the extension check. The client declares
/// these, so they are a first filter rather than a guarantee.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/webp",
];

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("No file provided")]
    MissingFile,
    #[error("File size ({got_mb:.1}MB) exceeds maximum allowed size ({max_mb:.1}MB)")]
    TooLarge { got_mb: f64, max_mb: f64 },
    #[error("File type '.{extension}' not allowed. Allowed types: {allowed}")]
    DisallowedExtension { extension: String, allowed: String },
    #[error("MIME type '{0}' not allowed")]
    DisallowedMime(String),
    #[error("Error saving file: {0}")]
    Io(#[from] std::io::Error),
}

impl StagingError {
    /// Validation failures are the client's fault; everything else is ours.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StagingError::Io(_))
    }
}

/// Server-local staging area for uploaded files. Files are written under a
/// random identifier so client filenames never touch the filesystem.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
    max_size: usize,
    allowed_extensions: Vec<String>,
}

impl StagingArea {
    pub fn new(dir: PathBuf, max_size: usize, allowed_extensions: Vec<String>) -> Self {
        Self {
            dir,
            max_size,
            allowed_extensions,
        }
    }

    pub fn ensure_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn too_large(&self, got: usize) -> StagingError {
        StagingError::TooLarge {
            got_mb: got as f64 / (1024.0 * 1024.0),
            max_mb: self.max_size as f64 / (1024.0 * 1024.0),
        }
    }

    /// Validate the client-declared filename, MIME type, and byte size.
    /// Returns the normalized extension to stage the file under.
    pub fn validate(
        &self,
        filename: Option<&str>,
        mime_type: Option<&str>,
        size: usize,
    ) -> Result<String, StagingError> {
        if size > self.max_size {
            return Err(self.too_large(size));
        }

        let filename = filename.ok_or(StagingError::MissingFile)?;
        let extension = extension_of(filename).unwrap_or_default();
        if !self.allowed_extensions.iter().any(|e| e == &extension) {
            return Err(StagingError::DisallowedExtension {
                extension,
                allowed: self.allowed_extensions.join(", "),
            });
        }

        if let Some(mime) = mime_type {
            if !ALLOWED_MIME_TYPES.contains(&mime) {
                return Err(StagingError::DisallowedMime(mime.to_string()));
            }
        }

        Ok(extension)
    }

    /// Write the upload to disk under `<file_id>.<extension>`.
    pub async fn stage(
        &self,
        file_id: Uuid,
        extension: &str,
        data: &[u8],
    ) -> Result<PathBuf, StagingError> {
        let path = self.dir.join(format!("{}.{}", file_id, extension));
        if let Err(e) = tokio::fs::write(&path, data).await {
            // Drop any partial write before reporting.
            let _ = tokio::fs::remove_file(&path).await;
            return Err(StagingError::Io(e));
        }
        Ok(path)
    }
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Best-effort removal of a staged file after the response has been produced.
/// Failures are logged and swallowed; the stored record stays valid either way.
pub async fn cleanup_file(path: PathBuf) {
    match tokio::fs::remove_file(&path).await {
        Ok(()) => debug!("Cleaned up staged file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Staged file {} already gone", path.display())
        }
        Err(e) => warn!("Failed to clean up staged file {}: {}", path.display(), e),
    }
}
