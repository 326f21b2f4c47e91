//! Image uploads attached to item reports.
//!
//! The extension allow-list is checked on the submitted name before anything
//! touches the disk. Same-named uploads overwrite each other.

use std::path::PathBuf;
use std::sync::LazyLock;

use axum::body::Bytes;
use regex::Regex;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

use crate::config::UploadConfig;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid filename regex"));

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid image format")]
    InvalidImageFormat { file_name: String },

    #[error("Failed to store upload {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// A file part taken from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Name as sent by the client; untrusted.
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

pub struct UploadService {
    directory: PathBuf,
    allowed_extensions: Vec<String>,
}

impl UploadService {
    #[must_use]
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            directory: PathBuf::from(&config.directory),
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub async fn ensure_directory(&self) -> Result<(), UploadError> {
        fs::create_dir_all(&self.directory)
            .await
            .map_err(|source| UploadError::Io {
                path: self.directory.display().to_string(),
                source,
            })
    }

    /// Returns the stored filename, or `None` when no file was selected.
    pub async fn accept_image(
        &self,
        upload: Option<UploadedFile>,
    ) -> Result<Option<String>, UploadError> {
        let Some(upload) = upload.filter(|file| !file.file_name.is_empty()) else {
            return Ok(None);
        };

        let filename = self.checked_filename(&upload.file_name)?;

        self.ensure_directory().await?;
        let path = self.directory.join(&filename);
        fs::write(&path, &upload.bytes)
            .await
            .map_err(|source| UploadError::Io {
                path: path.display().to_string(),
                source,
            })?;

        info!(
            filename = %filename,
            bytes = upload.bytes.len(),
            "Image stored"
        );
        Ok(Some(filename))
    }

    fn checked_filename(&self, original: &str) -> Result<String, UploadError> {
        let invalid = || UploadError::InvalidImageFormat {
            file_name: original.to_string(),
        };

        // The extension is judged on the name as sent, before sanitizing.
        let extension = original
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .ok_or_else(invalid)?;

        if !self.allowed_extensions.contains(&extension) {
            debug!(file_name = %original, "Rejected upload extension");
            return Err(invalid());
        }

        secure_filename(original).ok_or_else(invalid)
    }
}

/// Reduces a client-supplied filename to a safe single path component.
///
/// Returns `None` when nothing usable is left.
#[must_use]
pub fn secure_filename(name: &str) -> Option<String> {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let stripped = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    let trimmed = stripped.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn service(dir: &Path) -> UploadService {
        UploadService::new(&UploadConfig {
            directory: dir.display().to_string(),
            ..UploadConfig::default()
        })
    }

    fn temp_upload_dir() -> PathBuf {
        std::env::temp_dir().join(format!("lostfound-upload-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn secure_filename_strips_traversal_and_unsafe_chars() {
        assert_eq!(secure_filename("photo.png").as_deref(), Some("photo.png"));
        assert_eq!(
            secure_filename("../../etc/passwd").as_deref(),
            Some("etc_passwd")
        );
        assert_eq!(
            secure_filename("my cat (1).JPG").as_deref(),
            Some("my_cat_1.JPG")
        );
        assert_eq!(
            secure_filename("C:\\Users\\me\\wallet.gif").as_deref(),
            Some("C_Users_me_wallet.gif")
        );
        assert_eq!(secure_filename("ünïcödé.png").as_deref(), Some("unicode.png"));
        assert_eq!(secure_filename("ﬁle.png").as_deref(), Some("file.png"));
        assert_eq!(secure_filename("..."), None);
        assert_eq!(secure_filename(""), None);
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let svc = service(Path::new("unused"));
        assert!(svc.checked_filename("PHOTO.PNG").is_ok());
        assert!(svc.checked_filename("photo.jpeg").is_ok());
        assert!(svc.checked_filename("photo.exe").is_err());
        assert!(svc.checked_filename("photo").is_err());
        assert!(svc.checked_filename("png").is_err());
    }

    #[test]
    fn extension_is_judged_before_sanitizing() {
        let svc = service(Path::new("unused"));
        assert_eq!(svc.checked_filename(".png").unwrap(), "png");
        assert_eq!(svc.checked_filename("ünïcödé.png").unwrap(), "unicode.png");
        assert!(svc.checked_filename("photo.png ").is_err());
        assert!(svc.checked_filename("...").is_err());
    }

    #[tokio::test]
    async fn no_file_selected_is_not_an_error() {
        let dir = temp_upload_dir();
        let svc = service(&dir);

        assert_eq!(svc.accept_image(None).await.unwrap(), None);
        assert_eq!(
            svc.accept_image(Some(UploadedFile::new("", Vec::<u8>::new())))
                .await
                .unwrap(),
            None
        );
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn allowed_image_is_written_under_sanitized_name() {
        let dir = temp_upload_dir();
        let svc = service(&dir);

        let stored = svc
            .accept_image(Some(UploadedFile::new("../photo.png", b"png-bytes".to_vec())))
            .await
            .unwrap();

        assert_eq!(stored.as_deref(), Some("photo.png"));
        assert_eq!(std::fs::read(dir.join("photo.png")).unwrap(), b"png-bytes");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn rejected_image_writes_nothing() {
        let dir = temp_upload_dir();
        let svc = service(&dir);

        let err = svc
            .accept_image(Some(UploadedFile::new("photo.exe", b"MZ".to_vec())))
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::InvalidImageFormat { .. }));
        assert!(!dir.exists());
    }
}
