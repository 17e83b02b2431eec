//! Uploaded answer media (audio and photos).
//!
//! Files are written under the media directory with a content-addressed name
//! and served back at `/media/<name>`.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use domain::models::answer::MediaRef;

use crate::error::ApiError;

/// URL prefix the media directory is served under.
pub const MEDIA_URL_PREFIX: &str = "/media/";

/// A file written to the media directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    /// Server-relative URL, e.g. `/media/ab12...ef.webm`.
    pub url: String,
    pub content_type: String,
    pub file_name: String,
}

/// Media bytes resolved from a reference.
#[derive(Debug, Clone)]
pub struct MediaBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl MediaStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `bytes` under their SHA-256 name. Writing the same content twice
    /// is a no-op.
    pub async fn save(
        &self,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<StoredMedia, ApiError> {
        if bytes.is_empty() {
            return Err(ApiError::Validation("Uploaded file is empty".to_string()));
        }
        if bytes.len() > self.max_bytes {
            return Err(ApiError::Validation(format!(
                "Uploaded file exceeds {} bytes",
                self.max_bytes
            )));
        }

        let content_type = content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or("application/octet-stream")
            .to_string();
        let extension = mime_guess::get_mime_extensions_str(&content_type)
            .and_then(|exts| exts.first().copied());
        let file_name = shared::crypto::content_addressed_name(bytes, extension);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ApiError::Internal(format!("Cannot create media directory: {}", e)))?;

        let path = self.dir.join(&file_name);
        if tokio::fs::metadata(&path).await.is_err() {
            tokio::fs::write(&path, bytes)
                .await
                .map_err(|e| ApiError::Internal(format!("Cannot write media file: {}", e)))?;
            tracing::debug!(file = %file_name, bytes = bytes.len(), "Media stored");
        }

        Ok(StoredMedia {
            url: format!("{}{}", MEDIA_URL_PREFIX, file_name),
            content_type,
            file_name,
        })
    }

    /// Persists an inline reference and returns the URL to record. URL
    /// references are returned as they are.
    pub async fn persist(&self, media: &MediaRef) -> Result<String, ApiError> {
        match media {
            MediaRef::Url { url } => Ok(url.clone()),
            MediaRef::Inline {
                data_base64,
                content_type,
            } => {
                let (embedded_type, bytes) = decode_inline(data_base64)?;
                let content_type = content_type.as_deref().or(embedded_type.as_deref());
                Ok(self.save(&bytes, content_type).await?.url)
            }
        }
    }

    /// Reads a file previously stored here, given its `/media/...` URL.
    ///
    /// Returns `None` for foreign URLs and for names that try to leave the
    /// media directory.
    pub async fn load(&self, url: &str) -> Option<MediaBlob> {
        let name = url.strip_prefix(MEDIA_URL_PREFIX)?;
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return None;
        }
        let bytes = tokio::fs::read(self.dir.join(name)).await.ok()?;
        let content_type = mime_guess::from_path(name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Some(MediaBlob {
            bytes,
            content_type,
            file_name: name.to_string(),
        })
    }
}

/// Decodes base64 media, accepting an optional `data:<type>;base64,` prefix.
/// Returns the content type found in the prefix, if any.
pub fn decode_inline(data: &str) -> Result<(Option<String>, Vec<u8>), ApiError> {
    let (content_type, payload) = match data.strip_prefix("data:") {
        Some(rest) => {
            let (meta, payload) = rest
                .split_once(',')
                .ok_or_else(|| ApiError::Validation("Malformed data URL".to_string()))?;
            let content_type = meta
                .strip_suffix(";base64")
                .filter(|ct| !ct.is_empty())
                .map(str::to_string);
            (content_type, payload)
        }
        None => (None, data),
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ApiError::Validation(format!("Invalid base64 media: {}", e)))?;
    Ok((content_type, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> MediaStore {
        MediaStore::new(dir.path(), 1024)
    }

    #[tokio::test]
    async fn test_save_is_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        let media = store(&dir);

        let a = media.save(b"photo-bytes", Some("image/png")).await.unwrap();
        let b = media.save(b"photo-bytes", Some("image/png")).await.unwrap();
        assert_eq!(a, b);
        assert!(a.url.starts_with("/media/"));
        assert!(a.file_name.ends_with(".png"));
        assert!(dir.path().join(&a.file_name).exists());
    }

    #[tokio::test]
    async fn test_save_rejects_empty_and_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let media = store(&dir);

        assert!(matches!(
            media.save(b"", None).await,
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            media.save(&[0u8; 2048], None).await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_persist_inline_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let media = store(&dir);

        let url = media
            .persist(&MediaRef::Inline {
                data_base64: STANDARD.encode(b"pixels"),
                content_type: Some("image/png".to_string()),
            })
            .await
            .unwrap();

        let blob = media.load(&url).await.unwrap();
        assert_eq!(blob.bytes, b"pixels");
        assert_eq!(blob.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_persist_url_is_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let url = store(&dir)
            .persist(&MediaRef::Url {
                url: "https://cdn.example/a.jpg".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example/a.jpg");
    }

    #[tokio::test]
    async fn test_load_rejects_traversal_and_foreign_urls() {
        let dir = tempfile::tempdir().unwrap();
        let media = store(&dir);
        assert!(media.load("/media/../secret").await.is_none());
        assert!(media.load("/media/a/b").await.is_none());
        assert!(media.load("https://cdn.example/a.jpg").await.is_none());
    }

    #[test]
    fn test_decode_inline_data_url() {
        let (ct, bytes) = decode_inline("data:image/jpeg;base64,aGk=").unwrap();
        assert_eq!(ct.as_deref(), Some("image/jpeg"));
        assert_eq!(bytes, b"hi");

        let (ct, bytes) = decode_inline("aGk=").unwrap();
        assert!(ct.is_none());
        assert_eq!(bytes, b"hi");

        assert!(decode_inline("not base64!").is_err());
    }
}
