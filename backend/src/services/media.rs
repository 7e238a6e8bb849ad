//! Uploaded image storage
//!
//! Images arrive as base64 data URLs (`data:image/png;base64,...`), are
//! checked against their declared type and written to the media root under a
//! random file name. Only the relative path is stored in the database.

use crate::config::MediaConfig;
use crate::error::ApiError;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Image payload errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("Image must be a base64 data URL")]
    NotDataUrl,

    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("Image payload is not valid base64")]
    InvalidEncoding,

    #[error("Image is empty")]
    Empty,

    #[error("Image content does not match declared type {0}")]
    SignatureMismatch(&'static str),

    #[error("Image exceeds the {0} byte limit")]
    TooLarge(usize),
}

/// What an image belongs to; decides the storage directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Recipe,
    Avatar,
}

impl MediaKind {
    fn dir(&self) -> &'static str {
        match self {
            MediaKind::Recipe => "recipes",
            MediaKind::Avatar => "avatars",
        }
    }

    /// Request field the image is submitted under
    pub fn field(&self) -> &'static str {
        match self {
            MediaKind::Recipe => "image",
            MediaKind::Avatar => "avatar",
        }
    }
}

/// A validated, decoded image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

fn extension_for(subtype: &str) -> Option<&'static str> {
    match subtype.to_ascii_lowercase().as_str() {
        "png" => Some("png"),
        "jpeg" | "jpg" => Some("jpg"),
        "gif" => Some("gif"),
        "webp" => Some("webp"),
        _ => None,
    }
}

fn has_signature(extension: &str, bytes: &[u8]) -> bool {
    match extension {
        "png" => bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
        "jpg" => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
        "gif" => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
        "webp" => bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP",
        _ => false,
    }
}

/// Decode and validate a `data:image/<type>;base64,<payload>` URL
pub fn decode_data_url(data: &str, max_bytes: usize) -> Result<DecodedImage, ImageError> {
    let rest = data.trim().strip_prefix("data:image/").ok_or(ImageError::NotDataUrl)?;
    let (subtype, payload) = rest.split_once(";base64,").ok_or(ImageError::NotDataUrl)?;

    let extension =
        extension_for(subtype).ok_or_else(|| ImageError::UnsupportedType(subtype.to_string()))?;

    // Base64 inflates by 4/3; reject oversized payloads before decoding them
    if payload.len() / 4 * 3 > max_bytes.saturating_add(3) {
        return Err(ImageError::TooLarge(max_bytes));
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| ImageError::InvalidEncoding)?;

    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(ImageError::TooLarge(max_bytes));
    }
    if !has_signature(extension, &bytes) {
        return Err(ImageError::SignatureMismatch(extension));
    }

    Ok(DecodedImage { extension, bytes })
}

/// Filesystem-backed media storage
#[derive(Clone)]
pub struct MediaStorage {
    config: Arc<MediaConfig>,
}

impl MediaStorage {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn root(&self) -> &Path {
        Path::new(&self.config.root)
    }

    /// Public URL of a stored file
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn absolute(&self, path: &str) -> PathBuf {
        self.root().join(path)
    }

    /// Validate and store a data URL, returning the stored relative path
    pub async fn save(&self, kind: MediaKind, data_url: &str) -> Result<String, ApiError> {
        let image = decode_data_url(data_url, self.config.max_image_bytes)
            .map_err(|e| ApiError::field(kind.field(), e.to_string()))?;

        self.write(kind, &image).await.map_err(ApiError::Internal)
    }

    /// Store already-decoded image bytes
    pub async fn write(&self, kind: MediaKind, image: &DecodedImage) -> anyhow::Result<String> {
        let relative = format!("{}/{}.{}", kind.dir(), Uuid::new_v4(), image.extension);
        let target = self.absolute(&relative);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &image.bytes).await?;

        debug!(path = %relative, bytes = image.bytes.len(), "Stored image");
        Ok(relative)
    }

    /// Remove a stored file; missing files are not an error
    pub async fn remove(&self, path: &str) {
        match tokio::fs::remove_file(self.absolute(path)).await {
            Ok(()) => debug!(path = %path, "Removed image"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path, "Failed to remove image: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// 1x1 transparent PNG
    pub(crate) const PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn png_data_url() -> String {
        format!("data:image/png;base64,{}", PIXEL_PNG)
    }

    #[test]
    fn test_decode_png() {
        let image = decode_data_url(&png_data_url(), 1024).unwrap();
        assert_eq!(image.extension, "png");
        assert!(image.bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[rstest]
    #[case("iVBORw0KGgo=", "plain base64 without prefix")]
    #[case("data:text/plain;base64,aGVsbG8=", "not an image")]
    #[case("data:image/png,raw-bytes", "missing base64 marker")]
    fn test_not_data_url(#[case] input: &str, #[case] _why: &str) {
        assert_eq!(decode_data_url(input, 1024), Err(ImageError::NotDataUrl));
    }

    #[test]
    fn test_unsupported_type() {
        let result = decode_data_url("data:image/svg+xml;base64,PHN2Zz4=", 1024);
        assert_eq!(result, Err(ImageError::UnsupportedType("svg+xml".to_string())));
    }

    #[test]
    fn test_declared_type_must_match_content() {
        let url = format!("data:image/jpeg;base64,{}", PIXEL_PNG);
        assert_eq!(decode_data_url(&url, 1024), Err(ImageError::SignatureMismatch("jpg")));
    }

    #[test]
    fn test_invalid_base64() {
        let result = decode_data_url("data:image/png;base64,!!!notbase64", 1024);
        assert_eq!(result, Err(ImageError::InvalidEncoding));
    }

    #[test]
    fn test_size_limit() {
        assert_eq!(decode_data_url(&png_data_url(), 16), Err(ImageError::TooLarge(16)));
    }

    #[test]
    fn test_url_joins_base() {
        let storage = MediaStorage::new(MediaConfig {
            base_url: "https://foodgram.example/media/".to_string(),
            ..MediaConfig::default()
        });
        assert_eq!(
            storage.url("recipes/a.png"),
            "https://foodgram.example/media/recipes/a.png"
        );
    }

    #[tokio::test]
    async fn test_save_and_remove_roundtrip_on_disk() {
        let root = std::env::temp_dir().join(format!("foodgram-media-{}", Uuid::new_v4()));
        let storage = MediaStorage::new(MediaConfig {
            root: root.to_string_lossy().into_owned(),
            ..MediaConfig::default()
        });

        let path = storage.save(MediaKind::Avatar, &png_data_url()).await.unwrap();
        assert!(path.starts_with("avatars/") && path.ends_with(".png"));
        assert!(root.join(&path).exists());

        storage.remove(&path).await;
        assert!(!root.join(&path).exists());

        // Removing twice is harmless
        storage.remove(&path).await;
        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_save_reports_field() {
        let storage = MediaStorage::new(MediaConfig::default());
        match storage.save(MediaKind::Recipe, "nope").await {
            Err(ApiError::InvalidField { field, .. }) => assert_eq!(field, "image"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
