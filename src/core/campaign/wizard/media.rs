//! Main image staging for the media step.
//!
//! Selection is validated locally (MIME type and size) and the accepted file is
//! kept in memory together with a `data:` URI preview. Nothing is uploaded here;
//! the bytes only leave the process as the `main` part of the final submission.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;

/// Largest accepted main image (5 MiB, inclusive).
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("Please select a valid image file")]
    NotAnImage { mime: String },

    #[error("Image size should be less than 5MB")]
    TooLarge { size: u64, max: u64 },
}

/// A file picked by the user, with the MIME type it reported.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Bytes,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, taking its MIME type from the content.
    pub async fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let mime = sniff_mime(&bytes);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        log::debug!("Loaded {} ({} bytes, {})", path.display(), bytes.len(), mime);
        Ok(Self::new(file_name, mime, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    /// `data:<mime>;base64,<payload>` for local display.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }
}

/// Best-effort MIME detection from magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> String {
    match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type().to_string(),
        Err(_) => FALLBACK_MIME.to_string(),
    }
}

/// An accepted image and its preview.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedImage {
    pub file: ImageFile,
    pub preview_uri: String,
}

/// Holds at most one staged image plus the last staging error.
#[derive(Debug, Clone, Default)]
pub struct MediaStaging {
    staged: Option<StagedImage>,
    error: Option<MediaError>,
}

impl MediaStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and stage `file`, replacing any previous selection.
    ///
    /// A rejected file leaves the current selection untouched and records the
    /// error for display.
    pub fn select_file(&mut self, file: ImageFile) -> Result<(), MediaError> {
        if let Err(e) = check_image(&file) {
            log::debug!("Rejected image {}: {}", file.file_name, e);
            self.error = Some(e.clone());
            return Err(e);
        }

        let preview_uri = file.data_uri();
        self.staged = Some(StagedImage { file, preview_uri });
        self.error = None;
        Ok(())
    }

    pub fn remove_file(&mut self) {
        self.staged = None;
        self.error = None;
    }

    pub fn staged(&self) -> Option<&StagedImage> {
        self.staged.as_ref()
    }

    pub fn preview_uri(&self) -> Option<&str> {
        self.staged.as_ref().map(|s| s.preview_uri.as_str())
    }

    pub fn error(&self) -> Option<&MediaError> {
        self.error.as_ref()
    }
}

fn check_image(file: &ImageFile) -> Result<(), MediaError> {
    if !file.is_image() {
        return Err(MediaError::NotAnImage {
            mime: file.mime.clone(),
        });
    }
    if file.size() > MAX_IMAGE_BYTES {
        return Err(MediaError::TooLarge {
            size: file.size(),
            max: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn jpeg(size: usize) -> ImageFile {
        ImageFile::new("photo.jpg", "image/jpeg", vec![0u8; size])
    }

    #[test]
    fn test_accepts_image_at_exact_limit() {
        let mut staging = MediaStaging::new();
        assert!(staging.select_file(jpeg(MAX_IMAGE_BYTES as usize)).is_ok());
        assert!(staging.staged().is_some());
        assert!(staging.error().is_none());
    }

    #[test]
    fn test_rejects_image_one_byte_over_limit() {
        let mut staging = MediaStaging::new();
        let err = staging.select_file(jpeg(MAX_IMAGE_BYTES as usize + 1)).unwrap_err();
        assert_eq!(
            err,
            MediaError::TooLarge {
                size: MAX_IMAGE_BYTES + 1,
                max: MAX_IMAGE_BYTES
            }
        );
        assert!(staging.staged().is_none());
        assert_eq!(staging.error(), Some(&err));
    }

    #[test]
    fn test_rejects_non_image_mime() {
        let mut staging = MediaStaging::new();
        let file = ImageFile::new("notes.pdf", "application/pdf", vec![1, 2, 3]);
        assert!(matches!(
            staging.select_file(file),
            Err(MediaError::NotAnImage { .. })
        ));
    }

    #[test]
    fn test_rejection_keeps_previous_selection() {
        let mut staging = MediaStaging::new();
        staging.select_file(jpeg(16)).unwrap();
        let before = staging.preview_uri().map(str::to_string);

        let _ = staging.select_file(ImageFile::new("a.txt", "text/plain", "hello"));

        assert_eq!(staging.preview_uri().map(str::to_string), before);
        assert!(staging.error().is_some());
    }

    #[test]
    fn test_reselection_replaces_preview_and_clears_error() {
        let mut staging = MediaStaging::new();
        staging.select_file(jpeg(4)).unwrap();
        let _ = staging.select_file(jpeg(MAX_IMAGE_BYTES as usize + 1));
        staging
            .select_file(ImageFile::new("logo.png", "image/png", PNG_MAGIC.to_vec()))
            .unwrap();

        assert!(staging.error().is_none());
        let preview = staging.preview_uri().unwrap();
        assert!(preview.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_remove_clears_everything() {
        let mut staging = MediaStaging::new();
        staging.select_file(jpeg(4)).unwrap();
        let _ = staging.select_file(jpeg(MAX_IMAGE_BYTES as usize + 1));
        staging.remove_file();
        assert!(staging.staged().is_none());
        assert!(staging.preview_uri().is_none());
        assert!(staging.error().is_none());
    }

    #[test]
    fn test_data_uri_encodes_bytes() {
        let file = ImageFile::new("x.gif", "image/gif", b"GIF89a".to_vec());
        assert_eq!(file.data_uri(), "data:image/gif;base64,R0lGODlh");
    }

    #[test]
    fn test_sniff_mime() {
        assert_eq!(sniff_mime(PNG_MAGIC), "image/png");
        assert_eq!(sniff_mime(b"plain text"), FALLBACK_MIME);
    }

    #[tokio::test]
    async fn test_load_reads_file_and_detects_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banner.png");
        std::fs::write(&path, PNG_MAGIC).unwrap();

        let file = ImageFile::load(&path).await.unwrap();
        assert_eq!(file.file_name, "banner.png");
        assert_eq!(file.mime, "image/png");
        assert_eq!(file.size(), PNG_MAGIC.len() as u64);
    }
}
