//! Editor image upload.
//!
//! Images pasted into the description editor are uploaded on their own,
//! before the campaign is submitted, and referenced from the HTML by URL.
//! The body is streamed in fixed-size chunks so the caller can follow
//! progress and cancel between chunks.

use bytes::Bytes;
use futures::{future, stream, Stream, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
pub use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::client::OneHandClient;
use super::error::ApiError;
use crate::core::campaign::wizard::ImageFile;
use crate::core::session::AuthToken;

pub const UPLOAD_PATH: &str = "/api/campaigns/upload";

/// Multipart field the backend reads the image from.
pub const UPLOAD_FIELD: &str = "list";

pub const MAX_EDITOR_IMAGE_BYTES: u64 = 2048 * 2048;

pub const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Please select a valid image file")]
    NotAnImage { mime: String },

    #[error("Image is too large ({size} bytes, max {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("Upload cancelled")]
    Cancelled,

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub sent: u64,
    pub total: u64,
}

impl UploadProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.sent.min(self.total) * 100) / self.total) as u8
    }
}

struct ChunkState {
    sent: u64,
    total: u64,
    progress: Option<UnboundedSender<UploadProgress>>,
    cancel: CancellationToken,
    stopped: bool,
}

impl ChunkState {
    fn report(&self, sent: u64) {
        if let Some(tx) = &self.progress {
            // Receiver may be gone; progress is advisory.
            let _ = tx.send(UploadProgress {
                sent,
                total: self.total,
            });
        }
    }

    fn next_chunk(&mut self, chunk: Bytes) -> Option<std::io::Result<Bytes>> {
        if self.stopped {
            return None;
        }
        if self.cancel.is_cancelled() {
            self.stopped = true;
            return Some(Err(std::io::Error::new(
                std::io::ErrorKind::Interrupted,
                "upload cancelled",
            )));
        }
        self.sent += chunk.len() as u64;
        self.report(self.sent);
        Some(Ok(chunk))
    }
}

/// Split `data` into `chunk_size` pieces, reporting one progress event per
/// chunk and ending with an error once `cancel` is set.
pub fn chunked_body(
    data: Bytes,
    chunk_size: usize,
    progress: Option<UnboundedSender<UploadProgress>>,
    cancel: CancellationToken,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send + Sync + 'static {
    let chunk_size = chunk_size.max(1);
    let len = data.len();
    let chunks: Vec<Bytes> = (0..len)
        .step_by(chunk_size)
        .map(|start| data.slice(start..(start + chunk_size).min(len)))
        .collect();

    let state = ChunkState {
        sent: 0,
        total: len as u64,
        progress,
        cancel,
        stopped: false,
    };
    stream::iter(chunks).scan(state, |state, chunk| future::ready(state.next_chunk(chunk)))
}

impl OneHandClient {
    /// Upload one editor image and return the URL the backend stored it at.
    ///
    /// Progress events: `0%` before the request, one per chunk, and `100%`
    /// once the backend has answered.
    #[instrument(skip(self, token, file, progress, cancel), fields(file = %file.file_name))]
    pub async fn upload_editor_image(
        &self,
        token: &AuthToken,
        file: &ImageFile,
        progress: Option<UnboundedSender<UploadProgress>>,
        cancel: CancellationToken,
    ) -> Result<String, UploadError> {
        if !file.is_image() {
            return Err(UploadError::NotAnImage {
                mime: file.mime.clone(),
            });
        }
        let total = file.size();
        if total > MAX_EDITOR_IMAGE_BYTES {
            return Err(UploadError::TooLarge {
                size: total,
                max: MAX_EDITOR_IMAGE_BYTES,
            });
        }
        if cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }

        let report = |sent: u64| {
            if let Some(tx) = &progress {
                let _ = tx.send(UploadProgress { sent, total });
            }
        };
        report(0);

        let body = reqwest::Body::wrap_stream(chunked_body(
            file.bytes.clone(),
            CHUNK_SIZE,
            progress.clone(),
            cancel.clone(),
        ));
        let part = Part::stream_with_length(body, total)
            .file_name(file.file_name.clone())
            .mime_str(&file.mime)
            .map_err(ApiError::from)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let request = self
            .authed(Method::POST, UPLOAD_PATH, token)?
            .multipart(form);

        // The body stream only sees cancellation between chunks; a stalled
        // backend is abandoned here instead.
        let url = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Upload aborted by caller");
                return Err(UploadError::Cancelled);
            }
            result = async {
                let response = Self::ensure_success(request.send().await?).await?;
                Ok::<_, ApiError>(response.text().await?)
            } => match result {
                Ok(url) => url,
                Err(_) if cancel.is_cancelled() => {
                    debug!("Upload aborted by caller");
                    return Err(UploadError::Cancelled);
                }
                Err(e) => return Err(e.into()),
            },
        };
        report(total);
        info!("Uploaded editor image");
        Ok(url.trim().to_string())
    }
}
