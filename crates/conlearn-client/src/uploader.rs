//! Direct PUT of file bytes to a signed storage URL.

use crate::ClientError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client};
use tokio::sync::mpsc;

/// Bytes handed to the transport per progress report.
const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub percent: u8,
    /// False when the percentage is estimated rather than measured
    pub exact: bool,
}

pub type ProgressReporter = dyn Fn(UploadProgress) + Send + Sync;

#[async_trait]
pub trait ObjectUploader: Send + Sync {
    /// PUT `body` to `url` with the given content type. Any 2xx is success.
    async fn put_object(
        &self,
        url: &str,
        content_type: &str,
        body: Bytes,
        progress: &ProgressReporter,
    ) -> Result<(), ClientError>;

    /// Whether `put_object` calls `progress` with measured byte counts.
    fn reports_progress(&self) -> bool {
        false
    }
}

#[derive(Clone, Debug)]
pub struct HttpObjectUploader {
    client: Client,
}

impl HttpObjectUploader {
    pub fn new() -> Result<Self, ClientError> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }
}

/// Percentage of `total` covered by `sent`, held below 100 until storage answers.
fn sent_percent(sent: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((sent.min(total) * 100) / total).min(99) as u8
}

/// Split `body` into chunks without copying.
fn chunks(body: &Bytes) -> Vec<Bytes> {
    (0..body.len())
        .step_by(CHUNK_SIZE)
        .map(|start| body.slice(start..(start + CHUNK_SIZE).min(body.len())))
        .collect()
}

#[async_trait]
impl ObjectUploader for HttpObjectUploader {
    async fn put_object(
        &self,
        url: &str,
        content_type: &str,
        body: Bytes,
        progress: &ProgressReporter,
    ) -> Result<(), ClientError> {
        let size = body.len();
        let (sent_tx, mut sent_rx) = mpsc::unbounded_channel::<usize>();
        let stream = futures::stream::iter(chunks(&body)).map(move |chunk| {
            let _ = sent_tx.send(chunk.len());
            Ok::<Bytes, std::io::Error>(chunk)
        });

        // S3 refuses chunked transfer encoding, so the length is sent up front
        let send = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, size)
            .body(Body::wrap_stream(stream))
            .send();
        tokio::pin!(send);

        let mut sent = 0usize;
        let mut last_percent = None;
        let response = loop {
            tokio::select! {
                result = &mut send => break result?,
                Some(n) = sent_rx.recv() => {
                    sent += n;
                    let percent = sent_percent(sent, size);
                    if last_percent != Some(percent) {
                        last_percent = Some(percent);
                        progress(UploadProgress { percent, exact: true });
                    }
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), detail = %detail, "Storage rejected upload");
            return Err(ClientError::Http {
                status: status.as_u16(),
                message: format!("Failed to upload to storage (status {})", status.as_u16()),
            });
        }

        tracing::debug!(bytes = size, "Object uploaded");
        Ok(())
    }

    fn reports_progress(&self) -> bool {
        true
    }
}
