//! Client-side upload flow: presign, PUT to storage, record metadata.
//!
//! ```text
//! Idle -> FileSelected -> RequestingUrl -> UploadingToStorage -> ConfirmingMetadata -> Succeeded -> Idle
//!                              \_________________ any failure __________________/
//!                                                    v
//!                                                 Failed
//! ```
//!
//! State changes, progress and status lines are published on a broadcast
//! channel so a UI or CLI can follow along.

use crate::gallery::{render_gallery, GalleryCard};
use crate::identity::{Identity, IdentityState};
use crate::uploader::{ObjectUploader, UploadProgress};
use crate::{ApiClient, ClientError, UploadSummary};
use async_trait::async_trait;
use bytes::Bytes;
use conlearn_core::models::{
    CompleteUploadRequest, CompleteUploadResponse, PresignUploadRequest, PresignUploadResponse,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

pub const SYNTHETIC_PROGRESS_STEP: u8 = 10;
pub const SYNTHETIC_PROGRESS_CAP: u8 = 90;
pub const SYNTHETIC_PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

const EVENT_CAPACITY: usize = 64;

/// Server calls the orchestrator depends on.
#[async_trait]
pub trait UploadBackend: Send + Sync {
    async fn presign(
        &self,
        request: &PresignUploadRequest,
    ) -> Result<PresignUploadResponse, ClientError>;

    async fn complete(
        &self,
        request: &CompleteUploadRequest,
    ) -> Result<CompleteUploadResponse, ClientError>;

    async fn list_uploads(&self, user_id: &str) -> Result<Vec<UploadSummary>, ClientError>;
}

#[async_trait]
impl UploadBackend for ApiClient {
    async fn presign(
        &self,
        request: &PresignUploadRequest,
    ) -> Result<PresignUploadResponse, ClientError> {
        ApiClient::presign(self, request).await
    }

    async fn complete(
        &self,
        request: &CompleteUploadRequest,
    ) -> Result<CompleteUploadResponse, ClientError> {
        ApiClient::complete(self, request).await
    }

    async fn list_uploads(&self, user_id: &str) -> Result<Vec<UploadSummary>, ClientError> {
        ApiClient::list_uploads(self, user_id).await
    }
}

/// A file chosen for upload, held in memory.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self::new(name, content_type, Bytes::from(bytes)))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Step of the handshake that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Issue,
    Storage,
    Record,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Upload failed: {message}")]
pub struct UploadFailure {
    pub stage: FailureStage,
    pub message: String,
}

impl UploadFailure {
    fn new(stage: FailureStage, error: ClientError) -> Self {
        Self {
            stage,
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    Idle,
    FileSelected { name: String, size: u64 },
    RequestingUrl,
    UploadingToStorage,
    ConfirmingMetadata,
    Succeeded(CompleteUploadResponse),
    Failed(UploadFailure),
}

impl UploadState {
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            UploadState::RequestingUrl
                | UploadState::UploadingToStorage
                | UploadState::ConfirmingMetadata
        )
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Sign in to upload files")]
    NotSignedIn,

    #[error("No file selected")]
    NoFileSelected,

    #[error(transparent)]
    Failed(#[from] UploadFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    StateChanged(UploadState),
    Progress(UploadProgress),
    Status(String),
    GalleryRefreshed(usize),
}

pub struct UploadOrchestrator {
    backend: Arc<dyn UploadBackend>,
    uploader: Arc<dyn ObjectUploader>,
    identity: IdentityState,
    state: UploadState,
    selected: Option<SelectedFile>,
    gallery: Vec<UploadSummary>,
    events: broadcast::Sender<UploadEvent>,
    progress_interval: Duration,
}

impl UploadOrchestrator {
    pub fn new(
        backend: Arc<dyn UploadBackend>,
        uploader: Arc<dyn ObjectUploader>,
        identity: IdentityState,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            uploader,
            identity,
            state: UploadState::Idle,
            selected: None,
            gallery: Vec::new(),
            events,
            progress_interval: SYNTHETIC_PROGRESS_INTERVAL,
        }
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn events(&self) -> broadcast::Receiver<UploadEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn gallery(&self) -> &[UploadSummary] {
        &self.gallery
    }

    pub fn cards(&self) -> Vec<GalleryCard> {
        render_gallery(&self.gallery)
    }

    pub fn select_file(&mut self, file: SelectedFile) {
        tracing::debug!(name = %file.name, size = file.size(), content_type = %file.content_type, "File selected");
        self.set_state(UploadState::FileSelected {
            name: file.name.clone(),
            size: file.size(),
        });
        self.selected = Some(file);
    }

    /// Run the full handshake for the selected file.
    ///
    /// On success the state returns to `Idle` and the gallery is refreshed; a
    /// failed refresh is logged and does not fail the upload.
    pub async fn upload(&mut self) -> Result<CompleteUploadResponse, UploadError> {
        let identity = self.identity.current().ok_or(UploadError::NotSignedIn)?;
        let file = self.selected.take().ok_or(UploadError::NoFileSelected)?;

        match self.run(&identity, &file).await {
            Ok(done) => {
                tracing::info!(upload_id = %done.upload_id, "Upload complete");
                self.set_state(UploadState::Succeeded(done.clone()));
                self.status("File uploaded successfully!");
                self.set_state(UploadState::Idle);
                let refreshed = self.refresh_gallery().await.map(|uploads| uploads.len());
                if let Err(e) = refreshed {
                    tracing::warn!(error = %e, "Failed to refresh uploads after upload");
                    self.status(&format!("Error loading files: {}", e));
                }
                Ok(done)
            }
            Err(failure) => {
                tracing::error!(stage = ?failure.stage, error = %failure.message, "Upload failed");
                self.status(&failure.to_string());
                self.set_state(UploadState::Failed(failure.clone()));
                Err(failure.into())
            }
        }
    }

    /// Reload the signed-in user's uploads. Signed out means an empty gallery.
    pub async fn refresh_gallery(&mut self) -> Result<&[UploadSummary], ClientError> {
        self.gallery = match self.identity.current() {
            Some(identity) => self.backend.list_uploads(&identity.user_id).await?,
            None => Vec::new(),
        };
        let _ = self
            .events
            .send(UploadEvent::GalleryRefreshed(self.gallery.len()));
        Ok(&self.gallery)
    }

    async fn run(
        &mut self,
        identity: &Identity,
        file: &SelectedFile,
    ) -> Result<CompleteUploadResponse, UploadFailure> {
        self.set_state(UploadState::RequestingUrl);
        self.status("Getting upload URL...");
        let file_size = i64::try_from(file.size()).ok();
        let issued = self
            .backend
            .presign(&PresignUploadRequest {
                file_name: file.name.clone(),
                file_type: file.content_type.clone(),
                user_id: identity.user_id.clone(),
                file_size,
            })
            .await
            .map_err(|e| UploadFailure::new(FailureStage::Issue, e))?;

        self.set_state(UploadState::UploadingToStorage);
        self.status("Uploading to storage...");
        self.put_with_progress(&issued.upload_url, file)
            .await
            .map_err(|e| UploadFailure::new(FailureStage::Storage, e))?;

        self.set_state(UploadState::ConfirmingMetadata);
        self.status("Saving metadata...");
        self.backend
            .complete(&CompleteUploadRequest {
                user_id: identity.user_id.clone(),
                file_name: file.name.clone(),
                file_type: file.content_type.clone(),
                file_size,
                key: issued.key,
            })
            .await
            .map_err(|e| UploadFailure::new(FailureStage::Record, e))
    }

    async fn put_with_progress(&self, url: &str, file: &SelectedFile) -> Result<(), ClientError> {
        let events = self.events.clone();
        let report = move |progress: UploadProgress| {
            let _ = events.send(UploadEvent::Progress(progress));
        };

        let put = self
            .uploader
            .put_object(url, &file.content_type, file.bytes.clone(), &report);

        if self.uploader.reports_progress() {
            put.await?;
            report(UploadProgress {
                percent: 100,
                exact: true,
            });
            return Ok(());
        }

        tokio::pin!(put);
        let mut ticker = tokio::time::interval(self.progress_interval);
        // First tick completes immediately
        ticker.tick().await;
        let mut percent = 0u8;

        let result = loop {
            tokio::select! {
                result = &mut put => break result,
                _ = ticker.tick() => {
                    if percent < SYNTHETIC_PROGRESS_CAP {
                        percent = (percent + SYNTHETIC_PROGRESS_STEP).min(SYNTHETIC_PROGRESS_CAP);
                        report(UploadProgress { percent, exact: false });
                    }
                }
            }
        };

        result?;
        report(UploadProgress {
            percent: 100,
            exact: false,
        });
        Ok(())
    }

    fn set_state(&mut self, state: UploadState) {
        self.state = state.clone();
        let _ = self.events.send(UploadEvent::StateChanged(state));
    }

    fn status(&self, message: &str) {
        let _ = self.events.send(UploadEvent::Status(message.to_string()));
    }
}
