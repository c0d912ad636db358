//! Application state shared by all handlers.

use conlearn_db::UploadRepository;
use conlearn_storage::Storage;
use std::sync::Arc;
use std::time::Duration;

use crate::services::UploadService;

#[derive(Clone)]
pub struct AppState {
    pub uploads: UploadService,
    /// Used directly by readiness checks
    pub repository: Arc<dyn UploadRepository>,
    /// `None` when object storage is not configured; upload endpoints then
    /// answer with a configuration error.
    pub storage: Option<Arc<dyn Storage>>,
}

impl AppState {
    pub fn new(
        storage: Option<Arc<dyn Storage>>,
        repository: Arc<dyn UploadRepository>,
        presign_expiry: Duration,
    ) -> Self {
        Self {
            uploads: UploadService::new(storage.clone(), repository.clone(), presign_expiry),
            repository,
            storage,
        }
    }
}
