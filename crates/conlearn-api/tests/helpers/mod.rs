//! Shared fixtures for API integration tests: in-memory repository, a signing
//! storage double, and a ready-to-use `TestServer`.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use conlearn_api::setup::routes::setup_routes;
use conlearn_api::AppState;
use conlearn_core::models::{NewUpload, UploadRecord};
use conlearn_core::{AppError, Config};
use conlearn_db::UploadRepository;
use conlearn_storage::{Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const BUCKET: &str = "conlearn-test";
pub const REGION: &str = "eu-west-1";

/// Upload repository kept in memory
#[derive(Clone, Default)]
pub struct InMemoryUploadRepository {
    records: Arc<Mutex<Vec<UploadRecord>>>,
    fail: Arc<AtomicBool>,
}

impl InMemoryUploadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail like a lost connection
    pub fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Insert a record with an explicit timestamp.
    pub fn seed(&self, user_id: &str, file_name: &str, uploaded_at: DateTime<Utc>) -> UploadRecord {
        let key = format!("{}/uploads/{}.png", user_id, Uuid::new_v4());
        let record = UploadRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            file_name: file_name.to_string(),
            file_size: Some(1024),
            file_type: "image/png".to_string(),
            s3_url: format!("https://{}.s3.{}.amazonaws.com/{}", BUCKET, REGION, key),
            storage_key: key,
            uploaded_at,
            deleted_at: None,
        };
        self.records.lock().unwrap().push(record.clone());
        record
    }

    pub fn all(&self) -> Vec<UploadRecord> {
        self.records.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(AppError::Internal("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UploadRepository for InMemoryUploadRepository {
    async fn insert(&self, upload: NewUpload) -> Result<UploadRecord, AppError> {
        self.check()?;
        let record = UploadRecord {
            id: Uuid::new_v4(),
            user_id: upload.user_id,
            file_name: upload.file_name,
            file_size: upload.file_size,
            file_type: upload.file_type,
            storage_key: upload.storage_key,
            s3_url: upload.s3_url,
            uploaded_at: Utc::now(),
            deleted_at: None,
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<UploadRecord>, AppError> {
        self.check()?;
        let mut records: Vec<UploadRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && r.deleted_at.is_none())
            .cloned()
            .collect();
        records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        records.truncate(limit as usize);
        Ok(records)
    }

    async fn soft_delete(
        &self,
        user_id: &str,
        upload_id: Uuid,
    ) -> Result<Option<UploadRecord>, AppError> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        let found = records
            .iter_mut()
            .find(|r| r.id == upload_id && r.user_id == user_id && r.deleted_at.is_none());
        Ok(found.map(|record| {
            record.deleted_at = Some(Utc::now());
            record.clone()
        }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check()
    }
}

/// Storage double that produces S3-shaped signed URLs and counts signings.
#[derive(Clone, Default)]
pub struct FakeStorage {
    signed: Arc<AtomicUsize>,
    fail_signing: Arc<AtomicBool>,
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signing_count(&self) -> usize {
        self.signed.load(Ordering::SeqCst)
    }

    pub fn fail_signing(&self) {
        self.fail_signing.store(true, Ordering::SeqCst);
    }

    /// Simulate the client's direct PUT to the signed URL
    pub fn put_object(&self, key: &str, body: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), body);
    }
}

#[async_trait]
impl Storage for FakeStorage {
    async fn presigned_put_url(
        &self,
        storage_key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if self.fail_signing.load(Ordering::SeqCst) {
            return Err(StorageError::SigningFailed("credentials expired".to_string()));
        }
        self.signed.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "https://{}.s3.{}.amazonaws.com/{}?X-Amz-Algorithm=AWS4-HMAC-SHA256&X-Amz-Expires={}&X-Amz-Signature=fake",
            BUCKET,
            REGION,
            storage_key,
            expires_in.as_secs()
        ))
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("https://{}.s3.{}.amazonaws.com/{}", BUCKET, REGION, storage_key)
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(storage_key))
    }

    fn bucket(&self) -> &str {
        BUCKET
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub repository: InMemoryUploadRepository,
    pub storage: FakeStorage,
}

fn test_config() -> Config {
    let vars: HashMap<&str, &str> = [
        ("DATABASE_URL", "postgres://localhost/conlearn_test"),
        ("S3_BUCKET", BUCKET),
        ("S3_REGION", REGION),
    ]
    .into_iter()
    .collect();
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("test configuration should load")
}

fn build(storage: Option<FakeStorage>, repository: InMemoryUploadRepository) -> TestServer {
    let config = test_config();
    let state = Arc::new(AppState::new(
        storage.map(|s| Arc::new(s) as Arc<dyn Storage>),
        Arc::new(repository),
        config.presign_expiry(),
    ));
    let app = setup_routes(&config, state).expect("routes should build");
    TestServer::new(app.into_make_service()).expect("Failed to create test server")
}

/// Server backed by fresh in-memory doubles
pub fn setup_test_app() -> TestApp {
    let repository = InMemoryUploadRepository::new();
    let storage = FakeStorage::new();
    let server = build(Some(storage.clone()), repository.clone());
    TestApp {
        server,
        repository,
        storage,
    }
}

/// Server with no object storage configured
pub fn setup_test_app_without_storage() -> TestApp {
    let repository = InMemoryUploadRepository::new();
    let server = build(None, repository.clone());
    TestApp {
        server,
        repository,
        storage: FakeStorage::new(),
    }
}

pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    Utc::now() - ChronoDuration::minutes(minutes)
}
