//! Files API calls.
//!
//! Request and response bodies are the server's own types from
//! `conlearn_core::models`; listings are read into the more tolerant
//! [`UploadSummary`].

use crate::models::UploadList;
use crate::{read_json, ApiClient, ClientError, UploadSummary};
use conlearn_core::models::{
    CompleteUploadRequest, CompleteUploadResponse, DeleteUploadResponse, PresignUploadRequest,
    PresignUploadResponse,
};
use uuid::Uuid;

pub const FILES_PREFIX: &str = "/api/files";

impl ApiClient {
    /// Ask the server for a signed PUT URL.
    pub async fn presign(
        &self,
        request: &PresignUploadRequest,
    ) -> Result<PresignUploadResponse, ClientError> {
        self.post_json(&format!("{}/presign", FILES_PREFIX), request)
            .await
    }

    /// Record an object the client has already PUT to storage.
    pub async fn complete(
        &self,
        request: &CompleteUploadRequest,
    ) -> Result<CompleteUploadResponse, ClientError> {
        self.post_json(&format!("{}/complete", FILES_PREFIX), request)
            .await
    }

    /// The user's uploads, newest first.
    pub async fn list_uploads(&self, user_id: &str) -> Result<Vec<UploadSummary>, ClientError> {
        let list: UploadList = self
            .get(&format!(
                "{}/user/{}",
                FILES_PREFIX,
                urlencoding::encode(user_id)
            ))
            .await?;
        Ok(list.uploads)
    }

    pub async fn delete_upload(
        &self,
        user_id: &str,
        upload_id: Uuid,
    ) -> Result<DeleteUploadResponse, ClientError> {
        let url = self.build_url(&format!("{}/{}", FILES_PREFIX, upload_id));
        let response = self
            .client()
            .delete(url)
            .query(&[("userId", user_id)])
            .send()
            .await?;
        read_json(response).await
    }
}
