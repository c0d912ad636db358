mod helpers;

use helpers::{minutes_ago, setup_test_app, setup_test_app_without_storage, BUCKET, REGION};
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_reports_ok() {
    let app = setup_test_app();

    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let data: Value = response.json();
    assert_eq!(data["status"], "OK");
}

#[tokio::test]
async fn test_presign_returns_user_scoped_key_and_expiring_url() {
    let app = setup_test_app();

    let response = app
        .server
        .post("/api/files/presign")
        .json(&json!({ "fileName": "a.png", "fileType": "image/png", "userId": "u1" }))
        .await;

    assert_eq!(response.status_code(), 200);
    let data: Value = response.json();
    let key = data["key"].as_str().expect("key in response");
    assert!(key.starts_with("u1/uploads/"));
    assert!(key.ends_with(".png"));
    let url = data["uploadUrl"].as_str().expect("uploadUrl in response");
    assert!(url.contains("X-Amz-Expires=300"));
    assert!(data["expiresAt"].is_string());
    assert_eq!(app.storage.signing_count(), 1);
}

#[tokio::test]
async fn test_presign_without_extension_uses_bin() {
    let app = setup_test_app();

    let response = app
        .server
        .post("/api/files/presign")
        .json(&json!({ "fileName": "notes", "fileType": "text/plain", "userId": "u1" }))
        .await;

    assert_eq!(response.status_code(), 200);
    let data: Value = response.json();
    assert!(data["key"].as_str().unwrap().ends_with(".bin"));
}

#[tokio::test]
async fn test_presign_missing_fields_is_400_and_signs_nothing() {
    let app = setup_test_app();

    let response = app
        .server
        .post("/api/files/presign")
        .json(&json!({ "fileType": "image/png" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let data: Value = response.json();
    let error = data["error"].as_str().unwrap();
    assert!(error.contains("fileName"));
    assert!(error.contains("userId"));
    assert_eq!(data["code"], "INVALID_INPUT");
    assert_eq!(app.storage.signing_count(), 0);
}

#[tokio::test]
async fn test_presign_negative_file_size_is_400_and_signs_nothing() {
    let app = setup_test_app();

    let response = app
        .server
        .post("/api/files/presign")
        .json(&json!({
            "fileName": "a.png",
            "fileType": "image/png",
            "userId": "u1",
            "fileSize": -1
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let data: Value = response.json();
    assert!(data["error"].as_str().unwrap().contains("fileSize"));
    assert_eq!(data["code"], "INVALID_INPUT");
    assert_eq!(app.storage.signing_count(), 0);
}

#[tokio::test]
async fn test_presign_rejects_user_id_with_path_separator() {
    let app = setup_test_app();

    let response = app
        .server
        .post("/api/files/presign")
        .json(&json!({ "fileName": "a.png", "fileType": "image/png", "userId": "../u2" }))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.storage.signing_count(), 0);
}

#[tokio::test]
async fn test_presign_signing_failure_is_500_without_details() {
    let app = setup_test_app();
    app.storage.fail_signing();

    let response = app
        .server
        .post("/api/files/presign")
        .json(&json!({ "fileName": "a.png", "fileType": "image/png", "userId": "u1" }))
        .await;

    assert_eq!(response.status_code(), 500);
    let data: Value = response.json();
    assert_eq!(data["code"], "STORAGE_ERROR");
    assert!(data.get("details").is_none());
    assert!(!data["error"].as_str().unwrap().contains("credentials"));
}

#[tokio::test]
async fn test_presign_without_storage_configuration_is_500() {
    let app = setup_test_app_without_storage();

    let response = app
        .server
        .post("/api/files/presign")
        .json(&json!({ "fileName": "a.png", "fileType": "image/png", "userId": "u1" }))
        .await;

    assert_eq!(response.status_code(), 500);
    let data: Value = response.json();
    assert_eq!(data["code"], "CONFIGURATION_ERROR");
}

#[tokio::test]
async fn test_complete_records_upload_with_public_url() {
    let app = setup_test_app();

    let response = app
        .server
        .post("/api/files/complete")
        .json(&json!({
            "userId": "u1",
            "fileName": "a.png",
            "fileType": "image/png",
            "fileSize": 2048,
            "key": "u1/uploads/abc.png"
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let data: Value = response.json();
    assert!(data["uploadId"].is_string());
    assert_eq!(
        data["s3Url"],
        format!("https://{}.s3.{}.amazonaws.com/u1/uploads/abc.png", BUCKET, REGION)
    );

    let stored = app.repository.all();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].file_size, Some(2048));
    assert_eq!(stored[0].storage_key, "u1/uploads/abc.png");
}

#[tokio::test]
async fn test_complete_negative_file_size_is_400() {
    let app = setup_test_app();

    let response = app
        .server
        .post("/api/files/complete")
        .json(&json!({
            "userId": "u1",
            "fileName": "a.png",
            "fileType": "image/png",
            "fileSize": -1,
            "key": "u1/uploads/abc.png"
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let data: Value = response.json();
    assert!(data["error"].as_str().unwrap().contains("fileSize"));
    assert!(app.repository.all().is_empty());
}

#[tokio::test]
async fn test_complete_missing_key_is_400() {
    let app = setup_test_app();

    let response = app
        .server
        .post("/api/files/complete")
        .json(&json!({ "userId": "u1", "fileName": "a.png", "fileType": "image/png" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let data: Value = response.json();
    assert!(data["error"].as_str().unwrap().contains("key"));
}

#[tokio::test]
async fn test_complete_same_key_twice_creates_two_records() {
    let app = setup_test_app();
    let body = json!({
        "userId": "u1",
        "fileName": "a.png",
        "fileType": "image/png",
        "key": "u1/uploads/dup.png"
    });

    let first = app.server.post("/api/files/complete").json(&body).await;
    let second = app.server.post("/api/files/complete").json(&body).await;
    assert_eq!(first.status_code(), 200);
    assert_eq!(second.status_code(), 200);

    let first: Value = first.json();
    let second: Value = second.json();
    assert_ne!(first["uploadId"], second["uploadId"]);
    assert_eq!(app.repository.all().len(), 2);
}

#[tokio::test]
async fn test_complete_database_failure_is_500() {
    let app = setup_test_app();
    app.repository.fail_all();

    let response = app
        .server
        .post("/api/files/complete")
        .json(&json!({
            "userId": "u1",
            "fileName": "a.png",
            "fileType": "image/png",
            "key": "u1/uploads/abc.png"
        }))
        .await;

    assert_eq!(response.status_code(), 500);
}

#[tokio::test]
async fn test_list_unknown_user_is_empty() {
    let app = setup_test_app();

    let response = app.server.get("/api/files/user/nobody").await;
    assert_eq!(response.status_code(), 200);
    let data: Value = response.json();
    assert_eq!(data["uploads"], json!([]));
}

#[tokio::test]
async fn test_list_is_newest_first_and_capped_at_50() {
    let app = setup_test_app();
    for i in 0..60 {
        app.repository
            .seed("u1", &format!("file-{}.png", i), minutes_ago(60 - i));
    }
    app.repository.seed("u2", "other.png", minutes_ago(0));

    let response = app.server.get("/api/files/user/u1").await;
    assert_eq!(response.status_code(), 200);
    let data: Value = response.json();
    let uploads = data["uploads"].as_array().unwrap();
    assert_eq!(uploads.len(), 50);
    assert_eq!(uploads[0]["fileName"], "file-59.png");
    assert!(uploads.iter().all(|u| u["userId"] == "u1"));

    let timestamps: Vec<&str> = uploads
        .iter()
        .map(|u| u["uploadedAt"].as_str().unwrap())
        .collect();
    let parsed: Vec<chrono::DateTime<chrono::Utc>> =
        timestamps.iter().map(|t| t.parse().unwrap()).collect();
    assert!(parsed.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_list_database_failure_is_500() {
    let app = setup_test_app();
    app.repository.fail_all();

    let response = app.server.get("/api/files/user/u1").await;
    assert_eq!(response.status_code(), 500);
    let data: Value = response.json();
    assert_eq!(data["code"], "INTERNAL_ERROR");
}

#[tokio::test]
async fn test_full_presign_put_complete_list_scenario() {
    let app = setup_test_app();

    let presign = app
        .server
        .post("/api/files/presign")
        .json(&json!({
            "fileName": "holiday.JPG",
            "fileType": "image/jpeg",
            "userId": "u1",
            "fileSize": 2048
        }))
        .await;
    assert_eq!(presign.status_code(), 200);
    let presign: Value = presign.json();
    let key = presign["key"].as_str().unwrap().to_string();
    assert!(key.ends_with(".jpg"));

    // Client PUTs the bytes straight to storage
    app.storage.put_object(&key, vec![0u8; 2048]);

    let complete = app
        .server
        .post("/api/files/complete")
        .json(&json!({
            "userId": "u1",
            "fileName": "holiday.JPG",
            "fileType": "image/jpeg",
            "fileSize": 2048,
            "key": &key
        }))
        .await;
    assert_eq!(complete.status_code(), 200);
    let complete: Value = complete.json();

    let list = app.server.get("/api/files/user/u1").await;
    assert_eq!(list.status_code(), 200);
    let list: Value = list.json();
    let uploads = list["uploads"].as_array().unwrap();
    assert_eq!(uploads.len(), 1);
    let record = &uploads[0];
    assert_eq!(record["id"], complete["uploadId"]);
    assert_eq!(record["storageKey"], key.as_str());
    assert_eq!(record["s3Url"], complete["s3Url"]);
    assert_eq!(record["fileSize"], 2048);
    assert_eq!(record["fileType"], "image/jpeg");
    assert!(record.get("deletedAt").is_none());
}

#[tokio::test]
async fn test_delete_hides_upload_from_listing() {
    let app = setup_test_app();
    let kept = app.repository.seed("u1", "kept.png", minutes_ago(5));
    let removed = app.repository.seed("u1", "removed.png", minutes_ago(1));

    let response = app
        .server
        .delete(&format!("/api/files/{}?userId=u1", removed.id))
        .await;
    assert_eq!(response.status_code(), 200);
    let data: Value = response.json();
    assert_eq!(data["uploadId"], removed.id.to_string());
    assert!(data["deletedAt"].is_string());

    let list: Value = app.server.get("/api/files/user/u1").await.json();
    let uploads = list["uploads"].as_array().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0]["id"], kept.id.to_string());
}

#[tokio::test]
async fn test_delete_requires_user_id_and_ownership() {
    let app = setup_test_app();
    let record = app.repository.seed("u1", "mine.png", minutes_ago(1));

    let missing = app
        .server
        .delete(&format!("/api/files/{}", record.id))
        .await;
    assert_eq!(missing.status_code(), 400);

    let foreign = app
        .server
        .delete(&format!("/api/files/{}?userId=u2", record.id))
        .await;
    assert_eq!(foreign.status_code(), 404);

    let twice = app
        .server
        .delete(&format!("/api/files/{}?userId=u1", record.id))
        .await;
    assert_eq!(twice.status_code(), 200);
    let again = app
        .server
        .delete(&format!("/api/files/{}?userId=u1", record.id))
        .await;
    assert_eq!(again.status_code(), 404);
}

#[tokio::test]
async fn test_delete_malformed_upload_id_is_json_400() {
    let app = setup_test_app();

    let response = app
        .server
        .delete("/api/files/not-a-uuid?userId=u1")
        .await;

    assert_eq!(response.status_code(), 400);
    let data: Value = response.json();
    assert_eq!(data["code"], "BAD_REQUEST");
    assert!(data["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid path parameter"));
    assert_eq!(data["recoverable"], false);
}

#[tokio::test]
async fn test_delete_malformed_query_is_json_400() {
    let app = setup_test_app();
    let record = app.repository.seed("u1", "mine.png", minutes_ago(1));

    let response = app
        .server
        .delete(&format!("/api/files/{}?userId=u1&userId=u2", record.id))
        .await;

    assert_eq!(response.status_code(), 400);
    let data: Value = response.json();
    assert_eq!(data["code"], "BAD_REQUEST");
    assert!(data["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid query string"));
    assert!(app.repository.all()[0].deleted_at.is_none());
}

#[tokio::test]
async fn test_ready_reflects_database_state() {
    let app = setup_test_app();

    let ready = app.server.get("/ready").await;
    assert_eq!(ready.status_code(), 200);
    let data: Value = ready.json();
    assert_eq!(data["database"], "ready");
    assert_eq!(data["storage"], "ready");

    app.repository.fail_all();
    let not_ready = app.server.get("/ready").await;
    assert_eq!(not_ready.status_code(), 503);
    let data: Value = not_ready.json();
    assert_eq!(data["status"], "not_ready");
}

#[tokio::test]
async fn test_openapi_document_lists_file_routes() {
    let app = setup_test_app();

    let response = app.server.get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let data: Value = response.json();
    assert!(data["paths"].get("/api/files/presign").is_some());
    assert!(data["paths"].get("/api/files/user/{user_id}").is_some());
}
