use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region, SharedCredentialsProvider};
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use std::time::Duration;

/// Static access key pair, used instead of the ambient AWS credential chain.
#[derive(Clone, Debug)]
pub struct S3Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// `endpoint_url` points at an S3-compatible provider (e.g.
    /// "http://localhost:9000" for MinIO) and switches to path-style
    /// addressing. Without `credentials` the default AWS chain is loaded
    /// (environment, profile, instance metadata).
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        credentials: Option<S3Credentials>,
    ) -> StorageResult<Self> {
        if bucket.trim().is_empty() {
            return Err(StorageError::ConfigError("bucket name is empty".to_string()));
        }

        let mut builder = match credentials {
            Some(credentials) => aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .credentials_provider(SharedCredentialsProvider::new(Credentials::new(
                    credentials.access_key_id,
                    credentials.secret_access_key,
                    None, // session token
                    None, // expiry
                    "conlearn-config",
                ))),
            None => {
                let shared = aws_config::defaults(BehaviorVersion::latest()).load().await;
                aws_sdk_s3::config::Builder::from(&shared)
            }
        };

        builder = builder.region(Region::new(region.clone()));
        if let Some(ref endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(S3Storage {
            client: Client::from_conf(builder.build()),
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Public URL for an object.
    ///
    /// AWS: `https://{bucket}.s3.{region}.amazonaws.com/{key}`.
    /// Custom endpoints use path style: `{endpoint}/{bucket}/{key}`.
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let presigning_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;

        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .content_type(content_type)
            .presigned(presigning_config)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    "Failed to sign S3 PUT URL"
                );
                StorageError::SigningFailed(e.to_string())
            })?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            expires_in_secs = expires_in.as_secs(),
            "Signed S3 PUT URL"
        );

        Ok(presigned.uri().to_string())
    }

    fn public_url(&self, storage_key: &str) -> String {
        self.generate_url(storage_key)
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => match &e {
                SdkError::ServiceError(service_err) => match service_err.err() {
                    HeadObjectError::NotFound(_) => Ok(false),
                    _ => Err(StorageError::BackendError(e.to_string())),
                },
                _ => Err(StorageError::BackendError(e.to_string())),
            },
        }
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage(endpoint: Option<&str>) -> S3Storage {
        S3Storage::new(
            "conlearn-media".to_string(),
            "eu-west-1".to_string(),
            endpoint.map(String::from),
            Some(S3Credentials {
                access_key_id: "AKIDEXAMPLE".to_string(),
                secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            }),
        )
        .await
        .unwrap()
    }

    fn signed_headers(url: &str) -> String {
        url.split(['?', '&'])
            .find_map(|pair| pair.strip_prefix("X-Amz-SignedHeaders="))
            .unwrap_or_default()
            .replace("%3B", ";")
            .replace("%3b", ";")
    }

    #[tokio::test]
    async fn public_url_uses_virtual_hosted_aws_form() {
        let s3 = storage(None).await;
        assert_eq!(
            s3.public_url("u1/uploads/a.png"),
            "https://conlearn-media.s3.eu-west-1.amazonaws.com/u1/uploads/a.png"
        );
    }

    #[tokio::test]
    async fn public_url_uses_path_style_for_custom_endpoint() {
        let s3 = storage(Some("http://localhost:9000/")).await;
        assert_eq!(
            s3.public_url("u1/uploads/a.png"),
            "http://localhost:9000/conlearn-media/u1/uploads/a.png"
        );
    }

    #[tokio::test]
    async fn empty_bucket_is_a_config_error() {
        let result = S3Storage::new(" ".to_string(), "eu-west-1".to_string(), None, None).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }

    #[tokio::test]
    async fn signed_put_url_carries_key_and_expiry() {
        let s3 = storage(None).await;
        let url = s3
            .presigned_put_url("u1/uploads/a.png", "image/png", Duration::from_secs(300))
            .await
            .unwrap();
        assert!(url.contains("u1/uploads/a.png"));
        assert!(url.contains("X-Amz-Expires=300"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn signed_put_url_binds_content_type() {
        let s3 = storage(None).await;
        let url = s3
            .presigned_put_url("u1/uploads/a.png", "image/png", Duration::from_secs(300))
            .await
            .unwrap();

        let headers = signed_headers(&url);
        assert!(
            headers.split(';').any(|h| h == "content-type"),
            "signed headers were {:?}",
            headers
        );
    }
}
