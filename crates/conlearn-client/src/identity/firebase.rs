//! Email/password accounts through the Firebase Identity Toolkit REST API.

use super::{AuthError, Identity, IdentityProvider, IdentityState, Listener, Subscription};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Map an Identity Toolkit error message such as
/// `WEAK_PASSWORD : Password should be at least 6 characters` to an [`AuthError`].
pub fn map_error_code(message: &str) -> AuthError {
    let code = message
        .split(|c: char| c == ':' || c.is_whitespace())
        .next()
        .unwrap_or_default();

    match code {
        "EMAIL_EXISTS" => AuthError::EmailAlreadyRegistered,
        "EMAIL_NOT_FOUND"
        | "INVALID_PASSWORD"
        | "INVALID_LOGIN_CREDENTIALS"
        | "MISSING_PASSWORD"
        | "USER_DISABLED" => AuthError::InvalidCredentials,
        "WEAK_PASSWORD" => AuthError::WeakPassword,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::MalformedEmail,
        _ => AuthError::Other(message.to_string()),
    }
}

fn check_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::MalformedEmail);
    }
    if password.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(())
}

#[derive(Clone)]
pub struct FirebaseAuth {
    client: Client,
    base_url: String,
    api_key: String,
    state: IdentityState,
}

impl FirebaseAuth {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AuthError::Other(format!("Failed to create HTTP client: {}", e)))?;
        let base_url: String = base_url.into();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            state: IdentityState::new(),
        })
    }

    /// FIREBASE_API_KEY (required) and FIREBASE_AUTH_URL.
    pub fn from_env() -> Result<Self, AuthError> {
        let api_key = std::env::var("FIREBASE_API_KEY")
            .map_err(|_| AuthError::Other("Missing FIREBASE_API_KEY".to_string()))?;
        let base_url =
            std::env::var("FIREBASE_AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string());
        Self::new(api_key, base_url)
    }

    pub fn state(&self) -> &IdentityState {
        &self.state
    }

    async fn authenticate(
        &self,
        action: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        check_credentials(email, password)?;

        let url = format!("{}/v1/accounts:{}", self.base_url, action);
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&CredentialsRequest {
                email: email.trim(),
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| AuthError::Other(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let error = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| map_error_code(&envelope.error.message))
                .unwrap_or_else(|_| {
                    AuthError::Other(format!("Authentication failed with status {}", status))
                });
            tracing::warn!(action = %action, status = status.as_u16(), error = %error, "Authentication rejected");
            return Err(error);
        }

        let body: AuthResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Other(format!("Unexpected authentication response: {}", e)))?;

        let identity = Identity {
            user_id: body.local_id,
            email: body.email.unwrap_or_else(|| email.trim().to_string()),
            id_token: body.id_token,
        };
        tracing::info!(user_id = %identity.user_id, "Signed in");
        self.state.set(Some(identity.clone()));
        Ok(identity)
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.authenticate("signUp", email, password).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.authenticate("signInWithPassword", email, password)
            .await
    }

    async fn logout(&self) -> Result<(), AuthError> {
        // ID tokens are stateless, so signing out is purely local
        self.state.set(None);
        Ok(())
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.state.subscribe(listener)
    }

    fn current(&self) -> Option<Identity> {
        self.state.current()
    }
}
