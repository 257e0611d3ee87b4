// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email/password accounts via the Identity Toolkit REST API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::db::BackendError;
use crate::models::AuthenticatedUser;

const PRODUCTION_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Email/password authentication backend.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str)
        -> Result<AuthenticatedUser, BackendError>;

    async fn sign_up(&self, email: &str, password: &str)
        -> Result<AuthenticatedUser, BackendError>;

    /// Ask the provider to email a password-reset link.
    async fn send_password_reset(&self, email: &str) -> Result<(), BackendError>;
}

/// Identity Toolkit client.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl IdentityClient {
    /// Create a client; `emulator_host` points it at the Auth emulator.
    pub fn new(api_key: String, emulator_host: Option<&str>) -> Self {
        let base_url = match emulator_host {
            Some(host) => format!("http://{}/identitytoolkit.googleapis.com/v1", host),
            None => PRODUCTION_BASE_URL.to_string(),
        };

        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, BackendError> {
        let url = format!("{}/accounts:{}", self.base_url, method);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_identity_error(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::Malformed(format!("JSON parse error: {}", e)))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

impl AccountResponse {
    fn into_user(self, email: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            uid: self.local_id,
            email: self.email.unwrap_or_else(|| email.to_string()),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Map an Identity Toolkit error response to a backend error.
fn map_identity_error(status: u16, body: &str) -> BackendError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_default();
    // Messages look like "WEAK_PASSWORD : Password should be at least 6 characters".
    let code = message.split(" : ").next().unwrap_or_default().trim();

    match code {
        "INVALID_LOGIN_CREDENTIALS" | "EMAIL_NOT_FOUND" | "INVALID_PASSWORD"
        | "USER_DISABLED" | "INVALID_EMAIL" => BackendError::InvalidCredentials,
        "EMAIL_EXISTS" => BackendError::EmailInUse,
        "" if status >= 500 => BackendError::Unreachable(format!("HTTP {}", status)),
        "" => BackendError::Rejected(format!("HTTP {}: {}", status, body)),
        _ if status == 403 => BackendError::PermissionDenied(message),
        _ => BackendError::Rejected(message),
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, BackendError> {
        let account: AccountResponse = self
            .post(
                "signInWithPassword",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        Ok(account.into_user(email))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, BackendError> {
        let account: AccountResponse = self
            .post(
                "signUp",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        tracing::info!(uid = %account.local_id, "Created account");
        Ok(account.into_user(email))
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), BackendError> {
        let _: serde_json::Value = self
            .post(
                "sendOobCode",
                json!({ "requestType": "PASSWORD_RESET", "email": email }),
            )
            .await?;
        Ok(())
    }
}
