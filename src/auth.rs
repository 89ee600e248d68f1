use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{Error, Result};

const IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";

/// Tokens are refreshed this long before they actually expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct RefreshTokenResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Debug, Clone)]
struct CachedToken {
    id_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn new(id_token: String, expires_in: &str) -> Self {
        let secs: i64 = expires_in.parse().unwrap_or(3600);
        Self {
            id_token,
            expires_at: Utc::now() + Duration::seconds(secs),
        }
    }

    fn is_fresh(&self) -> bool {
        self.expires_at > Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS)
    }
}

/// Firebase identity for one signed-in user.
///
/// Every failure is reported as [`Error::NotAuthenticated`]: without a valid
/// token there is no user context to score.
#[derive(Clone)]
pub struct FirebaseAuth {
    client: Client,
    api_key: String,
    refresh_token: Arc<Mutex<String>>,
    cached_token: Arc<Mutex<Option<CachedToken>>>,
}

impl FirebaseAuth {
    pub fn new(api_key: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            refresh_token: Arc::new(Mutex::new(refresh_token.into())),
            cached_token: Arc::new(Mutex::new(None)),
        }
    }

    /// Sign in with email and password.
    pub async fn sign_in_with_email(
        api_key: impl Into<String>,
        email: &str,
        password: &str,
    ) -> Result<Self> {
        let api_key = api_key.into();
        let client = Client::new();
        let url = format!("{}/accounts:signInWithPassword?key={}", IDENTITY_URL, api_key);

        let resp = client
            .post(&url)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "returnSecureToken": true
            }))
            .send()
            .await
            .map_err(|e| Error::NotAuthenticated(format!("sign-in request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::NotAuthenticated(format!(
                "sign-in failed: {} - {}",
                status, body
            )));
        }

        let sign_in: SignInResponse = resp
            .json()
            .await
            .map_err(|e| Error::NotAuthenticated(format!("bad sign-in response: {}", e)))?;

        tracing::debug!("Signed in with email and password");

        Ok(Self {
            client,
            api_key,
            refresh_token: Arc::new(Mutex::new(sign_in.refresh_token)),
            cached_token: Arc::new(Mutex::new(Some(CachedToken::new(
                sign_in.id_token,
                &sign_in.expires_in,
            )))),
        })
    }

    pub async fn get_id_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.lock().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
                return Ok(token.id_token.clone());
            }
        }

        self.refresh_id_token().await
    }

    async fn refresh_id_token(&self) -> Result<String> {
        let refresh_token = self.refresh_token.lock().await.clone();
        let url = format!("{}?key={}", SECURE_TOKEN_URL, self.api_key);

        let resp = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::NotAuthenticated(format!("token refresh request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::NotAuthenticated(format!(
                "token refresh failed: {} - {}",
                status, body
            )));
        }

        let token_resp: RefreshTokenResponse = resp
            .json()
            .await
            .map_err(|e| Error::NotAuthenticated(format!("bad token response: {}", e)))?;

        *self.refresh_token.lock().await = token_resp.refresh_token;

        let cached = CachedToken::new(token_resp.id_token, &token_resp.expires_in);
        let id_token = cached.id_token.clone();
        *self.cached_token.lock().await = Some(cached);

        tracing::debug!("Refreshed Firebase ID token");
        Ok(id_token)
    }

    /// The signed-in user's id, read from the ID token claims.
    pub async fn get_user_id(&self) -> Result<String> {
        let token = self.get_id_token().await?;
        user_id_from_jwt(&token)
    }
}

/// Extract `user_id` (or `sub`) from an unverified JWT payload.
pub fn user_id_from_jwt(token: &str) -> Result<String> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(Error::NotAuthenticated("invalid JWT format".to_string()));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| Error::NotAuthenticated(format!("invalid JWT payload: {}", e)))?;
    let claims: serde_json::Value = serde_json::from_slice(&payload)
        .map_err(|e| Error::NotAuthenticated(format!("invalid JWT claims: {}", e)))?;

    claims["user_id"]
        .as_str()
        .or_else(|| claims["sub"].as_str())
        .filter(|uid| !uid.is_empty())
        .map(String::from)
        .ok_or_else(|| Error::NotAuthenticated("no user_id or sub claim in token".to_string()))
}
