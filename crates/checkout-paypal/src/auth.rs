//! # OAuth2 Access Tokens
//!
//! Client-credentials tokens for the PayPal REST API. A token is fetched on
//! first use and reused until shortly before it expires.

use crate::config::PayPalConfig;
use chrono::{DateTime, Duration, Utc};
use checkout_core::{PaymentError, PaymentResult};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, error, instrument};

/// Tokens are refreshed this long before PayPal says they expire
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Cached access token
#[derive(Debug, Default)]
pub struct TokenCache {
    token: RwLock<Option<AccessToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a valid token, fetching a new one when the cache is empty or stale
    pub async fn access_token(&self, client: &Client, config: &PayPalConfig) -> PaymentResult<String> {
        {
            let cached = self.token.read().await;
            if let Some(token) = (*cached).as_ref().filter(|t| t.is_valid_at(Utc::now())) {
                return Ok(token.token.clone());
            }
        }

        let mut slot = self.token.write().await;
        // Another task may have refreshed it while we waited for the lock
        if let Some(token) = (*slot).as_ref().filter(|t| t.is_valid_at(Utc::now())) {
            return Ok(token.token.clone());
        }

        let fresh = fetch_token(client, config).await?;
        let token = fresh.token.clone();
        *slot = Some(fresh);
        Ok(token)
    }

    /// Drop the cached token (after PayPal rejected it)
    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }

    pub async fn cached(&self) -> Option<AccessToken> {
        self.token.read().await.clone()
    }
}

#[instrument(skip(client, config), fields(mode = %config.mode))]
async fn fetch_token(client: &Client, config: &PayPalConfig) -> PaymentResult<AccessToken> {
    let url = format!("{}/v1/oauth2/token", config.api_base_url());

    let response = client
        .post(&url)
        .basic_auth(&config.client_id, Some(&config.client_secret))
        .header("Accept", "application/json")
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

    if !status.is_success() {
        error!("PayPal token request failed: status={}", status);
        let message = match serde_json::from_str::<OAuthErrorResponse>(&body) {
            Ok(err) => err.error_description.unwrap_or(err.error),
            Err(_) => format!("HTTP {}", status),
        };
        return Err(PaymentError::Authentication(message));
    }

    let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
        PaymentError::Serialization(format!("Failed to parse PayPal token response: {}", e))
    })?;

    let lifetime = (parsed.expires_in - EXPIRY_MARGIN_SECS).max(0);
    debug!("Fetched PayPal access token, valid for {}s", lifetime);

    Ok(AccessToken {
        token: parsed.access_token,
        expires_at: Utc::now() + Duration::seconds(lifetime),
    })
}
