// Token refresh logic

use anyhow::{Context, Result};
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::store::CredentialStore;
use super::types::{RefreshRequest, RefreshResponse, SessionUpdate, REFRESH_PATH};

/// Outcome of the most recent token exchange
struct ExchangeRecord {
    generation: u64,
    outcome: Option<String>,
}

/// Why a refresh was requested
enum Trigger<'a> {
    /// Periodic refresh, always exchanges unless one is in flight
    Background,
    /// A request was rejected while carrying this token
    Rejected(Option<&'a str>),
}

/// Exchanges the stored refresh token for a new access token
///
/// Concurrent callers are coalesced: while an exchange is in flight, every
/// other caller waits for it and receives its outcome instead of starting a
/// second one. Failures never clear the session; that decision belongs to
/// the session manager.
pub struct TokenRefresher {
    /// HTTP client for refresh requests
    client: Client,

    /// Full URL of the refresh endpoint
    refresh_url: String,

    /// Session storage
    store: Arc<dyn CredentialStore>,

    /// Held for the duration of an exchange
    exchange: Mutex<ExchangeRecord>,

    /// Mirror of `ExchangeRecord::generation`, readable without the lock
    generation: AtomicU64,
}

impl TokenRefresher {
    pub fn new(client: Client, base_url: &str, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            client,
            refresh_url: format!("{}{}", base_url.trim_end_matches('/'), REFRESH_PATH),
            store,
            exchange: Mutex::new(ExchangeRecord {
                generation: 0,
                outcome: None,
            }),
            generation: AtomicU64::new(0),
        }
    }

    /// Refresh the access token, joining an exchange already in flight
    pub async fn refresh(&self) -> Option<String> {
        self.coalesced(Trigger::Background).await
    }

    /// Refresh after a request carrying `rejected` came back 401
    ///
    /// If another request already replaced that token, the replacement is
    /// returned without a network call.
    pub async fn refresh_after(&self, rejected: Option<&str>) -> Option<String> {
        self.coalesced(Trigger::Rejected(rejected)).await
    }

    /// Number of refresh attempts completed so far, including those that
    /// ended without a network call because no refresh token was stored
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    async fn coalesced(&self, trigger: Trigger<'_>) -> Option<String> {
        let seen = self.generation.load(Ordering::Acquire);
        let mut record = self.exchange.lock().await;

        if record.generation != seen {
            tracing::debug!("Joined token refresh completed while waiting");
            return record.outcome.clone();
        }

        if let Trigger::Rejected(rejected) = trigger {
            if let Some(current) = self.store.get().access_token {
                if Some(current.as_str()) != rejected {
                    tracing::debug!("Access token already replaced by another request");
                    return Some(current);
                }
            }
        }

        let outcome = self.exchange_token().await;

        record.generation += 1;
        record.outcome = outcome.clone();
        self.generation.store(record.generation, Ordering::Release);

        outcome
    }

    async fn exchange_token(&self) -> Option<String> {
        let Some(refresh_token) = self.store.get().refresh_token else {
            tracing::debug!("No refresh token stored, skipping token refresh");
            return None;
        };

        tracing::debug!("Refreshing access token...");

        let data = match self.request_new_token(&refresh_token).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Token refresh failed: {:#}", e);
                return None;
            }
        };

        // A logout during the exchange removed the refresh token; do not
        // resurrect the session with the new access token.
        if self.store.get().refresh_token.as_deref() != Some(refresh_token.as_str()) {
            tracing::warn!("Session changed during token refresh, discarding new token");
            return None;
        }

        let update = SessionUpdate {
            access_token: Some(data.access.clone()),
            refresh_token: data.refresh,
            user: None,
        };
        if let Err(e) = self.store.set(update) {
            tracing::error!("Failed to store refreshed token: {}", e);
            return None;
        }

        tracing::info!("Access token refreshed");
        Some(data.access)
    }

    async fn request_new_token(&self, refresh_token: &str) -> Result<RefreshResponse> {
        let response = self
            .client
            .post(&self.refresh_url)
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await
            .context("Failed to send token refresh request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Token refresh rejected: {} - {}", status, error_text);
        }

        let data: RefreshResponse = response
            .json()
            .await
            .context("Failed to parse token refresh response")?;

        if data.access.is_empty() {
            anyhow::bail!("Token refresh response does not contain an access token");
        }

        Ok(data)
    }
}
