//! OAuth access tokens for the Admin API.
//!
//! [`TokenRefresher::start`] fetches the first token before returning, then a
//! background task renews it ahead of expiry. Readers go through a
//! [`SharedToken`] and never wait on a refresh in flight.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use orderscan_scan::SourceError;

use super::models::{TokenRequest, TokenResponse};
use super::response::{decode, transport};

const TOKEN_PATH: &str = "/api/oauth/token";

/// Source of the bearer token attached to every API call.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> String;
}

/// Fixed token, e.g. an integration key issued out of band.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> String {
        self.0.clone()
    }
}

impl core::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

/// Current token, replaced in place by the refresher.
#[derive(Clone, Default)]
pub struct SharedToken {
    inner: Arc<RwLock<String>>,
}

impl SharedToken {
    fn set(&self, token: String) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = token;
    }
}

impl TokenProvider for SharedToken {
    fn token(&self) -> String {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl core::fmt::Debug for SharedToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SharedToken(<redacted>)")
    }
}

/// Integration credentials for the `client_credentials` grant.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Exponential backoff with random jitter for failed refreshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Fraction (0.0-1.0) of each delay that is randomized.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            jitter: 0.2,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry `attempt` (1-indexed), without jitter.
    pub fn base_delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exp = 2_f64.powi(attempt.saturating_sub(1).min(30) as i32);
        let delay = self.base_delay.as_secs_f64() * exp;
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }

    /// Delay before retry `attempt`, shortened by up to `jitter` of itself.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = self.base_delay_for(attempt);
        let jitter = unit_fraction(self.jitter, 0.0);
        if jitter == 0.0 || delay.is_zero() {
            return delay;
        }
        let factor = 1.0 - rand::rng().random_range(0.0..jitter);
        delay.mul_f64(factor)
    }
}

const DEFAULT_REFRESH_RATIO: f64 = 0.9;

/// `value` clamped to `0.0..=1.0`, or `fallback` when it is NaN or infinite.
fn unit_fraction(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

#[derive(Debug, Clone)]
pub struct TokenRefreshConfig {
    /// Fraction of the granted lifetime after which the token is renewed.
    pub refresh_ratio: f64,
    /// Lower bound between two successful refreshes.
    pub min_interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for TokenRefreshConfig {
    fn default() -> Self {
        Self {
            refresh_ratio: DEFAULT_REFRESH_RATIO,
            min_interval: Duration::from_secs(1),
            retry: RetryPolicy::default(),
        }
    }
}

impl TokenRefreshConfig {
    /// How long a token granted for `expires_in` seconds is used before renewal.
    pub fn refresh_after(&self, expires_in: u64) -> Duration {
        let ratio = unit_fraction(self.refresh_ratio, DEFAULT_REFRESH_RATIO);
        Duration::from_secs(expires_in)
            .mul_f64(ratio)
            .max(self.min_interval)
    }
}

/// Requests tokens from the backend.
#[derive(Clone)]
struct TokenFetcher {
    http: reqwest::Client,
    url: String,
    credentials: Credentials,
}

impl TokenFetcher {
    async fn fetch(&self) -> Result<TokenResponse, SourceError> {
        let body = TokenRequest {
            client_id: &self.credentials.client_id,
            client_secret: &self.credentials.client_secret,
            grant_type: "client_credentials",
        };
        let resp = self
            .http
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        decode(resp).await
    }
}

/// Owns the background refresh task.
///
/// Dropping the refresher stops the task; [`TokenRefresher::shutdown`] also
/// waits for it to finish.
#[derive(Debug)]
pub struct TokenRefresher {
    token: SharedToken,
    cancel: CancellationToken,
    join: Option<JoinHandle<()>>,
}

impl TokenRefresher {
    /// Fetch the first token and spawn the refresh loop.
    ///
    /// Fails when the first token cannot be obtained.
    pub async fn start(
        http: reqwest::Client,
        base_url: &str,
        credentials: Credentials,
        config: TokenRefreshConfig,
    ) -> Result<Self, SourceError> {
        let fetcher = TokenFetcher {
            http,
            url: format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH),
            credentials,
        };

        let first = fetcher
            .fetch()
            .await
            .map_err(|e| SourceError::Token(format!("initial token request failed: {e}")))?;

        let token = SharedToken::default();
        token.set(first.access_token);
        let wait = config.refresh_after(first.expires_in);
        info!(
            expires_in = first.expires_in,
            refresh_in_secs = wait.as_secs(),
            "access token obtained"
        );

        let cancel = CancellationToken::new();
        let join = tokio::spawn(refresh_loop(
            fetcher,
            token.clone(),
            config,
            wait,
            cancel.clone(),
        ));

        Ok(Self {
            token,
            cancel,
            join: Some(join),
        })
    }

    /// Handle that always yields the latest token.
    pub fn token(&self) -> SharedToken {
        self.token.clone()
    }

    /// Stop refreshing and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

impl Drop for TokenRefresher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn refresh_loop(
    fetcher: TokenFetcher,
    token: SharedToken,
    config: TokenRefreshConfig,
    mut wait: Duration,
    cancel: CancellationToken,
) {
    let mut attempt = 0u32;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(wait) => {}
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            res = fetcher.fetch() => res,
        };

        match result {
            Ok(grant) => {
                token.set(grant.access_token);
                attempt = 0;
                wait = config.refresh_after(grant.expires_in);
                debug!(refresh_in_secs = wait.as_secs(), "access token refreshed");
            }
            Err(err) => {
                attempt = attempt.saturating_add(1);
                wait = config.retry.delay_for(attempt);
                warn!(
                    error = %err,
                    attempt,
                    retry_in_ms = wait.as_millis() as u64,
                    "access token refresh failed"
                );
            }
        }
    }

    debug!("token refresher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_happens_at_ninety_percent_of_lifetime() {
        let cfg = TokenRefreshConfig::default();
        assert_eq!(cfg.refresh_after(600), Duration::from_secs(540));
        assert_eq!(cfg.refresh_after(0), Duration::from_secs(1));
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_delay_for(0), Duration::ZERO);
        assert_eq!(policy.base_delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.base_delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.base_delay_for(4), Duration::from_secs(8));
        assert_eq!(policy.base_delay_for(7), Duration::from_secs(60));
        assert_eq!(policy.base_delay_for(u32::MAX), Duration::from_secs(60));
    }

    #[test]
    fn jitter_only_shortens_the_delay() {
        let policy = RetryPolicy::default();
        for attempt in 1..10 {
            let base = policy.base_delay_for(attempt);
            let jittered = policy.delay_for(attempt);
            assert!(jittered <= base);
            assert!(jittered >= base.mul_f64(0.8));
        }
    }

    #[test]
    fn non_finite_fractions_fall_back() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let policy = RetryPolicy {
                jitter: bad,
                ..RetryPolicy::default()
            };
            assert_eq!(policy.delay_for(3), policy.base_delay_for(3));

            let cfg = TokenRefreshConfig {
                refresh_ratio: bad,
                ..TokenRefreshConfig::default()
            };
            assert_eq!(cfg.refresh_after(600), Duration::from_secs(540));
        }
    }

    #[test]
    fn shared_token_clones_see_updates() {
        let token = SharedToken::default();
        let reader = token.clone();
        token.set("abc".to_string());
        assert_eq!(reader.token(), "abc");
    }

    #[test]
    fn secrets_are_not_debug_printed() {
        let creds = Credentials::new("id", "hunter2");
        assert!(!format!("{creds:?}").contains("hunter2"));
        assert!(!format!("{:?}", StaticToken::new("abc123")).contains("abc123"));
    }
}
