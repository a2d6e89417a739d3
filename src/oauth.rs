use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::client::{Client, ClientBuilder};
use crate::config::{API_VERSION, DEFAULT_BASE_URL};
use crate::error::Error;
use crate::middleware::{BoxFuture, Middleware, Next};

const EXPIRY_BUFFER_MS: u64 = 300_000; // 5 minutes
/// Assumed lifetime when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 30 * 24 * 60 * 60;

/// OAuth tokens for authenticating with the Pinterest API.
#[derive(Debug, Clone)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: u64, // unix milliseconds
}

/// Callback invoked after a successful token refresh.
pub type OnRefreshFn = Box<dyn Fn(&OAuthTokens) + Send + Sync>;

/// Configuration for OAuth-based authentication with automatic refresh.
pub struct OAuthConfig {
    pub tokens: OAuthTokens,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_endpoint: String,
    pub on_refresh: Option<OnRefreshFn>,
}

impl OAuthConfig {
    /// Create a new `OAuthConfig` for the app identified by `client_id` and
    /// `client_secret`. Refreshes go to the public token endpoint unless
    /// overridden with [`OAuthConfig::refresh_endpoint`].
    pub fn new(
        tokens: OAuthTokens,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tokens,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_endpoint: format!("{DEFAULT_BASE_URL}/{API_VERSION}/oauth/token"),
            on_refresh: None,
        }
    }

    /// Override the token endpoint.
    pub fn refresh_endpoint(mut self, url: impl Into<String>) -> Self {
        self.refresh_endpoint = url.into();
        self
    }

    /// Set a callback to be invoked after each successful token refresh.
    pub fn on_refresh(mut self, f: impl Fn(&OAuthTokens) + Send + Sync + 'static) -> Self {
        self.on_refresh = Some(Box::new(f));
        self
    }

    /// Build a `ClientBuilder` configured with OAuth middleware.
    pub fn into_client_builder(self) -> ClientBuilder {
        let token_manager = Arc::new(OAuthTokenManager {
            state: RwLock::new(OAuthTokenState {
                access_token: self.tokens.access_token,
                refresh_token: self.tokens.refresh_token,
                expires_at: self.tokens.expires_at,
            }),
            client_id: self.client_id,
            client_secret: self.client_secret,
            refresh_endpoint: self.refresh_endpoint,
            http_client: reqwest::Client::new(),
            on_refresh: self.on_refresh,
        });

        ClientBuilder::new()
            .access_token("")
            .middleware(OAuthMiddleware { token_manager })
    }

    /// Build a `Client` configured with OAuth middleware.
    pub fn into_client(self) -> Result<Client, Error> {
        self.into_client_builder().build()
    }
}

// ── Internal token state ──────────────────────────────────────────────────────

struct OAuthTokenState {
    access_token: String,
    refresh_token: String,
    expires_at: u64,
}

struct OAuthTokenManager {
    state: RwLock<OAuthTokenState>,
    client_id: String,
    client_secret: String,
    refresh_endpoint: String,
    http_client: reqwest::Client,
    on_refresh: Option<OnRefreshFn>,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct TokenRefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    /// Only present when the app uses continuous refresh.
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Absolute expiry in unix milliseconds for a token issued at `now`.
fn expiry_from(now: u64, expires_in: Option<u64>) -> u64 {
    let secs = expires_in
        .filter(|&s| s > 0)
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    now.saturating_add(secs.saturating_mul(1000))
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl OAuthTokenManager {
    async fn get_token(&self) -> Result<String, Error> {
        // Fast path: read lock
        {
            let state = self.state.read().await;
            if now_ms() < state.expires_at.saturating_sub(EXPIRY_BUFFER_MS) {
                return Ok(state.access_token.clone());
            }
        }

        // Slow path: write lock with double-check
        let mut state = self.state.write().await;
        if now_ms() < state.expires_at.saturating_sub(EXPIRY_BUFFER_MS) {
            return Ok(state.access_token.clone());
        }

        debug!(endpoint = %self.refresh_endpoint, "refreshing access token");

        let body = RefreshRequest {
            grant_type: "refresh_token",
            refresh_token: &state.refresh_token,
        };

        let response = self
            .http_client
            .post(&self.refresh_endpoint)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&body)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();

        if !status.is_success() {
            let code = status.as_u16();
            warn!(status = code, "token refresh failed");
            return if code == 400 || code == 401 {
                Err(Error::OAuth(
                    "refresh token invalid or revoked".to_string(),
                ))
            } else {
                Err(Error::OAuth(format!(
                    "token refresh failed with status {code}"
                )))
            };
        }

        let parsed: TokenRefreshResponse = response
            .json()
            .await
            .map_err(|_| Error::OAuth("invalid refresh response".to_string()))?;

        state.access_token = parsed.access_token;
        if let Some(refresh_token) = parsed.refresh_token {
            state.refresh_token = refresh_token;
        }
        state.expires_at = expiry_from(now_ms(), parsed.expires_in);

        if let Some(ref cb) = self.on_refresh {
            cb(&OAuthTokens {
                access_token: state.access_token.clone(),
                refresh_token: state.refresh_token.clone(),
                expires_at: state.expires_at,
            });
        }

        Ok(state.access_token.clone())
    }

    async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.expires_at = 0;
    }
}

// ── Middleware ────────────────────────────────────────────────────────────────

struct OAuthMiddleware {
    token_manager: Arc<OAuthTokenManager>,
}

fn apply_bearer(mut request: reqwest::Request, token: &str) -> Result<reqwest::Request, Error> {
    let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| Error::OAuth("invalid token value for Authorization header".to_string()))?;
    request
        .headers_mut()
        .insert(reqwest::header::AUTHORIZATION, bearer);
    Ok(request)
}

impl Middleware for OAuthMiddleware {
    fn handle<'a>(
        &'a self,
        request: reqwest::Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<reqwest::Response, Error>> {
        Box::pin(async move {
            let token = self.token_manager.get_token().await?;

            // GET requests carry no body, so a clone is always possible
            let replay = request.try_clone();

            let response = next.run(apply_bearer(request, &token)?).await?;

            match replay {
                Some(replay) if response.status().as_u16() == 401 => {
                    warn!(url = %replay.url(), "access token rejected, refreshing");
                    self.token_manager.invalidate().await;
                    let new_token = self.token_manager.get_token().await?;
                    next.run(apply_bearer(replay, &new_token)?).await
                }
                _ => Ok(response),
            }
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
