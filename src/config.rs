use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.pinterest.com";
pub(crate) const API_VERSION: &str = "v5";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_USER_AGENT: &str = "uno-pinterest/Rust 0.1.0";

/// Configuration for the Pinterest API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub access_token: String,
    pub base_url: String,
    pub timeout: Duration,
    pub default_headers: HeaderMap,
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new ClientConfig from environment variables and defaults.
    ///
    /// Reads `PINTEREST_ACCESS_TOKEN` and `PINTEREST_BASE_URL` from the environment.
    /// Falls back to the default base URL if `PINTEREST_BASE_URL` is not set.
    pub fn from_env() -> Self {
        let access_token = std::env::var("PINTEREST_ACCESS_TOKEN").unwrap_or_default();
        let base_url =
            std::env::var("PINTEREST_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Self {
            access_token,
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers: HeaderMap::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Full URL for an API path, e.g. `ad_accounts/` -> `{base}/v5/ad_accounts/`.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            API_VERSION,
            path.trim_start_matches('/')
        )
    }

    /// Build the full set of default headers for requests.
    pub fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );
        if let Ok(val) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(reqwest::header::USER_AGENT, val);
        }

        if !self.access_token.is_empty()
            && let Ok(val) = HeaderValue::from_str(&format!("Bearer {}", self.access_token))
        {
            headers.insert(reqwest::header::AUTHORIZATION, val);
        }

        // User-provided default headers override built-in ones
        for (key, value) in &self.default_headers {
            headers.insert(key, value.clone());
        }

        headers
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
