use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiErrorBody, Error};
use crate::middleware::{BoxFuture, Middleware, execute_middleware_chain};
use crate::requester::{Context, QueryParams, Requester};

/// Shared inner state for the client.
pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) config: ClientConfig,
    pub(crate) middlewares: Vec<Box<dyn Middleware>>,
}

/// The Pinterest API client.
///
/// Holds an `Arc<ClientInner>` for cheap cloning. Models and collections
/// keep a clone so they can issue follow-up requests.
#[derive(Clone)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.config.base_url)
            .field("middlewares", &self.inner.middlewares.len())
            .finish()
    }
}

impl Client {
    /// Create a new client with default configuration from environment variables.
    ///
    /// Reads `PINTEREST_ACCESS_TOKEN` and `PINTEREST_BASE_URL` from the environment.
    pub fn new() -> Result<Self, Error> {
        ClientBuilder::new().build()
    }

    /// Create a new `ClientBuilder` for customizing client configuration.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// This client as a shared requester handle.
    pub fn context(&self) -> Context {
        Arc::new(self.clone())
    }

    /// Access the Ad Accounts service.
    pub fn ad_accounts(&self) -> crate::ad_accounts::AdAccountService {
        crate::ad_accounts::AdAccountService::new(self.context())
    }

    /// Execute a GET request and decode the JSON body.
    ///
    /// Runs the middleware chain and turns any non-2xx response into
    /// [`Error::Api`]. An empty body decodes as `null`.
    pub(crate) async fn execute_get(&self, path: &str, query: &QueryParams) -> Result<Value, Error> {
        let inner = &self.inner;
        let url = inner.config.url_for(path);

        let req = inner
            .http
            .get(&url)
            .headers(inner.config.build_headers())
            .query(query)
            .build()
            .map_err(Error::Http)?;

        debug!(method = "GET", url = %url, params = query.len(), "executing request");

        let response = if inner.middlewares.is_empty() {
            inner.http.execute(req).await.map_err(Error::Http)?
        } else {
            let http = &inner.http;
            execute_middleware_chain(
                &inner.middlewares,
                req,
                move |r| -> BoxFuture<'_, Result<reqwest::Response, Error>> {
                    Box::pin(async move { http.execute(r).await.map_err(Error::Http) })
                },
            )
            .await?
        };

        let status = response.status();
        let bytes = response.bytes().await.map_err(Error::Http)?;

        if !status.is_success() {
            let body = ApiErrorBody::from_bytes(&bytes);
            warn!(status = status.as_u16(), url = %url, error = %body, "request failed");
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl Requester for Client {
    fn get<'a>(
        &'a self,
        path: &'a str,
        query: &'a QueryParams,
    ) -> BoxFuture<'a, Result<Value, Error>> {
        Box::pin(self.execute_get(path, query))
    }
}

/// Builder for constructing a `Client` with custom configuration.
pub struct ClientBuilder {
    config: ClientConfig,
    http_client: Option<reqwest::Client>,
    middlewares: Vec<Box<dyn Middleware>>,
    proxy_url: Option<String>,
    accept_invalid_certs: bool,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::from_env(),
            http_client: None,
            middlewares: Vec::new(),
            proxy_url: None,
            accept_invalid_certs: false,
        }
    }

    /// Set the OAuth access token sent as `Authorization: Bearer`.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config.access_token = token.into();
        self
    }

    /// Set the base URL (without the `/v5` version segment).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set a custom reqwest HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set the User-Agent string.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Add a default header. Invalid names or values are ignored.
    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.parse::<reqwest::header::HeaderName>(),
            value.parse::<reqwest::header::HeaderValue>(),
        ) {
            self.config.default_headers.insert(name, value);
        }
        self
    }

    /// Add a middleware to the chain.
    pub fn middleware(mut self, m: impl Middleware + 'static) -> Self {
        self.middlewares.push(Box::new(m));
        self
    }

    /// Route all requests through the given proxy URL.
    ///
    /// Ignored if a custom `http_client` is provided.
    pub fn proxy_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = Some(url.into());
        self
    }

    /// Disable TLS certificate verification.
    ///
    /// **Use only in test environments.** Ignored if a custom `http_client`
    /// is provided.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Build the `Client`.
    pub fn build(self) -> Result<Client, Error> {
        let http = match self.http_client {
            Some(http) => http,
            None => {
                let mut builder = reqwest::Client::builder().timeout(self.config.timeout);

                if let Some(ref proxy_url) = self.proxy_url {
                    let proxy = reqwest::Proxy::all(proxy_url)
                        .map_err(|e| Error::Config(format!("invalid proxy URL: {e}")))?;
                    builder = builder.proxy(proxy);
                }
                if self.accept_invalid_certs {
                    builder = builder.danger_accept_invalid_certs(true);
                }

                builder
                    .build()
                    .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?
            }
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                http,
                config: self.config,
                middlewares: self.middlewares,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
