use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::Error;
use crate::middleware::BoxFuture;

/// Query parameters forwarded verbatim to the API.
///
/// Keys are kept sorted so that the encoded query string is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, replacing any previous value for `key`.
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Display) {
        self.0.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

/// Anything that can issue an authenticated GET against the API and hand
/// back the decoded JSON body.
///
/// [`Client`](crate::Client) is the production implementation. A non-2xx
/// response must come back as [`Error::Api`]; callers never see status codes
/// any other way.
pub trait Requester: Send + Sync {
    fn get<'a>(&'a self, path: &'a str, query: &'a QueryParams)
    -> BoxFuture<'a, Result<Value, Error>>;
}

/// Shared handle to the requester, carried by models and collections so
/// they can issue follow-up requests.
pub type Context = Arc<dyn Requester>;
