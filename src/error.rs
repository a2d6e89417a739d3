use serde::Deserialize;

/// Errors returned by the Pinterest SDK.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: ApiErrorBody },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// `fetch_next` was called on a collection without a bookmark.
    #[error("No more pages: the collection has no bookmark")]
    NoMorePages,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// The error body returned by the Pinterest API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}

impl ApiErrorBody {
    /// Parse an error body, falling back to the raw text when it is not
    /// the documented `{"code": .., "message": ..}` shape.
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        serde_json::from_slice::<ApiErrorBody>(bytes).unwrap_or_else(|_| ApiErrorBody {
            code: None,
            message: String::from_utf8_lossy(bytes).to_string(),
        })
    }
}

impl std::fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl Error {
    /// Returns `true` if the request could not be completed or the server
    /// answered with something other than a JSON success body.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Api { .. } | Error::Serialization(_)
        )
    }

    /// The HTTP status code, if the server responded with an error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_body_display() {
        let body = ApiErrorBody {
            code: Some(2),
            message: "Authentication failed.".to_string(),
        };
        assert_eq!(body.to_string(), "2: Authentication failed.");

        let body = ApiErrorBody {
            code: None,
            message: "bad gateway".to_string(),
        };
        assert_eq!(body.to_string(), "bad gateway");
    }

    #[test]
    fn test_api_error_body_from_json() {
        let body = ApiErrorBody::from_bytes(br#"{"code": 29, "message": "You have exceeded your rate limit."}"#);
        assert_eq!(body.code, Some(29));
        assert_eq!(body.message, "You have exceeded your rate limit.");
    }

    #[test]
    fn test_api_error_body_falls_back_to_raw_text() {
        let body = ApiErrorBody::from_bytes(b"<html>502</html>");
        assert_eq!(body.code, None);
        assert_eq!(body.message, "<html>502</html>");
    }

    #[test]
    fn test_is_transport() {
        let err = Error::Api {
            status: 500,
            body: ApiErrorBody {
                code: None,
                message: "oops".to_string(),
            },
        };
        assert!(err.is_transport());
        assert_eq!(err.status(), Some(500));

        assert!(!Error::NoMorePages.is_transport());
        assert!(!Error::MalformedResponse("string".to_string()).is_transport());
        assert_eq!(Error::NoMorePages.status(), None);
    }

    #[test]
    fn test_serialization_error_is_transport() {
        let err: Error = serde_json::from_str::<serde_json::Value>("not json")
            .unwrap_err()
            .into();
        assert!(err.is_transport());
    }
}
