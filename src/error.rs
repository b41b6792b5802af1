//! Error types for the SteamBots client library.

use thiserror::Error;

/// The main error type for all SteamBots client operations.
#[derive(Error, Debug)]
pub enum SteamBotsError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP request with middleware failed
    #[error("HTTP request failed: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// The SteamBots API answered with a non-success status
    #[error("SteamBots API error: {0}")]
    Api(ApiError),

    /// A caller-supplied argument failed validation before any request was sent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid response from the API
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A stream frame could not be decoded into an event
    #[error("Stream decode error: {0}")]
    StreamDecode(String),

    /// Missing API key
    #[error("Missing credentials: an API key is required")]
    MissingCredentials,
}

impl SteamBotsError {
    /// Shorthand for building an [`SteamBotsError::InvalidArgument`].
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Returns the API error if this is one.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Error returned by the SteamBots API itself.
///
/// `body` is the decoded response body exactly as the server sent it. When
/// the body is not valid JSON it is kept as a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status code of the response
    pub status: u16,
    /// Decoded response body
    pub body: serde_json::Value,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.message() {
            Some(message) => write!(f, "HTTP {}: {}", self.status, message),
            None => write!(f, "HTTP {}: {}", self.status, self.body),
        }
    }
}

impl ApiError {
    /// Create a new API error from a status code and a decoded body.
    pub fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    /// Build an API error from a raw response body.
    pub fn from_body(status: u16, raw: &str) -> Self {
        let body = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        Self { status, body }
    }

    /// The human-readable message, if the body carries one.
    ///
    /// Looks at the `message` and `error` fields, or the body itself when it
    /// is a bare string.
    pub fn message(&self) -> Option<&str> {
        match &self.body {
            serde_json::Value::String(s) => Some(s.as_str()),
            serde_json::Value::Object(map) => map
                .get("message")
                .or_else(|| map.get("error"))
                .and_then(|v| v.as_str()),
            _ => None,
        }
    }

    /// Check if the key was rejected.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.status == 403
    }

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limit(&self) -> bool {
        self.status == 429
    }
}
