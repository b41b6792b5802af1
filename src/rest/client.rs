//! SteamBots REST API client implementation.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use reqwest_tracing::TracingMiddleware;

use crate::auth::CredentialsProvider;
use crate::error::{ApiError, SteamBotsError};
use crate::rest::endpoints::STEAMBOTS_API_URL;
use crate::rest::request::ApiRequest;

/// Header carrying the API key on REST calls.
pub const API_KEY_HEADER: &str = "Key";

/// The SteamBots REST API client.
///
/// Every call is authenticated with the `Key` header. Responses with status
/// `200` are decoded as JSON; any other status becomes
/// [`SteamBotsError::Api`] carrying the decoded body.
///
/// # Example
///
/// ```rust,no_run
/// use steambots_api_client::auth::StaticCredentials;
/// use steambots_api_client::rest::SteamBotsRestClient;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = SteamBotsRestClient::builder()
///         .credentials(Arc::new(StaticCredentials::new("api_key")))
///         .build();
///
///     let bots = client.get_bots().await?;
///     println!("Bots: {}", bots);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct SteamBotsRestClient {
    http_client: ClientWithMiddleware,
    base_url: String,
    credentials: Option<Arc<dyn CredentialsProvider>>,
}

impl SteamBotsRestClient {
    /// Create a new client builder.
    pub fn builder() -> SteamBotsRestClientBuilder {
        SteamBotsRestClientBuilder::new()
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform one authenticated call and return the decoded JSON body.
    pub async fn call(&self, request: ApiRequest) -> Result<serde_json::Value, SteamBotsError> {
        self.call_as(request).await
    }

    /// Perform one authenticated call and decode the body into `T`.
    pub async fn call_as<T>(&self, request: ApiRequest) -> Result<T, SteamBotsError>
    where
        T: serde::de::DeserializeOwned,
    {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(SteamBotsError::MissingCredentials)?;

        let url = self.request_url(&request)?;
        tracing::debug!(method = %request.method, %url, "calling SteamBots API");

        let mut builder = self
            .http_client
            .request(request.method, &url)
            .header(API_KEY_HEADER, credentials.get_credentials().expose_key());
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await?;
        self.parse_response(response).await
    }

    /// Build `base_url + path [+ "?" + query]`.
    fn request_url(&self, request: &ApiRequest) -> Result<String, SteamBotsError> {
        let query_string = serde_urlencoded::to_string(&request.query)
            .map_err(|e| SteamBotsError::InvalidArgument(e.to_string()))?;
        Ok(if query_string.is_empty() {
            format!("{}{}", self.base_url, request.path)
        } else {
            format!("{}{}?{}", self.base_url, request.path, query_string)
        })
    }

    /// Parse a response from the SteamBots API.
    async fn parse_response<T>(&self, response: reqwest::Response) -> Result<T, SteamBotsError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        let body = response.text().await?;

        // Only an exact 200 counts as success; the body is the error value otherwise.
        if status != StatusCode::OK {
            let error = ApiError::from_body(status.as_u16(), &body);
            tracing::debug!(status = status.as_u16(), "SteamBots API returned an error");
            return Err(SteamBotsError::Api(error));
        }

        serde_json::from_str(&body).map_err(|e| {
            SteamBotsError::InvalidResponse(format!("Failed to parse response: {}. Body: {}", e, body))
        })
    }
}

impl std::fmt::Debug for SteamBotsRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SteamBotsRestClient")
            .field("base_url", &self.base_url)
            .field("has_credentials", &self.credentials.is_some())
            .finish()
    }
}

/// Builder for [`SteamBotsRestClient`].
pub struct SteamBotsRestClientBuilder {
    base_url: String,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    user_agent: Option<String>,
    max_retries: u32,
}

impl SteamBotsRestClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: STEAMBOTS_API_URL.to_string(),
            credentials: None,
            user_agent: None,
            max_retries: 0,
        }
    }

    /// Set the base URL (useful for testing with a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the credentials provider.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the maximum number of retries for transient failures.
    ///
    /// Defaults to `0`: deposits and withdrawals are not idempotent, so a
    /// call is sent exactly once unless retries are opted into.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Build the client.
    pub fn build(self) -> SteamBotsRestClient {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("steambots-api-client/{}", env!("CARGO_PKG_VERSION")));

        let client = ClientBuilder::new(base_http_client(&user_agent))
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy(
                ExponentialBackoff::builder().build_with_max_retries(self.max_retries),
            ))
            .build();

        SteamBotsRestClient {
            http_client: client,
            base_url: self.base_url,
            credentials: self.credentials,
        }
    }
}

impl Default for SteamBotsRestClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain reqwest client with the SDK's default headers.
pub(crate) fn base_http_client(user_agent: &str) -> reqwest::Client {
    let mut headers = HeaderMap::new();
    let header_value = HeaderValue::from_str(user_agent)
        .unwrap_or_else(|_| HeaderValue::from_static("steambots-api-client"));
    headers.insert(USER_AGENT, header_value);

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentials;

    fn client() -> SteamBotsRestClient {
        SteamBotsRestClient::builder()
            .base_url("http://localhost:9000/")
            .credentials(Arc::new(StaticCredentials::new("k")))
            .build()
    }

    #[test]
    fn test_request_url_without_query() {
        let url = client().request_url(&ApiRequest::get("/bots")).unwrap();
        assert_eq!(url, "http://localhost:9000/bots");
    }

    #[test]
    fn test_request_url_encodes_query() {
        let request = ApiRequest::get("/items").query_param("name", "AK-47 | Redline");
        let url = client().request_url(&request).unwrap();
        assert_eq!(url, "http://localhost:9000/items?name=AK-47+%7C+Redline");
    }

    #[test]
    fn test_debug_hides_credentials() {
        let debug = format!("{:?}", client());
        assert!(debug.contains("has_credentials: true"));
        assert!(!debug.contains("\"k\""));
    }
}
