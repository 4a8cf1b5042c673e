//! Reqwest-based HTTP client for the platform's REST API.

use std::sync::Arc;

use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use super::{Error, ReqwestConfig, TRACING_TARGET};
use crate::connection::{ConnectionConfig, Credentials};
use crate::transport::{Method, Transport, TransportRequest};

/// Header carrying the application token.
const APP_TOKEN_HEADER: &str = "X-App-Token";

const APPLICATION_JSON: &str = "application/json";

/// Inner client that holds the HTTP client and request settings.
struct ReqwestClientInner {
    http: Client,
    base_url: String,
    app_token: Option<String>,
    credentials: Option<Credentials>,
    config: ReqwestConfig,
}

/// Reqwest-based [`Transport`] for one data portal.
///
/// Every request carries JSON `Accept` and `Content-Type` headers, the app
/// token when one is configured and basic authentication when both a
/// username and a password are.
#[derive(Clone)]
pub struct ReqwestClient {
    inner: Arc<ReqwestClientInner>,
}

impl std::fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("base_url", &self.inner.base_url)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestClient {
    /// Creates a client for the portal described by `connection`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `connection` does not validate or
    /// the HTTP client cannot be built.
    pub fn new(connection: &ConnectionConfig, config: ReqwestConfig) -> crate::Result<Self> {
        connection.validate()?;

        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            base_url = %connection.base_url,
            timeout_ms = timeout.as_millis(),
            write_timeout_ms = config.effective_write_timeout().as_millis(),
            "Creating reqwest client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .build()
            .map_err(|e| {
                crate::Error::configuration()
                    .with_message("Failed to build HTTP client")
                    .with_source(e)
            })?;

        let inner = ReqwestClientInner {
            http,
            base_url: connection.base_url.trim_end_matches('/').to_owned(),
            app_token: connection.effective_app_token().map(ToOwned::to_owned),
            credentials: connection.credentials(),
            config,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ReqwestConfig {
        &self.inner.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    async fn execute(&self, request: TransportRequest) -> Result<Value, Error> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut http_request = self
            .inner
            .http
            .request(method, self.url(&request.path))
            .timeout(self.inner.config.timeout_for(request.method))
            .header(ACCEPT, APPLICATION_JSON)
            .header(CONTENT_TYPE, APPLICATION_JSON);

        if !request.params.is_empty() {
            http_request = http_request.query(&request.params);
        }
        if let Some(token) = &self.inner.app_token {
            http_request = http_request.header(APP_TOKEN_HEADER, token);
        }
        if let Some(credentials) = &self.inner.credentials {
            http_request =
                http_request.basic_auth(credentials.username(), Some(credentials.password()));
        }
        if let Some(body) = &request.body {
            http_request = http_request.json(body);
        }

        let http_response = http_request.send().await?;
        let status = http_response.status();
        let bytes = http_response.bytes().await?;

        tracing::debug!(
            target: TRACING_TARGET,
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            bytes = bytes.len(),
            "Received response"
        );

        if !status.is_success() {
            return Err(Error::Status {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestClient {
    async fn send(&self, request: TransportRequest) -> crate::Result<Value> {
        self.execute(request).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_client_creation() {
        let connection = ConnectionConfig::new("https://data.example.gov/");
        let client = ReqwestClient::new(&connection, ReqwestConfig::default()).unwrap();

        assert!(client.config().user_agent.is_none());
        assert_eq!(
            client.url("/resource/abcd-1234.json"),
            "https://data.example.gov/resource/abcd-1234.json"
        );
    }

    #[test]
    fn test_invalid_connection_rejected() {
        let connection = ConnectionConfig::new("");
        let error = ReqwestClient::new(&connection, ReqwestConfig::default()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let connection = ConnectionConfig::new("https://data.example.gov")
            .with_app_token("tok_secret")
            .with_credentials("me", "hunter2");
        let client = ReqwestClient::new(&connection, ReqwestConfig::default()).unwrap();

        let debug_output = format!("{client:?}");
        assert!(!debug_output.contains("tok_secret"));
        assert!(!debug_output.contains("hunter2"));
    }
}
