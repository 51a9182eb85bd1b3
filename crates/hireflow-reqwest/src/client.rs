//! Reqwest-based HTTP client with bearer authentication.

use std::sync::Arc;

use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use hireflow_core::Result;

use crate::auth::AuthProvider;
use crate::config::ApiClientConfig;
use crate::error::Error;

/// Tracing target for API client operations.
pub const TRACING_TARGET: &str = "hireflow_reqwest::client";

/// Inner client that holds the HTTP client, configuration and auth source.
struct ApiClientInner {
    http: Client,
    config: ApiClientConfig,
    auth: Arc<dyn AuthProvider>,
}

/// HTTP client for the hireflow backend.
///
/// Every request carries a bearer token obtained from the configured
/// [`AuthProvider`]. A 401 response triggers exactly one token refresh and
/// one replay of the original request; a second 401 or a failed refresh is
/// terminal.
///
/// # Examples
///
/// ```rust,ignore
/// use hireflow_reqwest::{ApiClient, ApiClientConfig, StaticTokenProvider};
/// use url::Url;
///
/// let config = ApiClientConfig::new(Url::parse("https://api.example.com/v1/")?);
/// let client = ApiClient::new(config, StaticTokenProvider::new("token"))?;
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a new API client with the given configuration and auth
    /// provider.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the configuration is invalid or
    /// the HTTP client cannot be created.
    pub fn new<A>(config: ApiClientConfig, auth: A) -> Result<Self>
    where
        A: AuthProvider + 'static,
    {
        config.validate()?;

        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            base_url = %config.base_url,
            timeout_ms = timeout.as_millis(),
            "Creating API client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .build()
            .map_err(|e| {
                hireflow_core::Error::configuration()
                    .with_message("failed to create HTTP client")
                    .with_source(e)
            })?;

        let inner = ApiClientInner {
            http,
            config,
            auth: Arc::new(auth),
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ApiClientConfig {
        &self.inner.config
    }

    /// Resolves an endpoint path against the configured base URL.
    ///
    /// Paths are relative (no leading slash); the base URL is expected to
    /// end with a slash so its own path segments are preserved.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        self.inner
            .config
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| {
                hireflow_core::Error::configuration()
                    .with_message(format!("invalid endpoint path: {path}"))
                    .with_source(e)
            })
    }

    /// Issues a GET request and deserializes the JSON response.
    pub(crate) async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        self.execute_json(Method::GET, url, None).await
    }

    /// Issues a POST request with a JSON body and deserializes the JSON
    /// response.
    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let body = serde_json::to_value(body).map_err(Error::Serde)?;
        self.execute_json(Method::POST, url, Some(body)).await
    }

    async fn execute_json<T>(&self, method: Method, url: Url, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let token = self.inner.auth.access_token().await?;
        let mut response = self.send(method.clone(), url.clone(), body.as_ref(), &token).await?;

        // One refresh, one replay. A failed refresh surfaces as the
        // terminal authentication error for the caller's sign-in flow.
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!(
                target: TRACING_TARGET,
                url = %url,
                "Access token rejected, refreshing"
            );
            let token = self.inner.auth.refresh().await?;
            response = self.send(method, url, body.as_ref(), &token).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(1024)
                .collect();
            tracing::warn!(
                target: TRACING_TARGET,
                status = status.as_u16(),
                "Request rejected by server"
            );
            return Err(Error::Status { status, body }.into());
        }

        let text = response.text().await.map_err(Error::Reqwest)?;
        let value = serde_json::from_str(&text).map_err(Error::Serde)?;
        Ok(value)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        token: &str,
    ) -> Result<Response> {
        let mut request = self.inner.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(Error::Reqwest)?;
        Ok(response)
    }
}
