//! Bearer-token authentication for the API client.

use hireflow_core::{Error, Result};

/// Source of bearer tokens for outgoing requests.
///
/// The [`ApiClient`](crate::ApiClient) asks for the current access token
/// before every request. When the backend answers 401, the client calls
/// [`refresh`](AuthProvider::refresh) exactly once and replays the request
/// with the returned token; a refresh failure is terminal and surfaces as an
/// authentication error, leaving the sign-in flow to the embedding
/// application.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the current access token.
    async fn access_token(&self) -> Result<String>;

    /// Exchanges the session's refresh credential for a new access token.
    async fn refresh(&self) -> Result<String>;
}

/// Auth provider holding a fixed token, for service accounts and tests.
///
/// Refreshing always fails: a static token has no refresh credential.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Creates a provider for the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait::async_trait]
impl AuthProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }

    async fn refresh(&self) -> Result<String> {
        Err(Error::authentication().with_message("static token cannot be refreshed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider_returns_token_and_refuses_refresh() {
        let provider = StaticTokenProvider::new("token-123");
        assert_eq!(provider.access_token().await.unwrap(), "token-123");
        assert!(provider.refresh().await.is_err());
    }
}
