//! Session object owning credentials, executor and shared collections.

use std::sync::Arc;

use ridgeline_analytics_auth::{Credentials, SessionSnapshot, TokenResponse};
use ridgeline_analytics_client::{ClientConfig, Executor, RequestBuilder};
use tracing::{info, instrument, warn};
use url::Url;

use crate::cached::CachedCollection;
use crate::error::{Error, ErrorKind, Result};
use crate::paginated::PaginatedCollection;
use crate::parser::ElementParser;
use crate::registry::{CollectionRegistry, Shared};

/// Environment variable holding the service base URL.
pub const BASE_URL_ENV: &str = "RIDGELINE_BASE_URL";

/// Paths of the OAuth 1.0a handshake endpoints, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoints {
    pub request_token: String,
    pub authorize: String,
    pub access_token: String,
}

impl Default for OAuthEndpoints {
    fn default() -> Self {
        Self {
            request_token: "oauth/request_token".to_string(),
            authorize: "oauth/authorize".to_string(),
            access_token: "oauth/access_token".to_string(),
        }
    }
}

/// Client for one analytics service and one set of credentials.
///
/// # Example
///
/// ```rust,ignore
/// use ridgeline_analytics_rest::{AnalyticsClient, ElementParser};
///
/// let client = AnalyticsClient::from_env()?;
///
/// let reports = client.paginated::<serde_json::Value>(
///     "reports",
///     "reports",
///     "reports",
///     ElementParser::deserialize(),
/// )?;
///
/// let mut reports = reports.lock().await;
/// reports.load_size(20).await?;
/// while reports.has_next_page() {
///     reports.load_next().await?;
/// }
/// ```
#[derive(Debug)]
pub struct AnalyticsClient {
    credentials: Arc<Credentials>,
    executor: Arc<Executor>,
    endpoints: OAuthEndpoints,
    registry: CollectionRegistry,
}

impl AnalyticsClient {
    /// Create a client with the default transport configuration.
    pub fn new(base_url: impl AsRef<str>, credentials: Credentials) -> Result<Self> {
        Self::with_config(base_url, credentials, ClientConfig::default())
    }

    /// Create a client with a custom transport configuration.
    pub fn with_config(
        base_url: impl AsRef<str>,
        credentials: Credentials,
        config: ClientConfig,
    ) -> Result<Self> {
        let credentials = Arc::new(credentials);
        let executor = Executor::new(base_url, Arc::clone(&credentials), config)?;
        Ok(Self {
            credentials,
            executor: Arc::new(executor),
            endpoints: OAuthEndpoints::default(),
            registry: CollectionRegistry::new(),
        })
    }

    /// Create a client from `RIDGELINE_BASE_URL` and the credential
    /// variables read by [`Credentials::from_env`].
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(BASE_URL_ENV).map_err(|_| {
            Error::new(ErrorKind::Configuration(format!(
                "Environment variable not set: {}",
                BASE_URL_ENV
            )))
        })?;
        Self::new(base_url, Credentials::from_env()?)
    }

    /// Rebuild a client from a saved session.
    pub fn restore(
        snapshot: &SessionSnapshot,
        consumer_secret: impl Into<String>,
        base_url: impl AsRef<str>,
        config: ClientConfig,
    ) -> Result<Self> {
        Self::with_config(
            base_url,
            Credentials::from_snapshot(snapshot, consumer_secret),
            config,
        )
    }

    /// Capture the persistable session state (consumer key and token pair).
    pub fn snapshot(&self) -> SessionSnapshot {
        self.credentials.snapshot()
    }

    /// Use non-default handshake endpoint paths.
    pub fn with_endpoints(mut self, endpoints: OAuthEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn credentials(&self) -> &Arc<Credentials> {
        &self.credentials
    }

    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    pub fn endpoints(&self) -> &OAuthEndpoints {
        &self.endpoints
    }

    pub fn base_url(&self) -> &Url {
        self.executor.base_url()
    }

    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    /// Obtain a request token and store it as the current token pair.
    ///
    /// Any token held before is discarded, since the request must be signed
    /// with the consumer credentials alone. Use `"oob"` as `callback` for
    /// out-of-band verification.
    #[instrument(skip(self))]
    pub async fn request_token(&self, callback: &str) -> Result<TokenResponse> {
        self.credentials.clear_token();

        let request = RequestBuilder::post(self.endpoints.request_token.as_str())
            .oauth_param("oauth_callback", callback);
        let response = self.token_exchange(request).await?;

        if response.oauth_callback_confirmed == Some(false) {
            warn!("Server did not confirm the callback");
        }
        info!("Obtained request token");
        Ok(response)
    }

    /// URL the user visits to authorize `request_token`.
    pub fn authorization_url(&self, request_token: &str) -> Result<Url> {
        let mut url = self.executor.resolve(&self.endpoints.authorize)?;
        url.query_pairs_mut().append_pair("oauth_token", request_token);
        Ok(url)
    }

    /// Exchange the authorized request token for an access token and store it
    /// as the current token pair.
    #[instrument(skip(self, verifier))]
    pub async fn access_token(&self, verifier: &str) -> Result<TokenResponse> {
        if !self.credentials.has_token() {
            return Err(Error::invalid_argument(
                "no request token held; call request_token first",
            ));
        }

        let request = RequestBuilder::post(self.endpoints.access_token.as_str())
            .oauth_param("oauth_verifier", verifier);
        let response = self.token_exchange(request).await?;

        info!("Obtained access token");
        Ok(response)
    }

    async fn token_exchange(&self, request: RequestBuilder) -> Result<TokenResponse> {
        let body = self.executor.execute(request).await?;
        let text = String::from_utf8_lossy(&body);

        let response = TokenResponse::from_form(&text).map_err(|e| {
            Error::with_source(
                ErrorKind::UnexpectedResponse {
                    status: 200,
                    body: text.to_string(),
                },
                e,
            )
        })?;

        self.credentials
            .set_token(&response.oauth_token, &response.oauth_token_secret);
        Ok(response)
    }

    /// Shared cached collection under `key`, created on first use.
    pub fn cached<T>(
        &self,
        key: &str,
        path: &str,
        field: &str,
        parser: ElementParser<T>,
    ) -> Result<Shared<CachedCollection<T>>>
    where
        T: Send + Sync + 'static,
    {
        self.registry
            .get_or_insert_with(key, || self.new_cached(path, field, parser))
    }

    /// Shared paginated collection under `key`, created on first use.
    pub fn paginated<T>(
        &self,
        key: &str,
        path: &str,
        field: &str,
        parser: ElementParser<T>,
    ) -> Result<Shared<PaginatedCollection<T>>>
    where
        T: Send + Sync + 'static,
    {
        self.registry
            .get_or_insert_with(key, || self.new_paginated(path, field, parser))
    }

    /// Unshared cached collection.
    pub fn new_cached<T>(&self, path: &str, field: &str, parser: ElementParser<T>) -> CachedCollection<T> {
        CachedCollection::new(Arc::clone(&self.executor), path, field, parser)
    }

    /// Unshared paginated collection.
    pub fn new_paginated<T>(
        &self,
        path: &str,
        field: &str,
        parser: ElementParser<T>,
    ) -> PaginatedCollection<T> {
        PaginatedCollection::new(Arc::clone(&self.executor), path, field, parser)
    }

    /// Drop the shared collection under `key`.
    pub fn evict(&self, key: &str) -> bool {
        self.registry.remove(key)
    }
}
