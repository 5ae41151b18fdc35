//! Authenticated request executor.
//!
//! Every request is resolved against the service base URL, signed with the
//! current credentials, sent, and either returns the raw response body or a
//! classified error. The executor never retries; see [`crate::retry`].

use std::sync::Arc;

use bytes::Bytes;
use ridgeline_analytics_auth::Credentials;
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

use crate::classify::{classify, is_success_status, RequestContext};
use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::request::{MultipartPart, RequestBody, RequestBuilder};

/// Sends signed requests against one analytics service.
#[derive(Debug, Clone)]
pub struct Executor {
    inner: reqwest::Client,
    base_url: Url,
    credentials: Arc<Credentials>,
    config: ClientConfig,
}

impl Executor {
    /// Create an executor for the service rooted at `base_url`.
    pub fn new(
        base_url: impl AsRef<str>,
        credentials: Arc<Credentials>,
        config: ClientConfig,
    ) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() || base_url.host_str().is_none() {
            return Err(Error::new(ErrorKind::Configuration(format!(
                "Base URL must be absolute with a host: {}",
                base_url
            ))));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.accept_compressed)
            .deflate(config.accept_compressed);

        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let inner = builder
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Configuration(e.to_string()), e))?;

        Ok(Self {
            inner,
            base_url,
            credentials,
            config,
        })
    }

    /// The service base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The credentials every request is signed with.
    pub fn credentials(&self) -> &Arc<Credentials> {
        &self.credentials
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve a relative path against the base URL. Absolute URLs are
    /// returned unchanged.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Execute a request and return the raw body of a 200/204 response.
    #[instrument(skip(self, request), fields(method = request.method.as_str(), path = %request.path))]
    pub async fn execute(&self, request: RequestBuilder) -> Result<Bytes> {
        let mut url = self.resolve(&request.path)?;
        if !request.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query_params);
        }

        // One signer per request so a concurrent token swap cannot mix pairs.
        let signer = self.credentials.create_signer();
        let authorization = signer.authorization_header(
            request.method.as_str(),
            &url,
            request.signed_body_params(),
            &request.protocol_params,
        )?;

        let mut req = self
            .inner
            .request(request.method.to_reqwest(), url.clone())
            .header(reqwest::header::AUTHORIZATION, authorization);

        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if let Some(ref body) = request.body {
            req = match body {
                RequestBody::Form(params) => {
                    let encoded = serde_urlencoded::to_string(params).map_err(|e| {
                        Error::with_source(ErrorKind::InvalidArgument(e.to_string()), e)
                    })?;
                    req.header(
                        reqwest::header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    )
                    .body(encoded)
                }
                RequestBody::Raw { data, content_type } => req
                    .header(reqwest::header::CONTENT_TYPE, content_type.as_str())
                    .body(data.clone()),
                RequestBody::Multipart(parts) => {
                    let mut form = reqwest::multipart::Form::new();
                    for part in parts {
                        form = form.part(part.name.clone(), part.to_reqwest()?);
                    }
                    req.multipart(form)
                }
            };
        }

        if self.config.enable_tracing {
            debug!(url = %url, signed_with_token = signer.has_token(), "Sending request");
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        if is_success_status(status) {
            if self.config.enable_tracing {
                debug!(status, content_length = body.len(), "Response received");
            }
            return Ok(body);
        }

        if self.config.enable_tracing {
            info!(status, content_length = body.len(), "Non-success response");
        }

        let uri = url.to_string();
        Err(classify(
            status,
            &body,
            &RequestContext {
                uri: &uri,
                signed_with_token: signer.has_token(),
            },
        ))
    }

    /// Execute a request and parse the body as JSON.
    pub async fn execute_json(&self, request: RequestBuilder) -> Result<Value> {
        let body = self.execute(request).await?;
        parse_json(&body)
    }

    /// GET a path and return the raw body.
    pub async fn get(&self, path: &str) -> Result<Bytes> {
        self.execute(RequestBuilder::get(path)).await
    }

    /// GET a path and parse the body as JSON.
    pub async fn get_json(&self, path: &str) -> Result<Value> {
        self.execute_json(RequestBuilder::get(path)).await
    }

    /// POST url-encoded form parameters.
    pub async fn post_form<K, V>(
        &self,
        path: &str,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Bytes>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.execute(RequestBuilder::post(path).form(params)).await
    }

    /// POST a raw body with the given content type.
    pub async fn post_body(
        &self,
        path: &str,
        data: impl Into<Bytes>,
        content_type: &str,
    ) -> Result<Bytes> {
        self.execute(RequestBuilder::post(path).body(data, content_type))
            .await
    }

    /// POST a multipart body.
    pub async fn post_multipart(&self, path: &str, parts: Vec<MultipartPart>) -> Result<Bytes> {
        self.execute(RequestBuilder::post(path).multipart(parts))
            .await
    }

    /// DELETE a path.
    pub async fn delete(&self, path: &str) -> Result<Bytes> {
        self.execute(RequestBuilder::delete(path)).await
    }
}

/// Parse a response body as JSON, keeping the raw text on failure.
pub fn parse_json(body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(|e| {
        Error::with_source(
            ErrorKind::InvalidJson {
                body: String::from_utf8_lossy(body).into_owned(),
            },
            e,
        )
    })
}
