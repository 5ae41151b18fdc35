//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! A [`Signer`] is created per request from the session's
//! [`Credentials`](crate::Credentials). It builds the signature base string from
//! the request method, the normalized URL and every request parameter, signs it
//! with the consumer and token secrets, and renders the `Authorization` header.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::distr::Alphanumeric;
use rand::Rng;
use sha1::Sha1;
use url::Url;

use crate::credentials::TokenPair;
use crate::error::{Error, ErrorKind, Result};

type HmacSha1 = Hmac<Sha1>;

/// Signature method advertised in `oauth_signature_method`.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// Protocol version advertised in `oauth_version`.
pub const OAUTH_VERSION: &str = "1.0";

const NONCE_LENGTH: usize = 32;

/// Per-request OAuth 1.0a signer.
#[derive(Clone)]
pub struct Signer {
    consumer_key: String,
    consumer_secret: String,
    token: Option<Arc<TokenPair>>,
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("token", &self.token)
            .finish()
    }
}

impl Signer {
    pub(crate) fn new(
        consumer_key: String,
        consumer_secret: String,
        token: Option<Arc<TokenPair>>,
    ) -> Self {
        Self {
            consumer_key,
            consumer_secret,
            token,
        }
    }

    /// Returns true if requests are signed with a token pair.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// The token pair this signer was created with.
    pub fn token(&self) -> Option<&TokenPair> {
        self.token.as_deref()
    }

    /// Compute the `Authorization` header value for a request.
    ///
    /// `params` are the url-encoded form body parameters (query parameters are
    /// read from `url`). `protocol_params` are extra `oauth_*` parameters such
    /// as `oauth_callback` or `oauth_verifier`; they are signed and emitted in
    /// the header.
    pub fn authorization_header(
        &self,
        method: &str,
        url: &Url,
        params: &[(String, String)],
        protocol_params: &[(String, String)],
    ) -> Result<String> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        self.authorization_header_with(method, url, params, protocol_params, &nonce(), &timestamp)
    }

    pub(crate) fn authorization_header_with(
        &self,
        method: &str,
        url: &Url,
        params: &[(String, String)],
        protocol_params: &[(String, String)],
        nonce: &str,
        timestamp: &str,
    ) -> Result<String> {
        let mut oauth = self.oauth_params(nonce, timestamp);
        oauth.extend(protocol_params.iter().cloned());

        let base = signature_base_string(method, url, params, &oauth)?;
        let signature = self.sign(&base)?;
        oauth.push(("oauth_signature".to_string(), signature));
        oauth.sort();

        let fields: Vec<String> = oauth
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect();

        Ok(format!("OAuth realm=\"\", {}", fields.join(", ")))
    }

    fn oauth_params(&self, nonce: &str, timestamp: &str) -> Vec<(String, String)> {
        let mut params = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ];
        if let Some(ref token) = self.token {
            params.push(("oauth_token".to_string(), token.token().to_string()));
        }
        params
    }

    fn signing_key(&self) -> String {
        let token_secret = self.token.as_ref().map(|t| t.secret()).unwrap_or("");
        format!("{}&{}", encode(&self.consumer_secret), encode(token_secret))
    }

    fn sign(&self, base_string: &str) -> Result<String> {
        let mut mac = HmacSha1::new_from_slice(self.signing_key().as_bytes())
            .map_err(|e| Error::new(ErrorKind::Signing(e.to_string())))?;
        mac.update(base_string.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

/// Draw a fresh nonce from the thread-local, OS-seeded generator.
fn nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

/// RFC 3986 percent-encoding: everything except `A-Z a-z 0-9 - . _ ~`.
pub fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// `scheme://host[:port]/path`, lowercase scheme and host, default ports dropped.
fn base_string_uri(url: &Url) -> Result<String> {
    let host = url.host_str().ok_or_else(|| {
        Error::new(ErrorKind::Signing(format!("URL has no host: {}", url)))
    })?;

    let mut uri = format!("{}://{}", url.scheme(), host.to_ascii_lowercase());
    if let Some(port) = url.port() {
        uri.push_str(&format!(":{}", port));
    }
    uri.push_str(url.path());
    Ok(uri)
}

pub(crate) fn signature_base_string(
    method: &str,
    url: &Url,
    params: &[(String, String)],
    oauth_params: &[(String, String)],
) -> Result<String> {
    let mut normalized: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (encode(&k), encode(&v)))
        .chain(params.iter().map(|(k, v)| (encode(k), encode(v))))
        .chain(oauth_params.iter().map(|(k, v)| (encode(k), encode(v))))
        .collect();
    normalized.sort();

    let joined = normalized
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    Ok(format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(&base_string_uri(url)?),
        encode(&joined)
    ))
}
