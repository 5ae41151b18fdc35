//! Consumer and token credentials shared by every request of a session.
//!
//! All credential types implement custom Debug to redact sensitive data.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};
use crate::signer::Signer;

/// An OAuth token and its secret.
///
/// Request tokens and access tokens share this shape; the handshake replaces
/// one with the other.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    token: String,
    secret: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("token", &self.token)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TokenPair {
    /// Create a new token pair.
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }

    /// The public token value.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The token secret.
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

/// Consumer key/secret plus the optional token pair of one session.
///
/// The consumer half never changes. The token pair is replaced as a whole by
/// [`Credentials::set_token`], so a signer created on another thread observes
/// either the previous pair or the new one, never a mix of the two.
pub struct Credentials {
    consumer_key: String,
    consumer_secret: String,
    token: RwLock<Option<Arc<TokenPair>>>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("token", &self.token.read().as_ref().map(|t| t.token().to_string()))
            .finish()
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            consumer_key: self.consumer_key.clone(),
            consumer_secret: self.consumer_secret.clone(),
            token: RwLock::new(self.token.read().clone()),
        }
    }
}

impl Credentials {
    /// Create credentials holding only the consumer key and secret.
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: RwLock::new(None),
        }
    }

    /// Attach an already obtained token pair.
    pub fn with_token(self, token: impl Into<String>, token_secret: impl Into<String>) -> Self {
        self.set_token(token, token_secret);
        self
    }

    /// Load credentials from environment variables.
    ///
    /// Required environment variables:
    /// - `RIDGELINE_CONSUMER_KEY`
    /// - `RIDGELINE_CONSUMER_SECRET`
    ///
    /// Optional (both or neither):
    /// - `RIDGELINE_TOKEN`
    /// - `RIDGELINE_TOKEN_SECRET`
    pub fn from_env() -> Result<Self> {
        let consumer_key = std::env::var("RIDGELINE_CONSUMER_KEY")
            .map_err(|_| Error::new(ErrorKind::EnvVar("RIDGELINE_CONSUMER_KEY".to_string())))?;
        let consumer_secret = std::env::var("RIDGELINE_CONSUMER_SECRET")
            .map_err(|_| Error::new(ErrorKind::EnvVar("RIDGELINE_CONSUMER_SECRET".to_string())))?;

        let creds = Self::new(consumer_key, consumer_secret);

        match (
            std::env::var("RIDGELINE_TOKEN").ok(),
            std::env::var("RIDGELINE_TOKEN_SECRET").ok(),
        ) {
            (Some(token), Some(secret)) => Ok(creds.with_token(token, secret)),
            (None, None) => Ok(creds),
            _ => Err(Error::new(ErrorKind::InvalidCredentials(
                "RIDGELINE_TOKEN and RIDGELINE_TOKEN_SECRET must be set together".to_string(),
            ))),
        }
    }

    /// The consumer key.
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    /// Returns true once a request or access token has been stored.
    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    /// The current token pair, if any.
    pub fn token(&self) -> Option<Arc<TokenPair>> {
        self.token.read().clone()
    }

    /// Replace the token pair.
    ///
    /// Every handshake step calls this; the contents are not validated and an
    /// empty token is accepted.
    pub fn set_token(&self, token: impl Into<String>, token_secret: impl Into<String>) {
        let pair = Arc::new(TokenPair::new(token, token_secret));
        *self.token.write() = Some(pair);
        tracing::debug!(consumer_key = %self.consumer_key, "Token pair replaced");
    }

    /// Drop the token pair, returning to the pre-authorization state.
    pub fn clear_token(&self) {
        *self.token.write() = None;
    }

    /// Create a signer bound to the consumer credentials and the token pair
    /// current at the time of the call.
    pub fn create_signer(&self) -> Signer {
        Signer::new(
            self.consumer_key.clone(),
            self.consumer_secret.clone(),
            self.token.read().clone(),
        )
    }
}
