//! Token responses returned by the OAuth 1.0a handshake endpoints.

use serde::{Deserialize, Serialize};

use crate::credentials::TokenPair;
use crate::error::{Error, ErrorKind, Result};

/// Response of the request-token and access-token endpoints.
///
/// Both endpoints answer with an `application/x-www-form-urlencoded` body:
///
/// ```text
/// oauth_token=abc&oauth_token_secret=xyz&oauth_callback_confirmed=true
/// ```
///
/// The token secret is redacted in Debug output.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The token value.
    pub oauth_token: String,
    /// The token secret.
    pub oauth_token_secret: String,
    /// Present on request-token responses.
    #[serde(default, deserialize_with = "bool_from_str")]
    pub oauth_callback_confirmed: Option<bool>,
    /// Lifetime of the token in seconds, if the server reports one.
    #[serde(default, deserialize_with = "u64_from_str")]
    pub oauth_expires_in: Option<u64>,
    /// Lifetime of the authorization in seconds, if the server reports one.
    #[serde(default, deserialize_with = "u64_from_str")]
    pub oauth_authorization_expires_in: Option<u64>,
    /// Session handle for servers that support token renewal.
    #[serde(default)]
    pub oauth_session_handle: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("oauth_token", &self.oauth_token)
            .field("oauth_token_secret", &"[REDACTED]")
            .field("oauth_callback_confirmed", &self.oauth_callback_confirmed)
            .field("oauth_expires_in", &self.oauth_expires_in)
            .field(
                "oauth_authorization_expires_in",
                &self.oauth_authorization_expires_in,
            )
            .field(
                "oauth_session_handle",
                &self.oauth_session_handle.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl TokenResponse {
    /// Parse a url-encoded token response body.
    pub fn from_form(body: &str) -> Result<Self> {
        let response: TokenResponse = serde_urlencoded::from_str(body.trim())?;
        if response.oauth_token.is_empty() {
            return Err(Error::new(ErrorKind::InvalidTokenResponse(
                "oauth_token is empty".to_string(),
            )));
        }
        Ok(response)
    }

    /// The token/secret pair carried by this response.
    pub fn token_pair(&self) -> TokenPair {
        TokenPair::new(&self.oauth_token, &self.oauth_token_secret)
    }
}

fn bool_from_str<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| v.eq_ignore_ascii_case("true")))
}

fn u64_from_str<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_token_response() {
        let body = "oauth_token=req123&oauth_token_secret=sec456&oauth_callback_confirmed=true";
        let token = TokenResponse::from_form(body).unwrap();

        assert_eq!(token.oauth_token, "req123");
        assert_eq!(token.oauth_token_secret, "sec456");
        assert_eq!(token.oauth_callback_confirmed, Some(true));
        assert_eq!(token.oauth_expires_in, None);
    }

    #[test]
    fn test_parse_access_token_response_with_lifetimes() {
        let body = "oauth_token=acc&oauth_token_secret=s%2Bs&oauth_expires_in=3600\
                    &oauth_authorization_expires_in=86400&oauth_session_handle=h1\n";
        let token = TokenResponse::from_form(body).unwrap();

        assert_eq!(token.oauth_token_secret, "s+s");
        assert_eq!(token.oauth_expires_in, Some(3600));
        assert_eq!(token.oauth_authorization_expires_in, Some(86400));
        assert_eq!(token.oauth_session_handle.as_deref(), Some("h1"));
        assert_eq!(token.token_pair().token(), "acc");
    }

    #[test]
    fn test_missing_secret_is_error() {
        let err = TokenResponse::from_form("oauth_token=abc").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidTokenResponse(_)));
    }

    #[test]
    fn test_empty_token_is_error() {
        let err = TokenResponse::from_form("oauth_token=&oauth_token_secret=x").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidTokenResponse(_)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let token = TokenResponse::from_form("oauth_token=abc&oauth_token_secret=hidden").unwrap();
        let debug = format!("{:?}", token);
        assert!(debug.contains("abc"));
        assert!(!debug.contains("hidden"));
    }
}
