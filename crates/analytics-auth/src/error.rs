//! Error types for analytics-auth.
//!
//! Error messages are designed to avoid exposing consumer or token secrets.

/// Result type alias for analytics-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for analytics-auth operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if this error was raised while signing a request.
    pub fn is_signing_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Signing(_))
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// A request could not be signed (bad URL, unusable key material).
    #[error("Signing error: {0}")]
    Signing(String),

    /// A token response was missing required fields or was malformed.
    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    /// Invalid credentials configuration.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Environment variable not set.
    #[error("Environment variable not set: {0}")]
    EnvVar(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<serde_urlencoded::de::Error> for Error {
    fn from(err: serde_urlencoded::de::Error) -> Self {
        Error::with_source(ErrorKind::InvalidTokenResponse(err.to_string()), err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Io(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::Signing(format!("Invalid URL: {}", err)), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        let err = ErrorKind::Signing("base URL has no host".to_string());
        assert_eq!(err.to_string(), "Signing error: base URL has no host");

        let err = ErrorKind::EnvVar("RIDGELINE_CONSUMER_KEY".to_string());
        assert_eq!(
            err.to_string(),
            "Environment variable not set: RIDGELINE_CONSUMER_KEY"
        );
    }

    #[test]
    fn test_from_url_parse_error_is_signing_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: Error = url_err.into();
        assert!(err.is_signing_error());
        assert!(err.source.is_some());
    }

    #[test]
    fn test_from_urlencoded_error() {
        let de_err = serde_urlencoded::from_str::<Vec<(u32, u32)>>("a=b").unwrap_err();
        let err: Error = de_err.into();
        assert!(matches!(err.kind, ErrorKind::InvalidTokenResponse(_)));
    }
}
