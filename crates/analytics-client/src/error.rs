//! Error types for analytics-client.
//!
//! The [`ErrorKind`] set is closed: every failure the request pipeline can
//! surface maps to exactly one variant.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};

/// Result type alias for analytics-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for analytics-client operations.
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

    /// Shorthand for an [`ErrorKind::InvalidArgument`] error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument(message.into()))
    }

    /// Returns true if a caller-side retry may succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Returns true if the server rejected the request's credentials.
    pub fn is_authorization(&self) -> bool {
        matches!(self.kind, ErrorKind::Authorization(_))
    }

    /// The authorization reason, if this is an authorization failure.
    pub fn authorization_reason(&self) -> Option<&AuthorizationReason> {
        match &self.kind {
            ErrorKind::Authorization(reason) => Some(reason),
            _ => None,
        }
    }

    /// Returns true if this is a not-found failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound { .. })
    }
}

/// Why the server refused to authorize a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationReason {
    /// The consumer key is not known to the server.
    ConsumerKeyUnknown,
    /// The signature did not verify and no token was used, so the consumer
    /// secret is wrong.
    ConsumerSecretInvalid,
    /// The token is missing, malformed, revoked, or its secret is wrong.
    TokenInvalid,
    /// The request token has not been authorized by the user yet.
    TokenUnauthorized,
    /// The token has expired.
    TokenExpired,
    /// The customer domain has expired.
    DomainExpired,
    /// The user's credentials were rejected.
    UserCredentialsInvalid,
    /// The user account is locked or inactive.
    AccountLocked,
    /// The request was made against a domain the token is not valid for.
    DomainMismatch,
    /// Any problem token without a dedicated variant.
    Other(String),
}

impl std::fmt::Display for AuthorizationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthorizationReason::ConsumerKeyUnknown => f.write_str("consumer key unknown"),
            AuthorizationReason::ConsumerSecretInvalid => f.write_str("consumer secret invalid"),
            AuthorizationReason::TokenInvalid => f.write_str("token invalid"),
            AuthorizationReason::TokenUnauthorized => f.write_str("token unauthorized"),
            AuthorizationReason::TokenExpired => f.write_str("token expired"),
            AuthorizationReason::DomainExpired => f.write_str("domain expired"),
            AuthorizationReason::UserCredentialsInvalid => f.write_str("user credentials invalid"),
            AuthorizationReason::AccountLocked => f.write_str("account locked"),
            AuthorizationReason::DomainMismatch => f.write_str("domain mismatch"),
            AuthorizationReason::Other(problem) => write!(f, "{}", problem),
        }
    }
}

/// Range of request timestamps the server would have accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampWindow {
    /// Earliest acceptable timestamp.
    pub earliest: DateTime<Utc>,
    /// Latest acceptable timestamp.
    pub latest: DateTime<Utc>,
}

impl TimestampWindow {
    /// Parse the `"<low>-<high>"` form of `oauth_acceptable_timestamps`
    /// (seconds since the epoch).
    pub fn parse(value: &str) -> Option<Self> {
        let (low, high) = value.trim().split_once('-')?;
        let earliest = DateTime::from_timestamp(low.trim().parse().ok()?, 0)?;
        let latest = DateTime::from_timestamp(high.trim().parse().ok()?, 0)?;
        Some(Self { earliest, latest })
    }

    /// Returns true if `instant` lies inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.earliest <= instant && instant <= self.latest
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The server rejected the request's OAuth credentials.
    #[error("Authorization failed: {0}")]
    Authorization(AuthorizationReason),

    /// The request timestamp was outside the server's acceptable window.
    #[error("Timestamp refused{}", describe_window(.window))]
    InvalidTimestamp { window: Option<TimestampWindow> },

    /// Resource not found (HTTP 404).
    #[error("Not found: {uri}")]
    NotFound { uri: String },

    /// Method not allowed (HTTP 405).
    #[error("Method not allowed: {uri}")]
    MethodNotAllowed { uri: String },

    /// Internal server error (HTTP 500).
    #[error("Internal server error")]
    InternalServer,

    /// Any other non-success response, or an error body that could not be
    /// interpreted.
    #[error("Unexpected response: HTTP {status} {}", sanitize_error_message(.body))]
    UnexpectedResponse { status: u16, body: String },

    /// Transport-level failure (connect, TLS, timeout, body read).
    #[error("Connection error: {0}")]
    Connection(String),

    /// Fatal configuration problem, such as a request that cannot be signed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A successful response did not contain valid JSON.
    #[error("Invalid JSON response: {}", sanitize_error_message(.body))]
    InvalidJson { body: String },

    /// A caller passed an argument outside the accepted range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Positional access outside the loaded window of a collection.
    #[error("Index {index} out of bounds{}", describe_loaded(.loaded))]
    IndexOutOfBounds {
        index: usize,
        loaded: Option<(usize, usize)>,
    },

    /// All caller-side retry attempts failed.
    #[error("All {attempts} retry attempts exhausted")]
    RetriesExhausted { attempts: u32 },
}

impl ErrorKind {
    /// Returns true if this error kind is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ErrorKind::Connection(_) => true,
            ErrorKind::InternalServer => true,
            ErrorKind::UnexpectedResponse { status, .. } => matches!(status, 502 | 503 | 504),
            _ => false,
        }
    }
}

fn describe_window(window: &Option<TimestampWindow>) -> String {
    match window {
        Some(w) => format!(
            ", acceptable between {} and {}",
            w.earliest.to_rfc3339(),
            w.latest.to_rfc3339()
        ),
        None => String::new(),
    }
}

fn describe_loaded(loaded: &Option<(usize, usize)>) -> String {
    match loaded {
        Some((first, last)) => format!(", loaded window is {}..={}", first, last),
        None => ", nothing loaded".to_string(),
    }
}

static SECRET_PARAM: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(
        r"(oauth_(?:token_secret|token|signature|verifier|session_handle))=([^&\s,]+)",
    )
    .expect("redaction pattern is valid")
});

/// Sanitize a response body before it is displayed.
///
/// Token, signature and verifier values are redacted and the text is
/// truncated to 500 bytes. The error kind itself keeps the raw body.
pub(crate) fn sanitize_error_message(message: &str) -> String {
    const MAX_LENGTH: usize = 500;

    let mut sanitized = SECRET_PARAM
        .replace_all(message, "$1=[REDACTED]")
        .to_string();

    if sanitized.len() > MAX_LENGTH {
        let mut cut = MAX_LENGTH;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::with_source(ErrorKind::Connection(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(
            ErrorKind::Configuration(format!("Invalid URL: {}", err)),
            err,
        )
    }
}

impl From<ridgeline_analytics_auth::Error> for Error {
    fn from(err: ridgeline_analytics_auth::Error) -> Self {
        Error::with_source(ErrorKind::Configuration(err.to_string()), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_retryable() {
        assert!(Error::new(ErrorKind::Connection("refused".into())).is_retryable());
        assert!(Error::new(ErrorKind::InternalServer).is_retryable());
        assert!(Error::new(ErrorKind::UnexpectedResponse {
            status: 503,
            body: String::new(),
        })
        .is_retryable());

        assert!(!Error::new(ErrorKind::UnexpectedResponse {
            status: 409,
            body: String::new(),
        })
        .is_retryable());
        assert!(!Error::new(ErrorKind::Authorization(AuthorizationReason::TokenExpired))
            .is_retryable());
        assert!(!Error::new(ErrorKind::Configuration("bad".into())).is_retryable());
    }

    #[test]
    fn test_authorization_helpers() {
        let err = Error::new(ErrorKind::Authorization(AuthorizationReason::AccountLocked));
        assert!(err.is_authorization());
        assert_eq!(
            err.authorization_reason(),
            Some(&AuthorizationReason::AccountLocked)
        );

        let err = Error::new(ErrorKind::NotFound { uri: "/x".into() });
        assert!(!err.is_authorization());
        assert!(err.is_not_found());
        assert!(err.authorization_reason().is_none());
    }

    #[test]
    fn test_error_kind_display_messages() {
        let window = TimestampWindow::parse("1700000000-1700000600").unwrap();
        let cases: Vec<(ErrorKind, &str)> = vec![
            (
                ErrorKind::Authorization(AuthorizationReason::TokenExpired),
                "Authorization failed: token expired",
            ),
            (
                ErrorKind::Authorization(AuthorizationReason::Other("nonce_used".into())),
                "Authorization failed: nonce_used",
            ),
            (
                ErrorKind::InvalidTimestamp {
                    window: Some(window),
                },
                "acceptable between 2023-11-14T22:13:20+00:00",
            ),
            (ErrorKind::InvalidTimestamp { window: None }, "Timestamp refused"),
            (
                ErrorKind::NotFound {
                    uri: "https://x/api/reports/9".into(),
                },
                "Not found: https://x/api/reports/9",
            ),
            (
                ErrorKind::MethodNotAllowed { uri: "/api".into() },
                "Method not allowed: /api",
            ),
            (ErrorKind::InternalServer, "Internal server error"),
            (
                ErrorKind::UnexpectedResponse {
                    status: 418,
                    body: "teapot".into(),
                },
                "Unexpected response: HTTP 418 teapot",
            ),
            (
                ErrorKind::Connection("refused".into()),
                "Connection error: refused",
            ),
            (
                ErrorKind::Configuration("cannot sign".into()),
                "Configuration error: cannot sign",
            ),
            (
                ErrorKind::InvalidJson { body: "{".into() },
                "Invalid JSON response: {",
            ),
            (
                ErrorKind::InvalidArgument("size must be positive".into()),
                "Invalid argument: size must be positive",
            ),
            (
                ErrorKind::IndexOutOfBounds {
                    index: 3,
                    loaded: Some((10, 11)),
                },
                "Index 3 out of bounds, loaded window is 10..=11",
            ),
            (
                ErrorKind::IndexOutOfBounds {
                    index: 0,
                    loaded: None,
                },
                "nothing loaded",
            ),
            (
                ErrorKind::RetriesExhausted { attempts: 3 },
                "All 3 retry attempts exhausted",
            ),
        ];

        for (kind, expected_substring) in cases {
            let display = kind.to_string();
            assert!(
                display.contains(expected_substring),
                "Expected '{display}' to contain '{expected_substring}'"
            );
        }
    }

    #[test]
    fn test_timestamp_window_parse() {
        let window = TimestampWindow::parse("100-200").unwrap();
        assert_eq!(window.earliest.timestamp(), 100);
        assert_eq!(window.latest.timestamp(), 200);
        assert!(window.contains(DateTime::from_timestamp(150, 0).unwrap()));
        assert!(!window.contains(DateTime::from_timestamp(201, 0).unwrap()));

        assert!(TimestampWindow::parse("").is_none());
        assert!(TimestampWindow::parse("100").is_none());
        assert!(TimestampWindow::parse("abc-200").is_none());
    }

    #[test]
    fn test_sanitize_redacts_oauth_values() {
        let msg = "oauth_problem=token_rejected&oauth_token=abc123&oauth_signature=zzz%3D";
        let sanitized = sanitize_error_message(msg);
        assert!(sanitized.contains("oauth_problem=token_rejected"));
        assert!(sanitized.contains("oauth_token=[REDACTED]"));
        assert!(sanitized.contains("oauth_signature=[REDACTED]"));
        assert!(!sanitized.contains("abc123"));
    }

    #[test]
    fn test_sanitize_truncates_long_messages() {
        let long_msg = "é".repeat(400);
        let sanitized = sanitize_error_message(&long_msg);
        assert!(sanitized.ends_with("...[truncated]"));
        assert!(sanitized.len() < long_msg.len());
    }

    #[test]
    fn test_unexpected_response_keeps_raw_body() {
        let kind = ErrorKind::UnexpectedResponse {
            status: 400,
            body: "oauth_token=secret-value".into(),
        };
        assert!(!kind.to_string().contains("secret-value"));
        match kind {
            ErrorKind::UnexpectedResponse { body, .. } => assert!(body.contains("secret-value")),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_from_auth_error_is_configuration() {
        let auth_err = ridgeline_analytics_auth::Error::new(
            ridgeline_analytics_auth::ErrorKind::Signing("no host".into()),
        );
        let err: Error = auth_err.into();
        assert!(matches!(err.kind, ErrorKind::Configuration(_)));
        assert!(err.source.is_some());
    }

    #[test]
    fn test_from_url_parse_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: Error = url_err.into();
        assert!(matches!(err.kind, ErrorKind::Configuration(_)));
        assert!(err.to_string().contains("Invalid URL"));
    }
}
