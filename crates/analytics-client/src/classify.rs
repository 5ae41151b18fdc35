//! Translation of non-success responses into typed errors.
//!
//! 400, 401 and 403 responses carry an OAuth problem report as a url-encoded
//! body:
//!
//! ```text
//! oauth_problem=timestamp_refused&oauth_acceptable_timestamps=1700000000-1700000600
//! ```
//!
//! The `oauth_problem` token selects the [`AuthorizationReason`]. Anything
//! that cannot be interpreted degrades to [`ErrorKind::UnexpectedResponse`].

use crate::error::{AuthorizationReason, Error, ErrorKind, TimestampWindow};

/// Key carrying the problem token in an error document.
pub const PROBLEM_KEY: &str = "oauth_problem";

/// Key carrying the acceptable timestamp range for `timestamp_refused`.
pub const ACCEPTABLE_TIMESTAMPS_KEY: &str = "oauth_acceptable_timestamps";

/// Request details the classifier needs besides the response itself.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    /// Absolute URI of the request.
    pub uri: &'a str,
    /// Whether the request was signed with a token pair.
    pub signed_with_token: bool,
}

/// Returns true for the statuses the executor treats as success.
pub fn is_success_status(status: u16) -> bool {
    matches!(status, 200 | 204)
}

/// Map a non-success status and its body to exactly one error.
///
/// Never fails: an unreadable body degrades to an unexpected-response error.
pub fn classify(status: u16, body: &[u8], context: &RequestContext<'_>) -> Error {
    let text = String::from_utf8_lossy(body);

    let kind = match status {
        400 | 401 | 403 => match parse_problem(&text) {
            Some((problem, timestamps)) => {
                problem_kind(&problem, timestamps.as_deref(), context.signed_with_token)
            }
            None => ErrorKind::UnexpectedResponse {
                status,
                body: text.into_owned(),
            },
        },
        404 => ErrorKind::NotFound {
            uri: context.uri.to_string(),
        },
        405 => ErrorKind::MethodNotAllowed {
            uri: context.uri.to_string(),
        },
        500 => ErrorKind::InternalServer,
        _ => ErrorKind::UnexpectedResponse {
            status,
            body: text.into_owned(),
        },
    };

    Error::new(kind)
}

/// Extract the problem token and optional timestamp window from an error
/// document. `None` if the body is not a key/value document or carries no
/// problem.
fn parse_problem(body: &str) -> Option<(String, Option<String>)> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body.trim()).ok()?;

    let mut problem = None;
    let mut timestamps = None;
    for (key, value) in pairs {
        match key.as_str() {
            PROBLEM_KEY | "problem" if problem.is_none() => problem = Some(value),
            ACCEPTABLE_TIMESTAMPS_KEY => timestamps = Some(value),
            _ => {}
        }
    }

    let problem = problem.filter(|p| !p.trim().is_empty())?;
    Some((problem.trim().to_string(), timestamps))
}

/// Map a problem token to its error kind.
pub fn problem_kind(problem: &str, timestamps: Option<&str>, signed_with_token: bool) -> ErrorKind {
    use AuthorizationReason::*;

    let reason = match problem {
        "missing_consumer" | "invalid_consumer" | "consumer_key_unknown"
        | "consumer_key_rejected" => ConsumerKeyUnknown,
        "invalid_signature" | "signature_invalid" => {
            if signed_with_token {
                TokenInvalid
            } else {
                ConsumerSecretInvalid
            }
        }
        "domain_expired" => DomainExpired,
        "missing_token" | "invalid_token" | "token_rejected" | "token_revoked" => TokenInvalid,
        "unauthorized_token" => TokenUnauthorized,
        "token_expired" => TokenExpired,
        "missing_credentials" | "invalid_credentials" | "permission_denied" => {
            UserCredentialsInvalid
        }
        "account_locked" | "user_not_active" => AccountLocked,
        "domain_restricted" => DomainMismatch,
        "timestamp_refused" => {
            return ErrorKind::InvalidTimestamp {
                window: timestamps.and_then(TimestampWindow::parse),
            };
        }
        other => Other(other.to_string()),
    };

    ErrorKind::Authorization(reason)
}
