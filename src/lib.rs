//! # ridgeline-analytics
//!
//! Client library for the Ridgeline analytics and reporting API.
//!
//! Requests are signed with OAuth 1.0a (HMAC-SHA1); list endpoints are
//! exposed as cached or paginated collections of typed elements.
//!
//! ## Security
//!
//! - Consumer and token secrets are redacted in Debug output
//! - Tracing spans skip credentials and verifiers
//! - Error messages redact token, signature and verifier values
//!
//! ## Crates
//!
//! - **ridgeline-analytics-auth** - Credentials, token pairs, request signing, session storage
//! - **ridgeline-analytics-client** - Signed request executor, error classification, retry
//! - **ridgeline-analytics-rest** - Cached and paginated collections, handshake, shared registry
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ridgeline_analytics::{AnalyticsClient, ElementParser};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // RIDGELINE_BASE_URL, RIDGELINE_CONSUMER_KEY, RIDGELINE_CONSUMER_SECRET,
//!     // RIDGELINE_TOKEN, RIDGELINE_TOKEN_SECRET
//!     let client = AnalyticsClient::from_env()?;
//!
//!     let mut reports = client.new_paginated::<serde_json::Value>(
//!         "reports",
//!         "reports",
//!         ElementParser::deserialize(),
//!     );
//!     reports.load_size(50).await?;
//!
//!     for report in reports.items() {
//!         println!("{}", report["name"]);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
#[cfg(feature = "auth")]
pub use ridgeline_analytics_auth as auth;
#[cfg(feature = "client")]
pub use ridgeline_analytics_client as client;
#[cfg(feature = "rest")]
pub use ridgeline_analytics_rest as rest;

// Re-export commonly used types at the top level
#[cfg(feature = "auth")]
pub use ridgeline_analytics_auth::{Credentials, SessionSnapshot, TokenPair};
#[cfg(feature = "client")]
pub use ridgeline_analytics_client::{
    AuthorizationReason, ClientConfig, Error, ErrorKind, Executor, Result, RetryConfig,
};
#[cfg(feature = "rest")]
pub use ridgeline_analytics_rest::{
    AnalyticsClient, CachedCollection, ElementParser, Identifiable, PaginatedCollection,
};
