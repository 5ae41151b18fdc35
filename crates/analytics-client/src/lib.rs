//! # analytics-client
//!
//! Signed HTTP request pipeline for the Ridgeline analytics API.
//!
//! This crate provides:
//! - An [`Executor`] that resolves, signs, sends and classifies requests
//! - A closed error taxonomy ([`ErrorKind`]) with OAuth problem mapping
//! - Connection pooling, compression and request/response tracing
//! - Opt-in, caller-layered retry with exponential backoff and jitter
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    analytics-rest                           │
//! │  (cached / paginated collections, session, registry)        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Executor                              │
//! │  - Resolves paths against the base URL                      │
//! │  - Signs every request from the shared Credentials          │
//! │  - Classifies non-success responses                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    analytics-auth                           │
//! │  - Consumer key/secret, token pair, HMAC-SHA1 signer        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ridgeline_analytics_auth::Credentials;
//! use ridgeline_analytics_client::{ClientConfig, Executor, RequestBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ridgeline_analytics_client::Error> {
//!     let creds = Arc::new(Credentials::from_env()?);
//!     let executor = Executor::new(
//!         "https://analytics.example.com/api",
//!         creds,
//!         ClientConfig::default(),
//!     )?;
//!
//!     let reports = executor
//!         .execute_json(RequestBuilder::get("reports").query("size", "20"))
//!         .await?;
//!     println!("{reports}");
//!     Ok(())
//! }
//! ```

mod classify;
mod config;
mod error;
mod executor;
mod request;
pub mod retry;

pub use classify::{
    classify, is_success_status, problem_kind, RequestContext, ACCEPTABLE_TIMESTAMPS_KEY,
    PROBLEM_KEY,
};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{AuthorizationReason, Error, ErrorKind, Result, TimestampWindow};
pub use executor::{parse_json, Executor};
pub use request::{MultipartPart, RequestBody, RequestBuilder, RequestMethod};
pub use retry::{retry_async, BackoffStrategy, RetryConfig, RetryPolicy};

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("ridgeline-analytics/", env!("CARGO_PKG_VERSION"));
