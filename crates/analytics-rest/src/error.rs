//! Error types for analytics-rest.
//!
//! Collections surface the request pipeline's errors unchanged, so the
//! client crate's types are shared rather than wrapped.

pub use ridgeline_analytics_client::{AuthorizationReason, Error, ErrorKind, Result};
