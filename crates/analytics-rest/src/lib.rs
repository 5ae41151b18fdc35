//! # analytics-rest
//!
//! Collections and session management for the Ridgeline analytics API.
//!
//! ## Features
//!
//! - **Cached collections** - Whole lists fetched in one request and kept until reloaded
//! - **Paginated collections** - Offset/size windows with server-authoritative paging
//! - **Element parsers** - One generic collection per entity, parsing injected per type
//! - **Session** - OAuth 1.0a handshake, snapshot/restore, keyed shared collections
//!
//! ## Example
//!
//! ```rust,ignore
//! use ridgeline_analytics_auth::Credentials;
//! use ridgeline_analytics_rest::{AnalyticsClient, ElementParser};
//!
//! #[derive(serde::Deserialize)]
//! struct Dashboard {
//!     id: String,
//!     title: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ridgeline_analytics_rest::Error> {
//!     let client = AnalyticsClient::new(
//!         "https://analytics.example.com/api",
//!         Credentials::new("consumer-key", "consumer-secret"),
//!     )?;
//!
//!     // Out-of-band handshake
//!     let request = client.request_token("oob").await?;
//!     println!("Authorize at {}", client.authorization_url(&request.oauth_token)?);
//!     let verifier = read_verifier();
//!     client.access_token(&verifier).await?;
//!
//!     let mut dashboards = client.new_cached::<Dashboard>(
//!         "dashboards",
//!         "dashboards",
//!         ElementParser::deserialize(),
//!     );
//!     dashboards.load().await?;
//!     for d in dashboards.get() {
//!         println!("{} {}", d.id, d.title);
//!     }
//!     Ok(())
//! }
//! ```

mod cached;
mod client;
mod error;
mod paginated;
mod parser;
mod registry;

pub use cached::CachedCollection;
pub use client::{AnalyticsClient, OAuthEndpoints, BASE_URL_ENV};
pub use error::{AuthorizationReason, Error, ErrorKind, Result};
pub use paginated::{Cursor, PaginatedCollection};
pub use parser::{BoxError, ElementParser, Identifiable};
pub use registry::{CollectionRegistry, Shared};
