//! # analytics-auth
//!
//! OAuth 1.0a credentials and request signing for the Ridgeline analytics API.
//!
//! ## Security
//!
//! - Consumer secrets and token secrets are redacted in Debug output
//! - Persisted sessions never contain the consumer secret
//! - Nonces are drawn from an OS-seeded CSPRNG, never from a counter
//!
//! ## Example
//!
//! ```rust
//! use ridgeline_analytics_auth::Credentials;
//! use url::Url;
//!
//! let creds = Credentials::new("consumer-key", "consumer-secret");
//! creds.set_token("access-token", "access-secret");
//!
//! let url = Url::parse("https://analytics.example.com/api/reports").unwrap();
//! let header = creds
//!     .create_signer()
//!     .authorization_header("GET", &url, &[], &[])
//!     .unwrap();
//! assert!(header.starts_with("OAuth "));
//! ```

mod credentials;
mod error;
mod signer;
mod storage;
mod token;

pub use credentials::{Credentials, TokenPair};
pub use error::{Error, ErrorKind, Result};
pub use signer::{encode, Signer, OAUTH_VERSION, SIGNATURE_METHOD};
pub use storage::{default_token_dir, FileTokenStorage, SessionSnapshot, TokenStorage};
pub use token::TokenResponse;
