//! Caseguard - client-side session and route authorization
//!
//! Holds the bearer token issued by the case-management API, derives the
//! current identity from its claims without a server round-trip, publishes
//! that identity to subscribers and gates protected views on it.

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;

pub use auth::{AuthorizationGuard, ClaimsDecoder, Identity, SessionState, TokenStore};
pub use config::Config;
pub use error::Error;
