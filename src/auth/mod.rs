//! Client-side session and authorization
//!
//! Data flows store -> claims -> session -> guard. Writes flow back through
//! [`SessionState`] operations only.

pub mod claims;
pub mod guard;
pub mod models;
pub mod session;
pub mod store;

pub use claims::ClaimsDecoder;
pub use guard::{AuthorizationGuard, GuardState};
pub use models::{AuthorizationDecision, Identity, LoginResponse, Route, RouteAccess};
pub use session::{IdentityStream, LogNavigator, Navigator, SessionState};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
