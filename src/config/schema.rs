//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::auth::models::{Route, RouteAccess};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub routes: RoutesConfig,

    #[serde(default)]
    pub claims: ClaimsConfig,
}

/// Durable token storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory standing in for the client's durable storage area
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,

    /// The one key the token is stored under
    #[serde(default = "default_token_key")]
    pub token_key: String,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./.caseguard")
}

fn default_token_key() -> String {
    "token".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            token_key: default_token_key(),
        }
    }
}

/// Route table used by the authorization guard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    #[serde(default = "default_login_route")]
    pub login: String,

    #[serde(default = "default_dashboard_route")]
    pub dashboard: String,

    /// Routes that require an authenticated admin
    #[serde(default = "default_admin_routes")]
    pub admin: Vec<String>,

    /// Routes that require any authenticated user
    #[serde(default = "default_authenticated_routes")]
    pub authenticated: Vec<String>,
}

fn default_login_route() -> String {
    "/login".to_string()
}

fn default_dashboard_route() -> String {
    "/dashboard".to_string()
}

fn default_admin_routes() -> Vec<String> {
    vec!["/users".to_string(), "/users/new".to_string()]
}

fn default_authenticated_routes() -> Vec<String> {
    vec![
        "/dashboard".to_string(),
        "/folders".to_string(),
        "/clients".to_string(),
        "/profile".to_string(),
    ]
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            login: default_login_route(),
            dashboard: default_dashboard_route(),
            admin: default_admin_routes(),
            authenticated: default_authenticated_routes(),
        }
    }
}

impl RoutesConfig {
    pub fn login_route(&self) -> Route {
        Route::new(&self.login, RouteAccess::Public)
    }

    pub fn dashboard_route(&self) -> Route {
        Route::new(&self.dashboard, self.access_for(&self.dashboard))
    }

    /// Access level for a path. Admin listing wins over authenticated listing.
    pub fn access_for(&self, path: &str) -> RouteAccess {
        let path = normalize_path(path);
        if self.admin.iter().any(|p| normalize_path(p) == path) {
            RouteAccess::Admin
        } else if self.authenticated.iter().any(|p| normalize_path(p) == path) {
            RouteAccess::Authenticated
        } else {
            RouteAccess::Public
        }
    }

    /// Resolve a path into a route carrying its configured access level
    pub fn resolve(&self, path: &str) -> Route {
        Route::new(path, self.access_for(path))
    }
}

fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Claim interpretation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimsConfig {
    /// Role claim value that marks an admin; compared case-sensitively
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
}

fn default_admin_role() -> String {
    "Admin".to_string()
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            admin_role: default_admin_role(),
        }
    }
}

impl Config {
    /// Full path of the stored token file
    pub fn token_path(&self) -> PathBuf {
        self.storage.dir.join(&self.storage.token_key)
    }
}
