//! Authentication models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed projection of a token's identity claims.
///
/// Never persisted on its own; always rebuilt from the stored token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Subject id; `None` when the claim is missing or not numeric
    pub user_id: Option<i64>,
    pub user_name: String,
    /// Empty when the token carries no email claim
    pub email: String,
    pub is_admin: bool,
    /// Group (tenant) id; `None` when the claim is missing or not numeric
    pub group_id: Option<i64>,
}

/// Success body of the login and registration endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Access level required to enter a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteAccess {
    /// Anyone may enter
    Public,
    /// Requires a present, unexpired token
    Authenticated,
    /// Requires a present, unexpired token whose identity is admin
    Admin,
}

impl fmt::Display for RouteAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteAccess::Public => write!(f, "public"),
            RouteAccess::Authenticated => write!(f, "authenticated"),
            RouteAccess::Admin => write!(f, "admin"),
        }
    }
}

/// A navigable view identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub path: String,
    pub access: RouteAccess,
}

impl Route {
    pub fn new(path: impl Into<String>, access: RouteAccess) -> Self {
        Self {
            path: path.into(),
            access,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Outcome of a single navigation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationDecision {
    pub allowed: bool,
    pub redirect_target: Option<Route>,
}

impl AuthorizationDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            redirect_target: None,
        }
    }

    pub fn redirect(target: Route) -> Self {
        Self {
            allowed: false,
            redirect_target: Some(target),
        }
    }
}
