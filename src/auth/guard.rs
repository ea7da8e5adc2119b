//! Route authorization
//!
//! Expiry is checked here and only here. An expired token keeps its identity
//! in the session until an explicit logout; the guard simply stops treating
//! it as authenticated.

use serde::Serialize;
use tracing::debug;

use crate::auth::models::{AuthorizationDecision, Identity, Route, RouteAccess};
use crate::auth::session::SessionState;
use crate::config::RoutesConfig;

/// Authorization view of the session at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "identity", rename_all = "lowercase")]
pub enum GuardState {
    Unauthenticated,
    Authenticated(Identity),
}

/// Decides whether a navigation may proceed
#[derive(Debug, Clone)]
pub struct AuthorizationGuard {
    session: SessionState,
    routes: RoutesConfig,
}

impl AuthorizationGuard {
    pub fn new(session: SessionState, routes: RoutesConfig) -> Self {
        Self { session, routes }
    }

    /// A token is stored and it has not expired
    pub fn is_authenticated(&self) -> bool {
        match self.session.token() {
            Some(token) => !self.session.decoder().is_expired(&token),
            None => false,
        }
    }

    /// Authenticated and the current identity carries the admin role
    pub fn is_admin(&self) -> bool {
        self.is_authenticated()
            && self
                .session
                .current_identity()
                .is_some_and(|identity| identity.is_admin)
    }

    pub fn state(&self) -> GuardState {
        match self.session.current_identity() {
            Some(identity) if self.is_authenticated() => GuardState::Authenticated(identity),
            _ => GuardState::Unauthenticated,
        }
    }

    /// Decide entry to a route.
    ///
    /// Unauthenticated visitors go to login. Authenticated non-admins asking
    /// for an admin route go to the dashboard.
    pub fn can_enter(&self, route: &Route) -> AuthorizationDecision {
        let decision = match route.access {
            RouteAccess::Public => AuthorizationDecision::allow(),
            RouteAccess::Authenticated => {
                if self.is_authenticated() {
                    AuthorizationDecision::allow()
                } else {
                    AuthorizationDecision::redirect(self.routes.login_route())
                }
            }
            RouteAccess::Admin => {
                if !self.is_authenticated() {
                    AuthorizationDecision::redirect(self.routes.login_route())
                } else if self.is_admin() {
                    AuthorizationDecision::allow()
                } else {
                    AuthorizationDecision::redirect(self.routes.dashboard_route())
                }
            }
        };

        debug!(
            "Entry to {} ({}): allowed={}",
            route, route.access, decision.allowed
        );
        decision
    }

    /// Resolve a path against the route table, then decide entry
    pub fn can_enter_path(&self, path: &str) -> AuthorizationDecision {
        self.can_enter(&self.routes.resolve(path))
    }

    pub fn routes(&self) -> &RoutesConfig {
        &self.routes
    }
}
