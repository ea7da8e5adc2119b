//! Session state: the one authoritative "current identity" value
//!
//! `SessionState` owns the in-memory identity and is the only writer of it.
//! Every transition is pushed synchronously into each subscriber's queue
//! before the transition call returns, so a subscriber sees every value in
//! order. Publications are not deduplicated.

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::auth::claims::ClaimsDecoder;
use crate::auth::models::{Identity, LoginResponse, Route};
use crate::auth::store::TokenStore;
use crate::config::{Config, RoutesConfig};

/// Receives the "go to login" signal raised by logout
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &Route);
}

/// Navigator that only records the request in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &Route) {
        info!("Navigation requested to {}", route);
    }
}

/// Subscription to identity changes.
///
/// Yields the value current at subscription time first, then one item per
/// transition. An item of `None` means logged out.
#[derive(Debug)]
pub struct IdentityStream {
    rx: mpsc::UnboundedReceiver<Option<Identity>>,
}

impl IdentityStream {
    /// Next queued value without waiting; `None` when nothing is queued
    pub fn try_next(&mut self) -> Option<Option<Identity>> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next value; `None` once the session has been dropped
    pub async fn next(&mut self) -> Option<Option<Identity>> {
        self.rx.recv().await
    }

    /// Everything queued so far
    pub fn drain(&mut self) -> Vec<Option<Identity>> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

struct Inner {
    store: Arc<dyn TokenStore>,
    decoder: ClaimsDecoder,
    navigator: Arc<dyn Navigator>,
    login_route: Route,
    current: RwLock<Option<Identity>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<Option<Identity>>>>,
}

/// Shared handle to the application's session. Clones share one state.
#[derive(Clone)]
pub struct SessionState {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Same lock order as publish: subscribers, then current
        let subscribers = self.inner.subscribers.lock().len();
        let current = self.inner.current.read().clone();
        f.debug_struct("SessionState")
            .field("current", &current)
            .field("subscribers", &subscribers)
            .finish()
    }
}

impl SessionState {
    /// Create a session initialized from whatever token the store holds.
    ///
    /// Expiry is not checked here: an expired token still yields its identity.
    pub fn new(store: Arc<dyn TokenStore>, decoder: ClaimsDecoder) -> Self {
        Self::with_navigator(
            store,
            decoder,
            RoutesConfig::default().login_route(),
            Arc::new(LogNavigator),
        )
    }

    pub fn with_navigator(
        store: Arc<dyn TokenStore>,
        decoder: ClaimsDecoder,
        login_route: Route,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let initial = decoder.decode(store.current().as_deref());
        debug!("Session initialized, logged in: {}", initial.is_some());

        Self {
            inner: Arc::new(Inner {
                store,
                decoder,
                navigator,
                login_route,
                current: RwLock::new(initial),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn from_config(
        config: &Config,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::with_navigator(
            store,
            ClaimsDecoder::from_config(&config.claims),
            config.routes.login_route(),
            navigator,
        )
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.inner.current.read().clone()
    }

    /// Subscribe to identity changes, starting with the current value
    pub fn observe(&self) -> IdentityStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut subscribers = self.inner.subscribers.lock();
        // Receiver is alive, send cannot fail
        let _ = tx.send(self.inner.current.read().clone());
        subscribers.push(tx);
        IdentityStream { rx }
    }

    /// Store the token and publish its decoded identity
    pub fn apply_login(&self, token: &str) {
        self.inner.store.save(token);
        let identity = self.inner.decoder.decode(Some(token));
        match &identity {
            Some(id) => info!("Logged in as {}", id.user_name),
            None => info!("Login token stored but could not be decoded"),
        }
        self.publish(identity);
    }

    /// Apply the response of a login or registration call.
    ///
    /// Only a 2xx response with a non-empty `token` changes state. Returns
    /// whether a login was applied.
    pub fn apply_login_response(&self, status: u16, body: &str) -> bool {
        if !(200..300).contains(&status) {
            debug!("Ignoring login response with status {}", status);
            return false;
        }
        match serde_json::from_str::<LoginResponse>(body) {
            Ok(response) if !response.token.is_empty() => {
                self.apply_login(&response.token);
                true
            }
            Ok(_) => {
                debug!("Ignoring login response with empty token");
                false
            }
            Err(e) => {
                debug!("Ignoring malformed login response: {}", e);
                false
            }
        }
    }

    /// Drop the token, publish logged-out, then ask for the login view
    pub fn apply_logout(&self) {
        self.inner.store.clear();
        info!("Logged out");
        self.publish(None);
        self.inner.navigator.navigate(&self.inner.login_route);
    }

    /// Recompute from the stored token and publish, changed or not
    pub fn refresh(&self) {
        let identity = self
            .inner
            .decoder
            .decode(self.inner.store.current().as_deref());
        debug!("Session refreshed, logged in: {}", identity.is_some());
        self.publish(identity);
    }

    /// Raw stored token, for expiry checks
    pub fn token(&self) -> Option<String> {
        self.inner.store.current()
    }

    pub fn decoder(&self) -> &ClaimsDecoder {
        &self.inner.decoder
    }

    pub fn login_route(&self) -> &Route {
        &self.inner.login_route
    }

    /// Live subscribers as of the last publication
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    fn publish(&self, identity: Option<Identity>) {
        let mut subscribers = self.inner.subscribers.lock();
        *self.inner.current.write() = identity.clone();
        subscribers.retain(|tx| tx.send(identity.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryTokenStore;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn token(name: &str, role: &str) -> String {
        let body = serde_json::json!({
            "nameidentifier": "1",
            "name": name,
            "role": role,
            "GroupId": "2",
            "exp": 4102444800i64
        });
        format!("h.{}.s", URL_SAFE_NO_PAD.encode(body.to_string()))
    }

    fn session() -> (Arc<MemoryTokenStore>, SessionState) {
        let store = Arc::new(MemoryTokenStore::new());
        let session = SessionState::new(store.clone(), ClaimsDecoder::new());
        (store, session)
    }

    #[test]
    fn test_starts_from_stored_token() {
        let store = Arc::new(MemoryTokenStore::with_token(token("Dana", "Admin")));
        let session = SessionState::new(store, ClaimsDecoder::new());
        assert_eq!(session.current_identity().unwrap().user_name, "Dana");
    }

    #[test]
    fn test_login_then_logout() {
        let (store, session) = session();
        assert!(session.current_identity().is_none());

        session.apply_login(&token("Dana", "Admin"));
        assert!(session.current_identity().unwrap().is_admin);
        assert!(store.current().is_some());

        session.apply_logout();
        assert!(session.current_identity().is_none());
        assert!(store.current().is_none());
    }

    #[test]
    fn test_subscriber_sees_every_publication() {
        let (_store, session) = session();
        let mut stream = session.observe();

        session.refresh();
        session.refresh();

        assert_eq!(stream.drain(), vec![None, None, None]);
    }

    #[test]
    fn test_debug_while_publishing() {
        let (_store, session) = session();
        let (done_tx, done_rx) = std::sync::mpsc::channel();

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let session = session.clone();
                let done_tx = done_tx.clone();
                std::thread::spawn(move || {
                    for _ in 0..2000 {
                        if i % 2 == 0 {
                            session.refresh();
                        } else {
                            let _ = format!("{:?}", session);
                        }
                    }
                    let _ = done_tx.send(());
                })
            })
            .collect();

        for _ in 0..workers.len() {
            done_rx
                .recv_timeout(std::time::Duration::from_secs(10))
                .expect("Debug and refresh should not block each other");
        }
        for worker in workers {
            worker.join().unwrap();
        }
    }

    #[test]
    fn test_default_login_route_matches_route_table() {
        let (_store, session) = session();
        assert_eq!(session.login_route(), &RoutesConfig::default().login_route());
    }

    #[test]
    fn test_dropped_subscriber_pruned() {
        let (_store, session) = session();
        let stream = session.observe();
        let _kept = session.observe();
        assert_eq!(session.subscriber_count(), 2);

        drop(stream);
        session.refresh();
        assert_eq!(session.subscriber_count(), 1);
    }

    #[test]
    fn test_login_response_requires_success() {
        let (_store, session) = session();
        let body = serde_json::json!({ "token": token("Dana", "User") }).to_string();

        assert!(!session.apply_login_response(401, &body));
        assert!(!session.apply_login_response(200, "{}"));
        assert!(!session.apply_login_response(200, r#"{"token":""}"#));
        assert!(!session.apply_login_response(200, "<html>"));
        assert!(session.current_identity().is_none());

        assert!(session.apply_login_response(201, &body));
        assert_eq!(session.current_identity().unwrap().user_name, "Dana");
    }
}
