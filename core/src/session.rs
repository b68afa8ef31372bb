//! Session store: who is logged in, backed by the cookie-session auth API.
//!
//! # States
//! `Unauthenticated` → (`init`) → `Checking` → `Authenticated(user)` or back
//! to `Unauthenticated`. `login`/`register` move to `Authenticated` on
//! success and leave the state alone on failure. `logout` always ends in
//! `Unauthenticated`, whatever the server says.
//!
//! # Concurrency
//! The store is `Sync` and meant to be shared. `login` and `register` share
//! one in-flight flag: a second credential call made while one is still
//! outstanding fails fast with `SessionError::InFlight`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::auth::AuthClient;
use crate::error::{ApiError, SessionError};
use crate::http::HttpRequest;
use crate::transport::Transport;
use crate::types::{Credentials, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Checking,
    Authenticated(User),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

pub struct SessionStore<T> {
    client: AuthClient,
    transport: T,
    state: RwLock<SessionState>,
    in_flight: AtomicBool,
}

impl<T: Transport> SessionStore<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            client: AuthClient::new(base_url),
            transport,
            state: RwLock::new(SessionState::Unauthenticated),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state(), SessionState::Authenticated(_))
    }

    /// Ask the server whether the cookie jar holds a live session.
    pub fn init(&self) -> SessionState {
        self.set_state(SessionState::Checking);
        let request = self.client.build_check_session();
        let result = self
            .transport
            .execute(request)
            .map_err(|e| e.to_string())
            .and_then(|response| self.client.parse_check_session(response).map_err(|e| e.to_string()));

        let next = match result {
            Ok(Some(user)) => {
                info!(username = %user.username, "session restored");
                SessionState::Authenticated(user)
            }
            Ok(None) => {
                debug!("no active session");
                SessionState::Unauthenticated
            }
            Err(error) => {
                warn!(error = %error, "session check failed");
                SessionState::Unauthenticated
            }
        };
        self.set_state(next.clone());
        next
    }

    pub fn login(&self, username: &str, password: &str) -> Result<User, SessionError> {
        self.submit("login", username, password, AuthClient::build_login)
    }

    pub fn register(&self, username: &str, password: &str) -> Result<User, SessionError> {
        self.submit("register", username, password, AuthClient::build_register)
    }

    /// Best-effort server logout. Local state is cleared regardless.
    pub fn logout(&self) {
        let request = self.client.build_logout();
        let result = self
            .transport
            .execute(request)
            .map_err(|e| e.to_string())
            .and_then(|response| self.client.parse_logout(response).map_err(|e| e.to_string()));
        if let Err(error) = result {
            warn!(error = %error, "remote logout failed; clearing local session anyway");
        }
        self.set_state(SessionState::Unauthenticated);
        info!("logged out");
    }

    fn submit(
        &self,
        action: &'static str,
        username: &str,
        password: &str,
        build: fn(&AuthClient, &Credentials) -> Result<HttpRequest, ApiError>,
    ) -> Result<User, SessionError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or_else(|| {
            warn!(action, "credential request already in flight");
            SessionError::InFlight
        })?;

        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let request = build(&self.client, &credentials)?;
        let response = self.transport.execute(request)?;
        let user = match self.client.parse_credentials(response, username) {
            Ok(user) => user,
            Err(error) => {
                warn!(action, username, error = %error, "credentials rejected");
                return Err(error);
            }
        };

        info!(action, username = %user.username, "authenticated");
        self.set_state(SessionState::Authenticated(user.clone()));
        Ok(user)
    }

    fn set_state(&self, next: SessionState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

/// Holds the in-flight flag for the duration of one credential call.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::thread;

    use super::*;
    use crate::error::TransportError;
    use crate::http::HttpResponse;
    use crate::transport::scripted::ScriptedTransport;

    const BASE: &str = "http://auth.test/api/auth";
    const USER: &str = r#"{"user":{"id":"1","username":"testuser"}}"#;

    fn store(transport: &ScriptedTransport) -> SessionStore<ScriptedTransport> {
        SessionStore::new(BASE, transport.clone())
    }

    #[test]
    fn starts_unauthenticated() {
        let s = store(&ScriptedTransport::new());
        assert_eq!(s.state(), SessionState::Unauthenticated);
        assert!(s.user().is_none());
    }

    #[test]
    fn init_restores_session_from_cookie() {
        let transport = ScriptedTransport::new();
        transport.respond("/check-session", 200, USER);
        let s = store(&transport);
        let state = s.init();
        assert_eq!(state.user().map(|u| u.username.as_str()), Some("testuser"));
        assert!(s.is_authenticated());
    }

    #[test]
    fn numeric_ids_still_authenticate() {
        let numeric = r#"{"user":{"id":17,"username":"testuser"}}"#;
        let transport = ScriptedTransport::new();
        transport.respond("/check-session", 200, numeric).respond("/login", 200, numeric);
        let s = store(&transport);
        assert_eq!(s.init().user().and_then(|u| u.id.as_deref()), Some("17"));
        s.logout();
        let user = s.login("testuser", "password123").unwrap();
        assert_eq!(user.id.as_deref(), Some("17"));
        assert!(s.is_authenticated());
    }

    #[test]
    fn login_with_empty_success_body_authenticates_as_submitted_user() {
        let transport = ScriptedTransport::new();
        transport.respond("/login", 200, "");
        let s = store(&transport);
        let user = s.login("testuser", "password123").unwrap();
        assert_eq!(user.username, "testuser");
        assert!(user.id.is_none());
        assert!(s.is_authenticated());
    }

    #[test]
    fn init_without_user_is_unauthenticated() {
        let transport = ScriptedTransport::new();
        transport.respond("/check-session", 200, r#"{"user":null}"#);
        assert_eq!(store(&transport).init(), SessionState::Unauthenticated);
    }

    #[test]
    fn init_failure_is_unauthenticated() {
        let transport = ScriptedTransport::new();
        transport.fail("/check-session");
        assert_eq!(store(&transport).init(), SessionState::Unauthenticated);

        let transport = ScriptedTransport::new();
        transport.respond("/check-session", 401, r#"{"message":"Unauthorized"}"#);
        assert_eq!(store(&transport).init(), SessionState::Unauthenticated);
    }

    #[test]
    fn login_success_authenticates() {
        let transport = ScriptedTransport::new();
        transport.respond("/login", 200, USER);
        let s = store(&transport);
        let user = s.login("testuser", "password123").unwrap();
        assert_eq!(user.username, "testuser");
        assert!(s.is_authenticated());

        let sent = &transport.requests()[0];
        assert!(sent.path.ends_with("/api/auth/login"));
        let body: serde_json::Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["username"], "testuser");
    }

    #[test]
    fn login_rejection_keeps_state_and_returns_payload() {
        let transport = ScriptedTransport::new();
        transport.respond("/login", 401, r#"{"message":"Invalid credentials"}"#);
        let s = store(&transport);
        let err = s.login("testuser", "wrong").unwrap_err();
        match err {
            SessionError::Rejected(payload) => assert_eq!(payload["message"], "Invalid credentials"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(s.state(), SessionState::Unauthenticated);
    }

    #[test]
    fn login_transport_error_propagates() {
        let transport = ScriptedTransport::new();
        transport.fail("/login");
        let err = store(&transport).login("testuser", "pw").unwrap_err();
        assert!(matches!(err, SessionError::Transport(_)));
    }

    #[test]
    fn register_success_authenticates() {
        let transport = ScriptedTransport::new();
        transport.respond("/register", 201, r#"{"user":{"id":"7","username":"newbie"}}"#);
        let s = store(&transport);
        let user = s.register("newbie", "pw").unwrap();
        assert_eq!(user.id.as_deref(), Some("7"));
        assert!(s.is_authenticated());
    }

    #[test]
    fn register_conflict_is_rejected() {
        let transport = ScriptedTransport::new();
        transport.respond("/register", 409, r#"{"message":"Username already exists"}"#);
        let err = store(&transport).register("taken", "pw").unwrap_err();
        assert!(matches!(err, SessionError::Rejected(_)));
    }

    #[test]
    fn logout_clears_session_even_when_remote_fails() {
        let transport = ScriptedTransport::new();
        transport.respond("/login", 200, USER).fail("/logout");
        let s = store(&transport);
        s.login("testuser", "password123").unwrap();
        s.logout();
        assert_eq!(s.state(), SessionState::Unauthenticated);
    }

    #[test]
    fn logout_clears_session_on_server_error() {
        let transport = ScriptedTransport::new();
        transport.respond("/login", 200, USER).respond("/logout", 500, "");
        let s = store(&transport);
        s.login("testuser", "password123").unwrap();
        s.logout();
        assert!(!s.is_authenticated());
    }

    /// Blocks inside `execute` until the test releases it.
    struct GateTransport {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl Transport for GateTransport {
        fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.entered.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
            Ok(HttpResponse::new(200, USER))
        }
    }

    #[test]
    fn second_credential_call_while_in_flight_is_refused() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let store = Arc::new(SessionStore::new(
            BASE,
            GateTransport {
                entered: Mutex::new(entered_tx),
                release: Mutex::new(release_rx),
            },
        ));

        let first = {
            let store = Arc::clone(&store);
            thread::spawn(move || store.login("testuser", "password123"))
        };
        entered_rx.recv().unwrap();

        let err = store.register("testuser", "password123").unwrap_err();
        assert!(matches!(err, SessionError::InFlight));

        release_tx.send(()).unwrap();
        assert!(first.join().unwrap().is_ok());
        assert!(store.is_authenticated());

        // The guard is released, so a later call goes through.
        release_tx.send(()).unwrap();
        assert!(store.login("testuser", "password123").is_ok());
    }
}
