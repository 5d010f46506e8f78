//! The authenticated/unauthenticated state machine.
//!
//! State is optimistic: a stored token counts as valid until a protected
//! request is rejected. Every path into `Unauthenticated` clears the store
//! and moves the user off protected views.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::Token;
use crate::nav::{Navigator, View};

use super::store::{SessionStore, StoreError, TokenWatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

/// Triggers of auth state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// This context received a token from `POST /api/users/login`.
    LoginSucceeded,
    /// Explicit logout in this context.
    LoggedOut,
    /// A protected request came back 401/403.
    TokenRejected,
    /// Another context stored a token.
    ExternalSet,
    /// Another context removed the token.
    ExternalCleared,
}

impl AuthState {
    pub fn apply(self, event: AuthEvent) -> AuthState {
        match event {
            AuthEvent::LoginSucceeded | AuthEvent::ExternalSet => AuthState::Authenticated,
            AuthEvent::LoggedOut | AuthEvent::TokenRejected | AuthEvent::ExternalCleared => {
                AuthState::Unauthenticated
            }
        }
    }
}

pub struct AuthController {
    store: Arc<dyn SessionStore>,
    watcher: TokenWatcher,
    state: AuthState,
}

impl AuthController {
    /// Start `Authenticated` iff the store already holds a token. The token is
    /// not checked with the server here.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let watcher = store.subscribe();
        let state = if store.get().is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        };
        info!(?state, "Auth state initialised from session store");
        Self {
            store,
            watcher,
            state,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    /// The credential to attach to a protected request, read from the store.
    pub fn token(&self) -> Option<Token> {
        self.store.get()
    }

    /// Persist a freshly issued token and become `Authenticated`. Navigation
    /// after login belongs to the login view.
    pub fn login_succeeded(&mut self, token: &Token) -> Result<(), StoreError> {
        self.store.set(token)?;
        self.transition(AuthEvent::LoginSucceeded);
        Ok(())
    }

    /// Clear the session and go to the entry view, from any view and in any
    /// state.
    pub fn logout(&mut self, nav: &mut impl Navigator) {
        self.clear_store();
        self.transition(AuthEvent::LoggedOut);
        nav.navigate(View::ENTRY);
    }

    /// A protected request was answered 401/403.
    pub fn reject(&mut self, nav: &mut impl Navigator) {
        self.clear_store();
        self.transition(AuthEvent::TokenRejected);
        Self::leave_protected(nav);
    }

    /// Catch up with changes made by other contexts. Pending changes are
    /// drained first and the state follows whatever the store holds now, so
    /// an old clear never removes a newer token. Returns true if any change
    /// was seen.
    pub fn sync_external(&mut self, nav: &mut impl Navigator) -> bool {
        let mut seen = 0usize;
        while self.watcher.try_next().is_some() {
            seen += 1;
        }
        if seen == 0 {
            return false;
        }
        debug!(changes = seen, "External session changes");

        if self.store.get().is_some() {
            self.transition(AuthEvent::ExternalSet);
        } else {
            self.transition(AuthEvent::ExternalCleared);
            Self::leave_protected(nav);
        }
        true
    }

    fn transition(&mut self, event: AuthEvent) {
        let from = self.state;
        let to = from.apply(event);
        self.state = to;
        info!(?from, ?to, cause = ?event, "Auth transition");
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear session store");
        }
    }

    fn leave_protected(nav: &mut impl Navigator) {
        if nav.current().is_protected() {
            nav.navigate(View::ENTRY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryStorage;
    use crate::nav::Router;

    fn controller(storage: &MemoryStorage) -> AuthController {
        AuthController::new(Arc::new(storage.open_context()))
    }

    #[test]
    fn test_transition_function() {
        use AuthEvent::*;
        use AuthState::*;

        for state in [Authenticated, Unauthenticated] {
            assert_eq!(state.apply(LoginSucceeded), Authenticated);
            assert_eq!(state.apply(ExternalSet), Authenticated);
            assert_eq!(state.apply(LoggedOut), Unauthenticated);
            assert_eq!(state.apply(TokenRejected), Unauthenticated);
            assert_eq!(state.apply(ExternalCleared), Unauthenticated);
        }
    }

    #[test]
    fn test_initial_state_follows_store() {
        let empty = MemoryStorage::new();
        assert_eq!(controller(&empty).state(), AuthState::Unauthenticated);

        let with_token = MemoryStorage::new();
        with_token
            .open_context()
            .set(&Token::new("stale"))
            .expect("seed token");
        assert_eq!(controller(&with_token).state(), AuthState::Authenticated);
    }

    #[test]
    fn test_login_persists_token() {
        let storage = MemoryStorage::new();
        let mut auth = controller(&storage);

        auth.login_succeeded(&Token::new("abc")).expect("login");
        assert!(auth.is_authenticated());
        assert_eq!(auth.token(), Some(Token::new("abc")));
    }

    #[test]
    fn test_logout_clears_and_navigates() {
        let storage = MemoryStorage::new();
        let mut auth = controller(&storage);
        let mut router = Router::new(View::Materials);
        auth.login_succeeded(&Token::new("abc")).expect("login");

        auth.logout(&mut router);
        assert_eq!(auth.state(), AuthState::Unauthenticated);
        assert_eq!(auth.token(), None);
        assert_eq!(router.current(), View::Login);
    }

    #[test]
    fn test_logout_is_idempotent() {
        let storage = MemoryStorage::new();
        let mut auth = controller(&storage);
        let mut router = Router::new(View::Register);

        auth.logout(&mut router);
        assert_eq!(auth.state(), AuthState::Unauthenticated);
        assert_eq!(router.current(), View::Login);

        let visits = router.history().len();
        auth.logout(&mut router);
        assert_eq!(auth.state(), AuthState::Unauthenticated);
        assert_eq!(router.current(), View::Login);
        assert_eq!(router.history().len(), visits + 1);
    }

    #[test]
    fn test_reject_from_any_state() {
        let storage = MemoryStorage::new();
        let mut auth = controller(&storage);
        let mut router = Router::new(View::Dashboard);
        auth.login_succeeded(&Token::new("abc")).expect("login");

        auth.reject(&mut router);
        assert_eq!(auth.state(), AuthState::Unauthenticated);
        assert_eq!(auth.token(), None);
        assert_eq!(router.current(), View::Login);

        // Already unauthenticated and on a public view: stays put
        let mut router = Router::new(View::Materials);
        auth.reject(&mut router);
        assert_eq!(auth.state(), AuthState::Unauthenticated);
        assert_eq!(router.current(), View::Materials);
    }

    #[test]
    fn test_cross_context_logout() {
        let storage = MemoryStorage::new();
        let mut tab_a = controller(&storage);
        tab_a.login_succeeded(&Token::new("abc")).expect("login");
        let mut tab_b = controller(&storage);
        assert!(tab_b.is_authenticated());

        let mut router_a = Router::new(View::Materials);
        let mut router_b = Router::new(View::Upload);

        tab_a.logout(&mut router_a);
        assert!(!tab_a.sync_external(&mut router_a));

        assert!(tab_b.sync_external(&mut router_b));
        assert_eq!(tab_b.state(), AuthState::Unauthenticated);
        assert_eq!(router_b.current(), View::Login);
        assert_eq!(tab_b.token(), None);
    }

    #[test]
    fn test_stale_clear_keeps_newer_login() {
        let storage = MemoryStorage::new();
        let mut tab_a = controller(&storage);
        let mut tab_b = controller(&storage);
        let mut tab_c = controller(&storage);
        let mut router_a = Router::new(View::Materials);
        let mut router_b = Router::new(View::Materials);
        let mut router_c = Router::new(View::Materials);

        tab_b.login_succeeded(&Token::new("old")).expect("login");
        tab_b.logout(&mut router_b);
        tab_c.login_succeeded(&Token::new("new")).expect("login");
        router_c.navigate(View::Dashboard);

        assert!(tab_a.sync_external(&mut router_a));
        assert!(tab_a.is_authenticated());
        assert_eq!(tab_a.token(), Some(Token::new("new")));

        assert!(tab_c.sync_external(&mut router_c));
        assert!(tab_c.is_authenticated());
        assert_eq!(router_c.current(), View::Dashboard);
        assert_eq!(tab_c.token(), Some(Token::new("new")));

        assert!(tab_b.sync_external(&mut router_b));
        assert!(tab_b.is_authenticated());
    }

    #[test]
    fn test_cross_context_login() {
        let storage = MemoryStorage::new();
        let mut tab_a = controller(&storage);
        let mut tab_b = controller(&storage);
        let mut router_b = Router::new(View::Materials);

        tab_a.login_succeeded(&Token::new("abc")).expect("login");
        assert!(tab_b.sync_external(&mut router_b));
        assert!(tab_b.is_authenticated());
        assert_eq!(router_b.current(), View::Materials);
    }
}
