use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::AuthController;
use crate::models::{LoginRequest, LoginResponse};
use crate::nav::{Navigator, View, Visit};

pub const LOGIN_FAILED: &str = "Login failed";
pub const LOGIN_NETWORK_ERROR: &str = "Something went wrong";
pub const LOGIN_FIELDS_REQUIRED: &str = "Email and password are required.";

/// The entry view.
#[derive(Debug, Default)]
pub struct LoginView {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
    pending: Option<Visit>,
}

impl LoginView {
    pub fn new(email: Option<String>) -> Self {
        Self {
            email: email.unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    /// Validate the form. Returns the request to send, or `None` if the form
    /// is incomplete or a login is already in flight.
    pub fn begin_submit(&mut self, nav: &impl Navigator) -> Option<(Visit, LoginRequest)> {
        if self.pending.is_some() {
            return None;
        }
        self.error = None;

        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            self.error = Some(LOGIN_FIELDS_REQUIRED.to_string());
            return None;
        }

        let visit = nav.visit();
        self.pending = Some(visit);
        Some((
            visit,
            LoginRequest {
                email: email.to_string(),
                password: self.password.clone(),
            },
        ))
    }

    /// Apply the login response. Returns true if a session was established.
    pub fn finish_submit(
        &mut self,
        visit: Visit,
        result: Result<LoginResponse, ApiError>,
        auth: &mut AuthController,
        nav: &mut impl Navigator,
    ) -> bool {
        if self.pending == Some(visit) {
            self.pending = None;
        }
        let on_screen = nav.is_current(visit);

        match result {
            Ok(response) => match auth.login_succeeded(&response.token) {
                Ok(()) => {
                    info!("Login successful");
                    self.password.clear();
                    if on_screen {
                        nav.navigate(View::Dashboard);
                    }
                    true
                }
                Err(e) => {
                    warn!(error = %e, "Failed to persist session");
                    if on_screen {
                        self.error = Some(format!("Could not save session: {}", e));
                    }
                    false
                }
            },
            Err(e) => {
                warn!(error = %e, "Login failed");
                if on_screen {
                    self.error = Some(e.display_message(LOGIN_FAILED, LOGIN_NETWORK_ERROR));
                }
                false
            }
        }
    }

    pub async fn submit(
        &mut self,
        api: &ApiClient,
        auth: &mut AuthController,
        nav: &mut impl Navigator,
    ) -> bool {
        let Some((visit, request)) = self.begin_submit(&*nav) else {
            return false;
        };
        let result = api.login(&request).await;
        self.finish_submit(visit, result, auth, nav)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::StatusCode;

    use super::*;
    use crate::auth::{AuthState, MemoryStorage};
    use crate::models::Token;
    use crate::nav::Router;

    fn unauthenticated() -> AuthController {
        AuthController::new(Arc::new(MemoryStorage::new().open_context()))
    }

    fn filled() -> LoginView {
        LoginView {
            email: " ada@example.com ".to_string(),
            password: "hunter2".to_string(),
            ..LoginView::default()
        }
    }

    #[test]
    fn test_missing_fields_send_nothing() {
        let router = Router::new(View::Login);
        let mut view = LoginView::new(Some("ada@example.com".to_string()));
        assert!(view.begin_submit(&router).is_none());
        assert_eq!(view.error.as_deref(), Some(LOGIN_FIELDS_REQUIRED));
        assert!(!view.is_submitting());
    }

    #[test]
    fn test_begin_submit_trims_email() {
        let router = Router::new(View::Login);
        let mut view = filled();
        let (_, request) = view.begin_submit(&router).expect("valid form");
        assert_eq!(request.email, "ada@example.com");
        assert_eq!(request.password, "hunter2");
        assert!(view.is_submitting());
        assert!(view.begin_submit(&router).is_none());
    }

    #[test]
    fn test_success_stores_token_and_navigates_once() {
        let mut auth = unauthenticated();
        let mut router = Router::new(View::Login);
        let mut view = filled();
        let (visit, _) = view.begin_submit(&router).expect("valid form");

        let response = LoginResponse {
            token: Token::new("abc"),
            message: None,
        };
        assert!(view.finish_submit(visit, Ok(response), &mut auth, &mut router));

        assert_eq!(auth.state(), AuthState::Authenticated);
        assert_eq!(auth.token(), Some(Token::new("abc")));
        assert_eq!(router.current(), View::Dashboard);
        assert_eq!(router.history(), &[View::Login, View::Dashboard]);
        assert!(view.password.is_empty());
    }

    #[test]
    fn test_rejected_credentials_show_server_message() {
        let mut auth = unauthenticated();
        let mut router = Router::new(View::Login);
        let mut view = filled();
        let (visit, _) = view.begin_submit(&router).expect("valid form");

        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"message":"Invalid credentials"}"#);
        assert!(!view.finish_submit(visit, Err(err), &mut auth, &mut router));
        assert_eq!(view.error.as_deref(), Some("Invalid credentials"));
        assert_eq!(router.current(), View::Login);
        assert!(!view.is_submitting());
    }

    #[test]
    fn test_failure_without_message_uses_fallback() {
        let mut auth = unauthenticated();
        let mut router = Router::new(View::Login);
        let mut view = filled();
        let (visit, _) = view.begin_submit(&router).expect("valid form");

        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "");
        view.finish_submit(visit, Err(err), &mut auth, &mut router);
        assert_eq!(view.error.as_deref(), Some(LOGIN_FAILED));
    }

    #[test]
    fn test_late_success_keeps_session_but_not_navigation() {
        let mut auth = unauthenticated();
        let mut router = Router::new(View::Login);
        let mut view = filled();
        let (visit, _) = view.begin_submit(&router).expect("valid form");
        router.navigate(View::Materials);

        let response = LoginResponse {
            token: Token::new("abc"),
            message: None,
        };
        assert!(view.finish_submit(visit, Ok(response), &mut auth, &mut router));
        assert!(auth.is_authenticated());
        assert_eq!(router.current(), View::Materials);
    }
}
