use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{MessageResponse, RegisterRequest};
use crate::nav::{Navigator, View, Visit};

use super::REDIRECT_DELAY;

pub const REGISTER_FAILED: &str = "Registration failed";
pub const REGISTER_NETWORK_ERROR: &str = "A network error occurred. Please try again.";
pub const REGISTER_FIELDS_REQUIRED: &str = "Name, email and password are required.";

#[derive(Debug, Default)]
pub struct RegisterView {
    pub name: String,
    pub email: String,
    pub password: String,
    pub error: Option<String>,
    pub success: Option<String>,
    pending: Option<Visit>,
}

impl RegisterView {
    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop messages from a previous visit; the form keeps its contents.
    pub fn reset_messages(&mut self) {
        self.error = None;
        self.success = None;
    }

    pub fn begin_submit(&mut self, nav: &impl Navigator) -> Option<(Visit, RegisterRequest)> {
        if self.pending.is_some() {
            return None;
        }
        self.reset_messages();

        let name = self.name.trim();
        let email = self.email.trim();
        if name.is_empty() || email.is_empty() || self.password.is_empty() {
            self.error = Some(REGISTER_FIELDS_REQUIRED.to_string());
            return None;
        }

        let visit = nav.visit();
        self.pending = Some(visit);
        Some((
            visit,
            RegisterRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: self.password.clone(),
            },
        ))
    }

    /// On success shows the server's message, clears the form and sends the
    /// user to the login view after a short pause.
    pub fn finish_submit(
        &mut self,
        visit: Visit,
        result: Result<MessageResponse, ApiError>,
        nav: &mut impl Navigator,
    ) -> bool {
        if self.pending == Some(visit) {
            self.pending = None;
        }
        let on_screen = nav.is_current(visit);

        match result {
            Ok(response) => {
                info!("Registration successful");
                if on_screen {
                    self.success = response.message;
                    self.name.clear();
                    self.email.clear();
                    self.password.clear();
                    nav.schedule(View::Login, REDIRECT_DELAY);
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                if on_screen {
                    self.error = Some(e.display_message(REGISTER_FAILED, REGISTER_NETWORK_ERROR));
                }
                false
            }
        }
    }

    pub async fn submit(&mut self, api: &ApiClient, nav: &mut impl Navigator) -> bool {
        let Some((visit, request)) = self.begin_submit(&*nav) else {
            return false;
        };
        let result = api.register(&request).await;
        self.finish_submit(visit, result, nav)
    }
}
