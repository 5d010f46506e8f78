use tracing::debug;

use crate::api::{ApiClient, ApiError};
use crate::auth::{AuthController, RouteGate};
use crate::models::{Token, UserProfile};
use crate::nav::{Navigator, View, Visit};

/// Greeting screen for the logged-in user.
///
/// The profile is fetched on every activation and dropped when the user
/// leaves; it is never cached. Until the fetch confirms the session the view
/// only shows a loading line.
#[derive(Debug, Default)]
pub struct DashboardView {
    user: Option<UserProfile>,
    pending: Option<Visit>,
}

impl DashboardView {
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.user.is_none()
    }

    /// Enter the dashboard. Returns the profile request to issue, or `None` if
    /// the route gate turned the user away (no request is made then).
    pub fn activate(
        &mut self,
        auth: &mut AuthController,
        nav: &mut impl Navigator,
    ) -> Option<(Visit, Token)> {
        self.user = None;
        self.pending = None;

        if !RouteGate::admit(auth, View::Dashboard, nav) {
            return None;
        }
        let Some(token) = auth.token() else {
            // Cleared elsewhere before this context synced
            auth.reject(nav);
            return None;
        };

        let visit = nav.visit();
        self.pending = Some(visit);
        Some((visit, token))
    }

    /// Forget the profile when navigating away.
    pub fn deactivate(&mut self) {
        self.user = None;
        self.pending = None;
    }

    pub fn finish_fetch(
        &mut self,
        visit: Visit,
        result: Result<UserProfile, ApiError>,
        auth: &mut AuthController,
        nav: &mut impl Navigator,
    ) {
        if self.pending == Some(visit) {
            self.pending = None;
        }
        if let Some(user) = RouteGate::confirm(result, visit, auth, nav) {
            debug!("Dashboard profile confirmed");
            self.user = Some(user);
        }
    }

    pub async fn load(
        &mut self,
        api: &ApiClient,
        auth: &mut AuthController,
        nav: &mut impl Navigator,
    ) {
        let Some((visit, token)) = self.activate(auth, nav) else {
            return;
        };
        let result = api.me(&token).await;
        self.finish_fetch(visit, result, auth, nav);
    }
}
