//! Route gate for the protected views (dashboard and upload).
//!
//! Unauthenticated users never see a protected view render, and a server
//! rejection of the session during a view's fetch logs the user out.

use tracing::{debug, warn};

use crate::api::ApiError;
use crate::nav::{Navigator, View, Visit};

use super::AuthController;

/// Access checks for protected views.
///
/// `admit` runs before a view renders and trusts the local auth state.
/// `confirm` runs after a validating fetch returns and trusts the server.
pub struct RouteGate;

impl RouteGate {
    /// Returns true if `view` may render. Otherwise redirects to the entry view.
    pub fn admit(auth: &AuthController, view: View, nav: &mut impl Navigator) -> bool {
        if !view.is_protected() || auth.is_authenticated() {
            return true;
        }
        debug!(?view, "Not authenticated, redirecting to entry view");
        if nav.current() != View::ENTRY {
            nav.navigate(View::ENTRY);
        }
        false
    }

    /// Check the outcome of a fetch that a protected view needs before it can
    /// render. Returns the value only if the fetch succeeded and `visit` is
    /// still on screen.
    ///
    /// - 401/403: logout transition, even if the user has moved on.
    /// - other HTTP failure: token discarded, same redirect as a rejection.
    /// - transport failure: redirect only, the token is kept.
    pub fn confirm<T>(
        result: Result<T, ApiError>,
        visit: Visit,
        auth: &mut AuthController,
        nav: &mut impl Navigator,
    ) -> Option<T> {
        match result {
            Ok(value) if nav.is_current(visit) => Some(value),
            Ok(_) => None,
            Err(e) if e.is_transport() => {
                warn!(error = %e, view = ?visit.view, "Validation fetch failed");
                if nav.is_current(visit) {
                    nav.navigate(View::ENTRY);
                }
                None
            }
            Err(e) => {
                warn!(error = %e, view = ?visit.view, "Validation fetch rejected");
                auth.reject(nav);
                None
            }
        }
    }
}
