//! View controllers: one per screen.
//!
//! Each controller owns its form or list state and performs a single
//! request/response cycle against the API. Requests are split in two so the
//! caller can run the network call wherever it likes:
//!
//! - `begin_*` validates input and returns what to send, tagged with the
//!   current [`Visit`](crate::nav::Visit)
//! - `finish_*` applies the response; responses for a visit that is no longer
//!   on screen change no view state
//!
//! The async `submit`/`load` helpers do both halves inline.

pub mod dashboard;
pub mod login;
pub mod materials;
pub mod register;
pub mod upload;

use std::time::{Duration, Instant};

pub use dashboard::DashboardView;
pub use login::LoginView;
pub use materials::MaterialsView;
pub use register::RegisterView;
pub use upload::{ResourceKind, UploadField, UploadView};

/// Pause between a success message and the follow-up redirect.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// How long a flash message stays up.
pub const FLASH_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

/// A transient status message.
#[derive(Debug, Clone, PartialEq)]
pub struct Flash {
    pub text: String,
    pub kind: FlashKind,
    shown_at: Instant,
}

impl Flash {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: FlashKind::Success,
            shown_at: Instant::now(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: FlashKind::Error,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= FLASH_DURATION
    }
}
