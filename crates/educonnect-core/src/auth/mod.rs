//! Authentication module for managing the client session.
//!
//! This module provides:
//! - `SessionStore`: the persisted credential token, shared across instances
//! - `AuthController`: the authenticated/unauthenticated state machine
//! - `RouteGate`: access checks for protected views
//!
//! No expiry is tracked client-side; a token is valid until the server says
//! otherwise.

pub mod controller;
pub mod gate;
pub mod store;

pub use controller::{AuthController, AuthEvent, AuthState};
pub use gate::RouteGate;
pub use store::{
    FileSessionStore, MemorySessionStore, MemoryStorage, SessionStore, StoreError, TokenChange,
    TokenWatcher, SYNC_POLL_INTERVAL,
};
