//! Core library for the EduConnect study-materials client.
//!
//! The interesting part of this crate is the session lifecycle:
//!
//! - [`auth::SessionStore`]: the single persisted credential token
//! - [`auth::AuthController`]: the authenticated/unauthenticated state machine
//! - [`auth::RouteGate`]: access checks for protected views
//!
//! Everything else (the API client, models and view controllers) is a thin
//! wrapper around the REST endpoints of the EduConnect server.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod nav;
pub mod utils;
pub mod views;
