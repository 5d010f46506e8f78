//! REST API client module for the EduConnect server.
//!
//! This module provides the `ApiClient` for registering, logging in,
//! fetching the current profile and listing/uploading materials.
//!
//! Protected endpoints use JWT bearer token authentication; the token is
//! obtained from `POST /api/users/login`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
