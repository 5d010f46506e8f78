//! Data models for EduConnect entities.
//!
//! - `Token`: the opaque bearer credential issued at login
//! - `UserProfile`: the transient profile shown on the dashboard
//! - `Material`, `NewMaterial`: uploaded study resources
//! - Request/response bodies for the user endpoints

pub mod material;
pub mod user;

pub use material::{Material, MaterialSource, NewMaterial, Uploader, DEFAULT_SUBJECT, SUBJECTS};
pub use user::{
    LoginRequest, LoginResponse, MeResponse, MessageResponse, RegisterRequest, Token, UserProfile,
};
