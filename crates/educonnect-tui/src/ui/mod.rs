//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, header and overlays
//! - `input`: keyboard event handling
//! - `styles`: colors and text styling
//! - `screens`: one renderer per view

pub mod input;
pub mod render;
pub mod screens;
pub mod styles;
