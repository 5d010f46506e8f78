//! Per-view rendering. Forms share the field helpers below.

pub mod dashboard;
pub mod login;
pub mod materials;
pub mod register;
pub mod upload;

use ratatui::text::{Line, Span};

use educonnect_core::views::{Flash, FlashKind};

use super::styles;

/// Width of the value column in form fields
const FIELD_WIDTH: usize = 32;

/// A labelled single-line input. Long values show their tail.
pub fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let len = value.chars().count();
    let visible: String = if len > FIELD_WIDTH {
        value.chars().skip(len - FIELD_WIDTH).collect()
    } else {
        value.to_string()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::styled(format!("  {:>12}: [", label), styles::muted_style()),
        Span::styled(
            format!("{}{:<width$}", visible, cursor, width = FIELD_WIDTH + 1 - visible.chars().count()),
            styles::field_style(focused),
        ),
        Span::styled("]", styles::muted_style()),
    ])
}

pub fn masked(value: &str) -> String {
    "*".repeat(value.chars().count())
}

/// A choice cycled with the arrow keys.
pub fn choice_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let (open, close) = if focused { ("◀ ", " ▶") } else { ("  ", "  ") };
    Line::from(vec![
        Span::styled(format!("  {:>12}: ", label), styles::muted_style()),
        Span::styled(format!("{}{}{}", open, value, close), styles::field_style(focused)),
    ])
}

pub fn button_line(label: &str, focused: bool) -> Line<'static> {
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    Line::from(vec![
        Span::raw("                ["),
        Span::styled(text, styles::field_style(focused)),
        Span::raw("]"),
    ])
}

pub fn error_line(message: &str) -> Line<'static> {
    Line::from(Span::styled(format!("  {}", message), styles::error_style()))
}

pub fn success_line(message: &str) -> Line<'static> {
    Line::from(Span::styled(format!("  {}", message), styles::success_style()))
}

pub fn flash_line(flash: &Flash) -> Line<'static> {
    match flash.kind {
        FlashKind::Success => success_line(&flash.text),
        FlashKind::Error => error_line(&flash.text),
    }
}

pub fn hint_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(format!("  {}", text), styles::muted_style()))
}
