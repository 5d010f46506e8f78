use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, RegisterField};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

use super::{button_line, error_line, field_line, hint_line, masked, success_line};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.register;
    let focus = app.register_focus;
    let has_message = view.error.is_some() || view.success.is_some();
    let height = if has_message { 13 } else { 11 };
    let area = centered_rect_fixed(56, height, area);
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(""),
        field_line("Name", &view.name, focus == RegisterField::Name),
        field_line("Email", &view.email, focus == RegisterField::Email),
        field_line("Password", &masked(&view.password), focus == RegisterField::Password),
        Line::from(""),
    ];

    let label = if view.is_submitting() { "Registering..." } else { "Register" };
    lines.push(button_line(label, focus == RegisterField::Submit));

    if let Some(ref success) = view.success {
        lines.push(Line::from(""));
        lines.push(success_line(success));
    } else if let Some(ref error) = view.error {
        lines.push(Line::from(""));
        lines.push(error_line(error));
    }

    lines.push(Line::from(""));
    lines.push(hint_line("Already registered? Press Ctrl+L to log in."));

    let block = Block::default()
        .title(" Register ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
