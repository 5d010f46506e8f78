use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, LoginField};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

use super::{button_line, error_line, field_line, hint_line, masked};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.login;
    let height = if view.error.is_some() { 12 } else { 10 };
    let area = centered_rect_fixed(56, height, area);
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(""),
        field_line("Email", &view.email, app.login_focus == LoginField::Email),
        field_line(
            "Password",
            &masked(&view.password),
            app.login_focus == LoginField::Password,
        ),
        Line::from(""),
    ];

    let label = if view.is_submitting() { "Logging in..." } else { "Login" };
    lines.push(button_line(label, app.login_focus == LoginField::Submit));

    if let Some(ref error) = view.error {
        lines.push(Line::from(""));
        lines.push(error_line(error));
    }

    lines.push(Line::from(""));
    lines.push(hint_line("No account yet? Press Ctrl+R to register."));

    let block = Block::default()
        .title(" Login ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
