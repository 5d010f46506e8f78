use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Dashboard ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let lines = match app.dashboard.user() {
        None => vec![
            Line::from(""),
            Line::from(Span::styled("  Loading user data...", styles::muted_style())),
        ],
        Some(user) => {
            let mut lines = vec![
                Line::from(""),
                Line::from(vec![
                    Span::raw("  Welcome, "),
                    Span::styled(user.name.clone(), styles::highlight_style()),
                    Span::raw("!"),
                ]),
            ];
            if let Some(ref email) = user.email {
                lines.push(Line::from(Span::styled(
                    format!("  Signed in as {}", email),
                    styles::muted_style(),
                )));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("  Ctrl+B ", styles::help_key_style()),
                Span::raw("browse the shared study materials"),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  Ctrl+U ", styles::help_key_style()),
                Span::raw("upload notes, slides or a useful link"),
            ]));
            lines
        }
    };

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
