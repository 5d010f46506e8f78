use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use educonnect_core::nav::View;

use crate::app::{App, AppState};

use super::screens::{dashboard, login, materials, register, upload};
use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(10),   // Current view
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

/// Navigation links offered for the current auth state.
fn nav_links(authenticated: bool) -> Vec<(&'static str, Option<View>)> {
    if authenticated {
        vec![
            ("^D Dashboard", Some(View::Dashboard)),
            ("^B Browse Materials", Some(View::Materials)),
            ("^U Upload New", Some(View::Upload)),
            ("^O Logout", None),
        ]
    } else {
        vec![
            ("^B Browse Materials", Some(View::Materials)),
            ("^L Login", Some(View::Login)),
            ("^R Register", Some(View::Register)),
        ]
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  EduConnect";
    let current = app.current_view();

    let mut link_spans = Vec::new();
    for (i, (label, view)) in nav_links(app.is_authenticated()).into_iter().enumerate() {
        if i > 0 {
            link_spans.push(Span::styled(" | ", styles::muted_style()));
        }
        link_spans.push(Span::styled(label, styles::nav_style(view == Some(current))));
    }

    let links_width: usize = link_spans.iter().map(|s| s.content.chars().count()).sum();
    let padding = (area.width as usize).saturating_sub(title.len() + links_width + 2);

    let mut spans = vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(padding)),
    ];
    spans.extend(link_spans);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_view() {
        View::Login => login::render(frame, app, area),
        View::Register => register::render(frame, app, area),
        View::Dashboard => dashboard::render(frame, app, area),
        View::Materials => materials::render(frame, app, area),
        View::Upload => upload::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[F1] help | [Esc] quit";

    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None => format!(" {} ", app.current_view().title()),
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 22, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  EduConnect", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("Ctrl+D", "Dashboard"),
        help_line("Ctrl+B", "Browse materials"),
        help_line("Ctrl+U", "Upload new material"),
        help_line("Ctrl+L", "Login"),
        help_line("Ctrl+R", "Register"),
        help_line("Ctrl+O", "Logout"),
        Line::from(""),
        Line::from(Span::styled(" Forms and lists", styles::highlight_style())),
        help_line("Tab/S-Tab", "Next/previous field"),
        help_line("Enter", "Submit"),
        help_line("←/→", "Change subject or resource type"),
        help_line("↑/↓", "Select material"),
        help_line("r", "Reload materials"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("F1", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
