use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use educonnect_core::views::{ResourceKind, UploadField};

use crate::app::App;
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

use super::{button_line, choice_line, field_line, flash_line, hint_line};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.upload;
    let focus = view.focus;
    let height = if view.flash.is_some() { 15 } else { 13 };
    let area = centered_rect_fixed(60, height, area);
    frame.render_widget(Clear, area);

    let (source_label, source_value) = match view.kind {
        ResourceKind::File => ("File path", view.file_path.as_str()),
        ResourceKind::Link => ("URL", view.url.as_str()),
    };

    let mut lines = vec![
        Line::from(""),
        field_line("Title", &view.title, focus == UploadField::Title),
        choice_line("Subject", view.subject(), focus == UploadField::Subject),
        field_line("Description", &view.description, focus == UploadField::Description),
        choice_line("Type", view.kind.label(), focus == UploadField::Kind),
        field_line(source_label, source_value, focus == UploadField::Source),
        Line::from(""),
    ];

    let label = if view.is_submitting() { "Uploading..." } else { "Upload" };
    lines.push(button_line(label, focus == UploadField::Submit));

    if let Some(ref flash) = view.flash {
        lines.push(Line::from(""));
        lines.push(flash_line(flash));
    }

    lines.push(Line::from(""));
    lines.push(hint_line("Tab moves between fields, ←/→ changes a choice."));

    let block = Block::default()
        .title(" Upload New Material ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
