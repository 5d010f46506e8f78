use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use educonnect_core::utils::truncate_string;

use crate::app::App;
use crate::ui::styles;

/// Width of the title column in the materials list
const TITLE_WIDTH: usize = 28;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_material_list(frame, app, chunks[0]);
    render_material_detail(frame, app, chunks[1]);
}

fn render_material_list(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.materials;
    let block = Block::default()
        .title(format!(" Materials ({}) ", view.materials.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let notice = if view.is_loading() && view.materials.is_empty() {
        Some(Line::from(Span::styled(" Loading resources...", styles::muted_style())))
    } else if let Some(ref error) = view.error {
        Some(Line::from(Span::styled(format!(" {}", error), styles::error_style())))
    } else if view.materials.is_empty() {
        Some(Line::from(Span::styled(
            " No materials found. Be the first to upload!",
            styles::muted_style(),
        )))
    } else {
        None
    };

    if let Some(line) = notice {
        let paragraph = Paragraph::new(line).block(block).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = view
        .materials
        .iter()
        .enumerate()
        .map(|(i, material)| {
            let line = Line::from(format!(
                "{:<width$} {}",
                truncate_string(&material.title, TITLE_WIDTH),
                material.subject,
                width = TITLE_WIDTH
            ));
            let style = if i == view.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let list = List::new(items).block(block);
    let mut state = ListState::default();
    state.select(Some(view.selection));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_material_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let Some(material) = app.materials.selected() else {
        frame.render_widget(block, area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(material.title.clone(), styles::title_style())),
        Line::from(Span::styled(material.subject.clone(), styles::highlight_style())),
        Line::from(""),
    ];

    if !material.description.is_empty() {
        lines.push(Line::from(material.description.clone()));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::styled("Uploaded by: ", styles::muted_style()),
        Span::raw(material.uploader_name().to_string()),
    ]));
    let created = material.created_display();
    if !created.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Date: ", styles::muted_style()),
            Span::raw(created),
        ]));
    }

    lines.push(Line::from(""));
    match app.selected_material_link() {
        Some(link) => lines.push(Line::from(vec![
            Span::styled("Open: ", styles::muted_style()),
            Span::styled(link, styles::success_style()),
        ])),
        None => lines.push(Line::from(Span::styled(
            "No file or link attached",
            styles::muted_style(),
        ))),
    }

    let paragraph = Paragraph::new(lines)
        .block(block.title(" Details ").title_style(styles::title_style()))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
