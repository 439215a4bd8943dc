use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use strum::IntoEnumIterator;

use super::app::{App, InputMode};
use crate::internal::filters::FILTER_SECTIONS;
use crate::internal::models::{Category, FetchState, ImageHit};
use crate::internal::notification::NotificationType;

const ACCENT: Color = Color::Cyan;
const MUTED: Color = Color::DarkGray;

#[tracing::instrument(skip(app, f))]
pub fn draw(app: &mut App, f: &mut Frame) {
    let has_filters = !app.feed.state().active_filters().is_empty();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(if has_filters { 1 } else { 0 }),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(app, f, chunks[0]);
    render_search_bar(app, f, chunks[1]);
    render_categories(app, f, chunks[2]);
    if has_filters {
        render_filter_chips(app, f, chunks[3]);
    }
    render_results(app, f, chunks[4]);
    render_status_bar(app, f, chunks[5]);

    if app.filter_modal.is_visible() {
        render_filter_modal(app, f);
    }

    if app.notification.is_some() {
        render_notification(app, f);
    }
}

fn render_header(app: &App, f: &mut Frame, area: Rect) {
    let state = app.feed.state();
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let title = Paragraph::new(Span::styled(
        "Pix",
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    ));
    let summary = Paragraph::new(format!(
        "page {} · {} images",
        state.page(),
        state.items().len()
    ))
    .alignment(Alignment::Right)
    .style(Style::default().fg(MUTED));

    f.render_widget(title, halves[0]);
    f.render_widget(summary, halves[1]);
}

fn render_search_bar(app: &App, f: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Search;
    let line = match (editing, app.feed.state().search_text()) {
        (true, _) => Line::from(format!("{}█", app.search_input)),
        (false, "") => Line::from(Span::styled(
            "Search for photos...  (/)",
            Style::default().fg(MUTED),
        )),
        (false, text) => Line::from(text.to_string()),
    };

    let border = match editing {
        true => Style::default().fg(ACCENT),
        false => Style::default().fg(MUTED),
    };

    let search = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(" Search "),
    );
    f.render_widget(search, area);
}

/// Category chips, shifted so the active one stays on screen.
fn render_categories(app: &App, f: &mut Frame, area: Rect) {
    let active = app.feed.state().active_category();
    let categories: Vec<Category> = Category::iter().collect();
    let skip = active
        .and_then(|c| categories.iter().position(|&other| other == c))
        .map_or(0, |i| i.saturating_sub(2));

    let mut spans = Vec::new();
    for category in categories.into_iter().skip(skip) {
        let style = match Some(category) == active {
            true => Style::default()
                .fg(Color::Black)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
            false => Style::default().fg(Color::Gray),
        };
        spans.push(Span::styled(format!(" {} ", category), style));
        spans.push(Span::raw(" "));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_filter_chips(app: &App, f: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled("Filters: ", Style::default().fg(MUTED))];
    for (key, value) in app.feed.state().active_filters() {
        spans.push(Span::styled(
            format!(" {}: {} ✕ ", key, value),
            Style::default().fg(Color::Black).bg(Color::Gray),
        ));
        spans.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn hit_line(hit: &ImageHit) -> Line<'static> {
    let shape = match hit.aspect_ratio() {
        Some(r) if r > 1.05 => "▭",
        Some(r) if r < 0.95 => "▯",
        Some(_) => "□",
        None => " ",
    };

    Line::from(vec![
        Span::styled(format!("{:>9} ", hit.id), Style::default().fg(MUTED)),
        Span::raw(format!("{} {:>5}x{:<5} ", shape, hit.image_width, hit.image_height)),
        Span::styled(
            hit.tags.clone().unwrap_or_default(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "  by {}  ♥ {}",
                hit.user.as_deref().unwrap_or("unknown"),
                hit.likes.unwrap_or(0)
            ),
            Style::default().fg(MUTED),
        ),
    ])
}

fn render_results(app: &mut App, f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED))
        .title(" Images ");
    app.viewport_rows = block.inner(area).height;

    let items = app.feed.state().items();
    if items.is_empty() {
        let message = match app.feed.status() {
            FetchState::Fetching => format!("{} Loading images...", app.get_spinner_char()),
            FetchState::Failed(_) => "Nothing to show (r to retry)".to_string(),
            _ => "No images found".to_string(),
        };
        let empty = Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(MUTED))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let list_items: Vec<ListItem> = items.iter().map(|hit| ListItem::new(hit_line(hit))).collect();
    let list = List::new(list_items).block(block).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    f.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_status_bar(app: &App, f: &mut Frame, area: Rect) {
    let (text, style) = match app.feed.status() {
        FetchState::Fetching => (
            format!("{} Loading page {}...", app.get_spinner_char(), app.feed.state().page()),
            Style::default().fg(ACCENT),
        ),
        FetchState::Failed(failure) => (
            format!("Failed ({}): {} (r to retry)", failure.trigger, failure.error),
            Style::default().fg(Color::Red),
        ),
        FetchState::Idle | FetchState::Loaded => {
            let hints = match app.input_mode {
                InputMode::Search => "Enter search now · Ctrl-u clear · Esc done",
                InputMode::Filters => "j/k section · h/l option · Space pick · Enter apply · R reset · Esc cancel",
                InputMode::Normal => "/ search · Tab category · f filters · x drop filter · Enter open · q quit",
            };
            (hints.to_string(), Style::default().fg(MUTED))
        }
    };

    f.render_widget(Paragraph::new(text).style(style), area);
}

fn render_filter_modal(app: &App, f: &mut Frame) {
    let area = f.area();
    let width = 64.min(area.width.saturating_sub(4));
    let height = (FILTER_SECTIONS.len() as u16 * 2 + 3).min(area.height);
    let popup_area = Rect::new(
        area.width.saturating_sub(width) / 2,
        area.height.saturating_sub(height),
        width,
        height,
    );

    let (cursor_section, cursor_option) = app.filter_modal.cursor();
    let draft = app.filter_modal.draft();

    let mut lines = Vec::new();
    for (si, section) in FILTER_SECTIONS.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            section.label,
            Style::default().add_modifier(Modifier::BOLD),
        )));

        let mut spans = vec![Span::raw("  ")];
        for (oi, option) in section.options.iter().enumerate() {
            let selected = draft
                .and_then(|d| d.get(section.key))
                .is_some_and(|v| v == option);
            let mut style = match selected {
                true => Style::default().fg(Color::Black).bg(ACCENT),
                false => Style::default().fg(Color::Gray),
            };
            if (si, oi) == (cursor_section, cursor_option) {
                style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
            }
            spans.push(Span::styled(format!(" {} ", option), style));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    let modal = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT))
            .title(" Filters "),
    );

    f.render_widget(Clear, popup_area);
    f.render_widget(modal, popup_area);
}

fn render_notification(app: &App, f: &mut Frame) {
    if let Some(notification) = &app.notification {
        let area = f.area();

        let popup_width = (notification.message.chars().count() as u16 + 4)
            .min(area.width.saturating_sub(4));
        let popup_height = 3;

        let popup_x = (area.width.saturating_sub(popup_width)) / 2;
        let popup_y = (area.height.saturating_sub(popup_height)) / 2;

        let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

        let (bg_color, title) = match notification.notification_type {
            NotificationType::Info => (Color::Blue, "Info"),
            NotificationType::Warning => (Color::Yellow, "Warning"),
            NotificationType::Error => (Color::Red, "Error"),
        };

        let popup = Paragraph::new(notification.message.as_str())
            .style(
                Style::default()
                    .bg(bg_color)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL).title(title))
            .alignment(Alignment::Center);

        f.render_widget(Clear, popup_area);
        f.render_widget(popup, popup_area);
    }
}
