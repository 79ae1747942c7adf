use nexus_core::storage::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, Page};

use super::pages::{auth, dashboard, keys, settings};
use super::styles::{palette, Palette};

/// Width of the page sidebar
const SIDEBAR_WIDTH: u16 = 20;

pub fn render(frame: &mut Frame, app: &App) {
    let p = palette(app.theme);
    frame.render_widget(Block::default().style(p.base()), frame.area());

    if !app.is_authenticated() {
        auth::render(frame, app, &p);
        if matches!(app.state, AppState::ConfirmingQuit) {
            render_quit_overlay(frame, &p);
        }
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Sidebar + page
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(chunks[1]);

    render_title_bar(frame, app, &p, chunks[0]);
    render_sidebar(frame, app, &p, body[0]);
    render_page(frame, app, &p, body[1]);
    render_status_bar(frame, app, &p, chunks[2]);

    // Overlays
    if app.dialog.is_open() {
        keys::render_create_dialog(frame, app, &p);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame, &p);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let title = "  Nexus Explorer";
    let user = format!("{}  ", app.username());

    let title_line = Line::from(vec![
        Span::styled(title, p.title()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + user.len()),
        )),
        Span::styled(user, p.muted()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(p.muted());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_sidebar(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let mut lines = vec![Line::from("")];
    for (i, page) in Page::ALL.iter().enumerate() {
        let selected = *page == app.page;
        let marker = if selected { "▶ " } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(format!(" {}", marker), p.highlight()),
            Span::styled(format!("[{}] {}", i + 1, page.title()), p.nav_item(selected)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("   [t] ", p.help_key()),
        Span::styled(
            match app.theme {
                Theme::Dark => "Light mode",
                Theme::Light => "Dark mode",
            },
            p.muted(),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled("   [L] ", p.help_key()),
        Span::styled("Logout", p.muted()),
    ]));

    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(p.muted());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_page(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    match app.page {
        Page::Dashboard => dashboard::render(frame, app, p, area),
        Page::Api => keys::render(frame, app, p, area),
        Page::Settings => settings::render(frame, app, p, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let shortcuts = match app.page {
        Page::Api => "[n]ew | [c]opy | [r]efresh | [q]uit",
        Page::Settings => "[e]dit | [q]uit",
        Page::Dashboard => "[r]efresh | [q]uit",
    };

    let left_text = match &app.status_message {
        Some(msg) => format!(" {} ", msg),
        None if app.keys_loading => " Loading... ".to_string(),
        None => format!(" Keys synced {} ", app.keys_age_display()),
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, p.muted()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, p.muted()),
    ]);

    frame.render_widget(Paragraph::new(status_line).style(p.status_bar()), area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame, p: &Palette) {
    let area = centered_rect_fixed(40, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            p.highlight(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", p.muted()),
            Span::styled("[Y]", p.help_key()),
            Span::styled(" to quit, ", p.muted()),
            Span::styled("[N]", p.help_key()),
            Span::styled(" to cancel", p.muted()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(p.border(true))
        .style(p.base());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
