use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles::Palette;

use super::input_line;

const COPIED: &str = "Copied";
const COPY_HINT: &str = "[c] copy";

pub fn render(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let block = Block::default()
        .title(format!(" API Keys ({}) ", app.keys.len()))
        .title_style(p.title())
        .borders(Borders::ALL)
        .border_style(p.border(!app.dialog.is_open()));

    if app.keys.is_empty() {
        let message = if app.keys_loading {
            "  Loading..."
        } else {
            "  No API keys yet. Press [n] to create one."
        };
        let lines = vec![Line::from(""), Line::from(Span::styled(message, p.muted()))];
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let header = Row::new([
        Cell::from("Key"),
        Cell::from("Label"),
        Cell::from("Usage"),
        Cell::from(""),
    ])
    .style(p.title())
    .height(1);

    let rows: Vec<Row> = app
        .keys
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let copied = app.copy.is_confirmed(&record.key);
            let action = if copied {
                Span::styled(COPIED, p.success())
            } else if i == app.key_selection {
                Span::styled(COPY_HINT, p.muted())
            } else {
                Span::raw("")
            };

            Row::new(vec![
                Cell::from(record.key.clone()),
                Cell::from(record.display_label().to_string()),
                Cell::from(record.usage_count.to_string()),
                Cell::from(action),
            ])
            .style(p.text())
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Length(20),
        Constraint::Length(8),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(p.selected());

    let mut state = TableState::default();
    state.select(Some(app.key_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

pub fn render_create_dialog(frame: &mut Frame, app: &App, p: &Palette) {
    let dialog = &app.dialog;
    let creating = dialog.is_creating();

    let height = if dialog.error.is_some() { 10 } else { 8 };
    let area = centered_rect_fixed(48, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(""),
        input_line(p, "Label", &dialog.label, true, creating),
        Line::from(Span::styled("               optional", p.muted())),
        Line::from(""),
    ];

    if creating {
        lines.push(Line::from(Span::styled("  Creating...", p.highlight())));
    } else {
        lines.push(Line::from(vec![
            Span::styled("  [Enter]", p.help_key()),
            Span::styled(" Create   ", p.muted()),
            Span::styled("[Esc]", p.help_key()),
            Span::styled(" Cancel", p.muted()),
        ]));
    }

    if let Some(error) = &dialog.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), p.error())));
    }

    let block = Block::default()
        .title(" Create API Key ")
        .title_style(p.title())
        .borders(Borders::ALL)
        .border_style(p.border(true))
        .style(p.base());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
