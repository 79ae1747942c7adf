use nexus_core::StatsView;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles::Palette;

/// Shown while the first fetch is in flight
const LOADING: &str = "...";

/// Shown when stats could not be loaded
const UNAVAILABLE: &str = "-";

pub fn render(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let greeting = Line::from(vec![
        Span::styled("  Welcome back, ", p.text()),
        Span::styled(app.username(), p.highlight()),
    ]);
    frame.render_widget(Paragraph::new(vec![Line::from(""), greeting]), chunks[0]);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let (usage, keys) = stat_values(app.stats);
    render_card(frame, p, cards[0], "Total API usage", &usage);
    render_card(frame, p, cards[1], "API keys", &keys);
}

/// Display strings for the usage and key-count cards
fn stat_values(view: StatsView) -> (String, String) {
    match view {
        StatsView::Loading => (LOADING.to_string(), LOADING.to_string()),
        StatsView::Loaded(stats) => (stats.total_usage.to_string(), stats.total_keys.to_string()),
        StatsView::Unavailable => (UNAVAILABLE.to_string(), UNAVAILABLE.to_string()),
    }
}

fn render_card(frame: &mut Frame, p: &Palette, area: Rect, title: &str, value: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(p.border(false))
        .title(Span::styled(format!(" {} ", title), p.muted()));

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", value), p.big_number())),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::models::Stats;

    #[test]
    fn test_stat_values_loading() {
        assert_eq!(stat_values(StatsView::Loading), ("...".to_string(), "...".to_string()));
    }

    #[test]
    fn test_stat_values_loaded() {
        let view = StatsView::Loaded(Stats {
            total_keys: 2,
            total_usage: 40,
        });
        assert_eq!(stat_values(view), ("40".to_string(), "2".to_string()));
    }

    #[test]
    fn test_stat_values_unavailable() {
        assert_eq!(stat_values(StatsView::Unavailable), ("-".to_string(), "-".to_string()));
    }
}
