use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, AppState, SettingsField};
use crate::ui::styles::Palette;

use super::input_line;

pub fn render(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let form = &app.settings;
    let editing = app.state == AppState::EditingSettings;
    let focused = |field: SettingsField| editing && form.focus == field;

    let save_label = if form.saving { "Saving..." } else { "Save" };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Profile", p.highlight())),
        input_line(p, "Username", &form.username, focused(SettingsField::Username), form.saving),
        input_line(p, "Email", &form.email, focused(SettingsField::Email), form.saving),
        Line::from(""),
        Line::from(vec![
            Span::raw("              "),
            Span::styled(
                format!("  {}  ", save_label),
                p.button(focused(SettingsField::Save), form.saving || !editing),
            ),
        ]),
        Line::from(""),
    ];

    if editing {
        lines.push(Line::from(vec![
            Span::styled("  [Tab]", p.help_key()),
            Span::styled(" next field   ", p.muted()),
            Span::styled("[Enter]", p.help_key()),
            Span::styled(" save   ", p.muted()),
            Span::styled("[Esc]", p.help_key()),
            Span::styled(" stop editing", p.muted()),
        ]));
    } else {
        lines.push(Line::from(vec![
            Span::styled("  [e]", p.help_key()),
            Span::styled(" edit profile", p.muted()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  Connection", p.highlight())));
    lines.push(Line::from(vec![
        Span::styled("     Backend: ", p.muted()),
        Span::styled(app.config.backend_url.clone(), p.text()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("       Theme: ", p.muted()),
        Span::styled(app.theme.as_str(), p.text()),
        Span::styled("  [t] toggle", p.muted()),
    ]));

    let block = Block::default()
        .title(" Settings ")
        .title_style(p.title())
        .borders(Borders::ALL)
        .border_style(p.border(editing));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
