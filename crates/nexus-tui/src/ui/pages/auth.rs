use nexus_core::state::{AuthMode, FormField};
use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles::Palette;

use super::input_line;

pub fn render(frame: &mut Frame, app: &App, p: &Palette) {
    let form = &app.auth_form;
    let submitting = form.is_submitting();

    let mut height = if form.mode == AuthMode::Register { 13 } else { 12 };
    if form.error().is_some() || app.status_message.is_some() {
        height += 2;
    }
    let area = centered_rect_fixed(50, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("  Nexus Explorer", p.title())),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(" Login ", p.nav_item(form.mode == AuthMode::Login)),
            Span::styled(" | ", p.muted()),
            Span::styled(" Register ", p.nav_item(form.mode == AuthMode::Register)),
            Span::styled("   [F2] switch", p.muted()),
        ]),
        Line::from(""),
    ];

    for field in form.fields() {
        let focused = form.focus == *field;
        match field {
            FormField::Username => {
                lines.push(input_line(p, "Username", &form.username, focused, submitting))
            }
            FormField::Email => {
                lines.push(input_line(p, "Email", &form.email, focused, submitting))
            }
            FormField::Password => {
                let masked = "*".repeat(form.password.chars().count());
                lines.push(input_line(p, "Password", &masked, focused, submitting))
            }
            FormField::Submit => {
                let label = match (submitting, form.mode) {
                    (true, _) => "Please wait...",
                    (false, AuthMode::Login) => "Sign in",
                    (false, AuthMode::Register) => "Create account",
                };
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::raw("              "),
                    Span::styled(format!("  {}  ", label), p.button(focused, submitting)),
                ]));
            }
        }
    }

    if let Some(error) = form.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), p.error())));
    } else if let Some(message) = &app.status_message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", message), p.muted())));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(p.border(true))
        .style(p.base());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
