use nexus_core::storage::Theme;
use ratatui::style::{Color, Modifier, Style};

/// Colours for one theme
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub primary: Color,
    pub success: Color,
    pub accent: Color,
    pub error: Color,
    pub muted: Color,
    pub text: Color,
    pub highlight: Color,
    pub background: Color,
    pub bar: Color,
}

const DARK: Palette = Palette {
    primary: Color::Rgb(99, 102, 241),
    success: Color::Rgb(96, 160, 96),
    accent: Color::Rgb(192, 160, 64),
    error: Color::Rgb(220, 80, 80),
    muted: Color::Rgb(128, 128, 128),
    text: Color::White,
    highlight: Color::Rgb(48, 48, 64),
    background: Color::Rgb(3, 7, 18),
    bar: Color::Rgb(32, 32, 40),
};

const LIGHT: Palette = Palette {
    primary: Color::Rgb(79, 70, 229),
    success: Color::Rgb(22, 128, 61),
    accent: Color::Rgb(161, 98, 7),
    error: Color::Rgb(185, 28, 28),
    muted: Color::Rgb(107, 114, 128),
    text: Color::Rgb(17, 24, 39),
    highlight: Color::Rgb(224, 231, 255),
    background: Color::Rgb(249, 250, 251),
    bar: Color::Rgb(229, 231, 235),
};

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => DARK,
        Theme::Light => LIGHT,
    }
}

impl Palette {
    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.highlight)
            .fg(self.text)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn highlight(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn big_number(&self) -> Style {
        Style::default().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    pub fn nav_item(&self, selected: bool) -> Style {
        if selected {
            Style::default()
                .fg(self.primary)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(self.text)
        }
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.primary)
        } else {
            Style::default().fg(self.muted)
        }
    }

    pub fn input(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.text)
        }
    }

    pub fn button(&self, focused: bool, disabled: bool) -> Style {
        if disabled {
            Style::default().fg(self.muted)
        } else if focused {
            Style::default()
                .fg(self.background)
                .bg(self.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.primary)
        }
    }

    pub fn status_bar(&self) -> Style {
        Style::default().bg(self.bar).fg(self.text)
    }

    pub fn help_key(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }
}
