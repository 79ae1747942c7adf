//! Page content, one module per screen.

pub mod auth;
pub mod dashboard;
pub mod keys;
pub mod settings;

use ratatui::text::{Line, Span};

use super::styles::Palette;

/// Width of the text area inside an input box
pub const INPUT_WIDTH: usize = 24;

/// A labelled single-line input: `Label: [value▌]`
pub fn input_line<'a>(
    p: &Palette,
    label: &'a str,
    value: &str,
    focused: bool,
    disabled: bool,
) -> Line<'a> {
    let cursor = if focused && !disabled { "▌" } else { "" };
    let shown = tail(value, INPUT_WIDTH - cursor.chars().count());
    let style = if disabled { p.muted() } else { p.input(focused) };
    Line::from(vec![
        Span::styled(format!("  {:>10}: [", label), p.muted()),
        Span::styled(format!("{:<width$}", format!("{}{}", shown, cursor), width = INPUT_WIDTH), style),
        Span::styled("]", p.muted()),
    ])
}

/// The last `max` characters of `value`, so the cursor end stays visible
pub fn tail(value: &str, max: usize) -> String {
    let count = value.chars().count();
    value.chars().skip(count.saturating_sub(max)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_short() {
        assert_eq!(tail("abc", 5), "abc");
    }

    #[test]
    fn test_tail_long() {
        assert_eq!(tail("abcdef", 3), "def");
    }

    #[test]
    fn test_tail_multibyte() {
        assert_eq!(tail("héllo", 4), "éllo");
    }
}
