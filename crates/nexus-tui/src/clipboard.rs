//! Terminal clipboard access through the OSC 52 escape sequence.
//!
//! The terminal emulator, not this process, owns the clipboard, so this
//! also works over SSH. Terminals that do not support OSC 52 ignore it.

use std::io::{self, Write};

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Build the escape sequence that sets the system clipboard to `text`
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

/// Ask the terminal to put `text` on the clipboard
pub fn copy(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(osc52_sequence(text).as_bytes())?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc52_sequence() {
        assert_eq!(osc52_sequence("k1"), "\x1b]52;c;azE=\x07");
    }

    #[test]
    fn test_osc52_sequence_empty() {
        assert_eq!(osc52_sequence(""), "\x1b]52;c;\x07");
    }
}
