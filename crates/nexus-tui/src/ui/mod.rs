//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame layout, sidebar, status bar and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Dark and light palettes
//! - `pages`: Page content (auth, dashboard, API keys, settings)

pub mod input;
pub mod pages;
pub mod render;
pub mod styles;
