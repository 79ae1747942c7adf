use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use super::KeyValueStore;

const THEME_KEY: &str = "theme";

/// Colour theme preference. Independent of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ThemeStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ThemeStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load the saved theme; missing or unreadable values fall back to dark
    pub fn load(&self) -> Theme {
        match self.kv.get(THEME_KEY) {
            Ok(Some(value)) => Theme::parse(&value).unwrap_or_default(),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read theme preference");
                Theme::default()
            }
        }
    }

    pub fn save(&self, theme: Theme) -> Result<()> {
        self.kv.set(THEME_KEY, theme.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_theme_defaults_to_dark() {
        let store = ThemeStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(store.load(), Theme::Dark);
    }

    #[test]
    fn test_theme_round_trip_and_garbage() {
        let kv = Arc::new(MemoryStore::new());
        let store = ThemeStore::new(kv.clone());

        store.save(Theme::Light).unwrap();
        assert_eq!(store.load(), Theme::Light);

        kv.set(THEME_KEY, "solarized").unwrap();
        assert_eq!(store.load(), Theme::Dark);
    }

    #[test]
    fn test_toggle() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled().toggled(), Theme::Light);
    }
}
