//! Nexus Explorer - a terminal dashboard for managing API keys.
//!
//! Sign in or register, watch aggregate usage, create and copy API keys,
//! and edit the account profile without leaving the terminal.

mod app;
mod clipboard;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use nexus_core::config::StorageBackend;
use nexus_core::storage::{self, ThemeStore};
use nexus_core::{ApiClient, Config, CredentialStore, SessionManager};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_PREFIX: &str = "nexus.log";

const USAGE: &str = "Usage: nexus [--ephemeral] [--backend <url>]

Options:
  --ephemeral       Keep the session in memory only
  --backend <url>   Backend base address (overrides NEXUS_BACKEND_URL)
  -h, --help        Show this help";

/// Command-line options
#[derive(Debug, Default, PartialEq, Eq)]
struct Cli {
    ephemeral: bool,
    backend: Option<String>,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--ephemeral" => cli.ephemeral = true,
            "--backend" => {
                let url = iter.next().context("--backend needs a URL")?;
                cli.backend = Some(url.clone());
            }
            "-h" | "--help" => cli.help = true,
            other => anyhow::bail!("Unknown argument: {}", other),
        }
    }
    Ok(cli)
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to a daily file in the data directory so they never draw over the
/// UI. Use RUST_LOG to control the level (e.g., RUST_LOG=nexus_core=debug).
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = match config.data_dir() {
        Ok(dir) => dir.join("logs"),
        Err(_) => return None,
    };
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Some(guard)
}

fn build_app(config: Config, ephemeral: bool) -> Result<App> {
    let mut config = config;
    if ephemeral {
        config.storage = StorageBackend::Memory;
    }

    let kv = storage::open(&config).context("Failed to open storage")?;
    let session = SessionManager::hydrate(CredentialStore::new(kv.clone()))
        .with_logout_timeout(config.logout_timeout());
    let api = ApiClient::new(&config)?;

    Ok(App::new(config, Arc::new(session), api, ThemeStore::new(kv)))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args)?;
    if cli.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config ({:#}), using defaults", e);
            Config::default()
        }
    };
    let config = match &cli.backend {
        Some(url) => config.with_backend_url(url),
        None => config,
    };

    let _guard = init_tracing(&config);
    info!(backend = %config.backend_url, ephemeral = cli.ephemeral, "Nexus Explorer starting");

    let mut app = build_app(config, cli.ephemeral)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = match app.start() {
        Ok(()) => run_app(&mut terminal, &mut app).await,
        Err(e) => Err(e),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        warn!(error = %e, "Exited with error");
        eprintln!("Error: {:#}", e);
    }

    info!("Nexus Explorer shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_empty() {
        assert_eq!(parse_args(&[]).unwrap(), Cli::default());
    }

    #[test]
    fn test_parse_args_flags() {
        let cli = parse_args(&args(&["--ephemeral", "--backend", "http://api.test"])).unwrap();
        assert!(cli.ephemeral);
        assert_eq!(cli.backend.as_deref(), Some("http://api.test"));
    }

    #[test]
    fn test_parse_args_backend_needs_value() {
        assert!(parse_args(&args(&["--backend"])).is_err());
    }

    #[test]
    fn test_parse_args_unknown() {
        assert!(parse_args(&args(&["--nope"])).is_err());
    }

    #[test]
    fn test_ephemeral_app_persists_nothing() {
        let app = build_app(Config::default(), true).unwrap();
        assert_eq!(app.config.storage, StorageBackend::Memory);
        assert!(!app.is_authenticated());
    }
}
