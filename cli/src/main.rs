use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use rickdex_core::catalog::RickAndMortyClient;
use rickdex_core::favorites::FavoritesStore;
use rickdex_core::storage::{MemoryStorage, SqliteStorage};
use rickdex_tui::config::load_config;
use rickdex_tui::{App, EventHandler};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE: &str = "rickdex.log";

fn main() -> Result<()> {
    // The terminal belongs to the UI, so logs go to a file
    init_logging(Path::new(LOG_FILE))?;

    let config_path = std::env::var("RICKDEX_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));
    tracing::info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)?;

    // Catalog requests run here; the UI loop itself stays synchronous
    let runtime = Runtime::new().context("Failed to start async runtime")?;

    let favorites = open_favorites(&config.storage.database)?;
    let catalog = RickAndMortyClient::new(config.api.clone()).context("Failed to create catalog client")?;
    let mut app = App::new(config, favorites, Arc::new(catalog), runtime.handle().clone())?;
    let event_handler = EventHandler::new(app.config.ui.tick_rate_ms);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app, &event_handler);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Let pending favorites writes land before exiting
    app.favorites.flush();
    tracing::info!("Bye");

    if let Err(err) = result {
        tracing::error!("Fatal error: {:?}", err);
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

/// Favorites backed by SQLite, or kept in memory for this session if the
/// database cannot be opened
fn open_favorites(database: &Path) -> Result<FavoritesStore> {
    let store = match SqliteStorage::open(database) {
        Ok(storage) => FavoritesStore::open(storage)?,
        Err(e) => {
            tracing::warn!(
                "Cannot open {}: {}; favorites will not be saved",
                database.display(),
                e
            );
            FavoritesStore::open(MemoryStorage::new())?
        }
    };
    Ok(store)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_handler: &EventHandler,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| rickdex_tui::ui::render(f, app))?;

        // Handle events
        match event_handler.next()? {
            rickdex_tui::Event::Key(key) => {
                rickdex_tui::event::handle_key_event(key, app);
            }
            rickdex_tui::Event::Mouse(mouse) => {
                rickdex_tui::event::handle_mouse_event(mouse, app);
            }
            rickdex_tui::Event::Tick => {}
        }
        app.tick();

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    Ok(())
}
