//! Interactive terminal widget and headless HTTP mode.

mod api;
mod app;
mod draw;
mod input;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::Event;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use crate::cache::AssetCache;
use crate::config::AppConfig;
use crate::display::SharedDisplay;
use crate::refresh::{RefreshReason, Widget};

pub use self::api::api_port;
use self::app::App;
use self::draw::draw;
use self::input::handle_input;

/// RAII guard that ensures terminal cleanup on drop.
/// Restores terminal to normal mode even if a panic occurs.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        crossterm::execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen);
    }
}

fn spawn_api_server(
    config: &AppConfig,
    display: SharedDisplay,
    refresh_tx: mpsc::UnboundedSender<RefreshReason>,
    host: String,
) -> String {
    let port = api_port(&config.server);
    let cache = AssetCache::from_config(&config.cache);
    let addr = format!("{host}:{port}");
    tokio::spawn(async move {
        log::info!("Starting API server on {host}:{port}");
        if let Err(e) = api::run_api_server(display, refresh_tx, cache, &host, port).await {
            log::error!("API server error: {e}");
        }
    });
    addr
}

/// Run the interactive TUI.
///
/// If `api_host` is `Some`, the HTTP API server is started on that address.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built, terminal setup fails
/// or drawing encounters I/O errors.
pub async fn run(config: &AppConfig, api_host: Option<String>) -> io::Result<()> {
    let display = SharedDisplay::new();
    let widget =
        Widget::from_config(config, Arc::new(display.clone())).map_err(io::Error::other)?;
    let handle = widget.spawn();

    let api_addr =
        api_host.map(|host| spawn_api_server(config, display.clone(), handle.sender(), host));

    let result = {
        // Initialize terminal with RAII guard for automatic cleanup
        let _terminal_guard = TerminalGuard::new()?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let mut app = App::new(display, handle.sender(), api_addr);
        event_loop(&mut terminal, &mut app).and_then(|()| terminal.show_cursor())
    };

    handle.shutdown().await;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.sync();
        terminal.draw(|f| draw(f, app))?;

        // Poll for events with 100ms timeout
        if crossterm::event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = crossterm::event::read()?
        {
            handle_input(app, key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Run the widget and the HTTP endpoint in headless mode (no TUI, no CLI).
///
/// Logs the countdown every 30 seconds until SIGTERM/SIGINT.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built.
///
/// # Panics
/// Panics if SIGTERM signal handler registration fails on Unix platforms.
#[allow(clippy::missing_panics_doc)]
pub async fn run_api_only(config: &AppConfig) -> io::Result<()> {
    let display = SharedDisplay::new();
    let handle = Widget::from_config(config, Arc::new(display.clone()))
        .map_err(io::Error::other)?
        .spawn();

    spawn_api_server(
        config,
        display.clone(),
        handle.sender(),
        config.server.host.clone(),
    );

    log::info!("Entering headless event loop");

    let mut progress_interval = tokio::time::interval(Duration::from_secs(30));
    progress_interval.tick().await; // consume the immediate first tick

    // Shutdown future: resolves on SIGINT or SIGTERM (systemd sends SIGTERM)
    #[cfg(unix)]
    let shutdown = async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => log::info!("Received SIGINT"),
            _ = sigterm.recv() => log::info!("Received SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        log::info!("Received SIGINT");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = progress_interval.tick() => {
                let state = display.snapshot();
                if !state.loading {
                    log::info!("[countdown] {} {} ({})", state.next_prayer, state.timer, state.city);
                }
            }
        }
    }

    handle.shutdown().await;
    log::info!("Shutdown complete");
    Ok(())
}
