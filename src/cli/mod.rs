//! CLI mode for mawaqit - one-shot table printing and a console countdown.

mod progress;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::cache::AssetCache;
use crate::config::AppConfig;
use crate::countdown::countdown_label;
use crate::display::SharedDisplay;
use crate::error::{Error, Result};
use crate::format::format_countdown;
use crate::refresh::Widget;

use progress::{make_countdown_spinner, print_day_table, print_next, spinner_message};

/// Runs one refresh cycle, prints today's table and the next event, and exits.
///
/// # Errors
///
/// Returns an error if the fetch fails, the timings are malformed, or no
/// event lies ahead.
pub async fn print_once(config: &AppConfig) -> Result<()> {
    let (tx, _rx) = mpsc::unbounded_channel();
    let refresher = Widget::from_config(config, Arc::new(SharedDisplay::new()))?.into_refresher(tx);

    let outcome = refresher.load().await?;
    print_day_table(&outcome.city, outcome.at, &outcome.rows, outcome.highlight());

    let next = outcome.next.ok_or(Error::NoUpcomingEvent)?;
    let left = format_countdown(next.time - outcome.at.timestamp_millis());
    print_next(&countdown_label(&next), &left);
    Ok(())
}

/// Shows a spinner counting down to the next event until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub async fn watch(config: &AppConfig) -> Result<()> {
    let display = SharedDisplay::new();
    let handle = Widget::from_config(config, Arc::new(display.clone()))?.spawn();
    let spinner = make_countdown_spinner();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut interval = tokio::time::interval(Duration::from_millis(250));
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = interval.tick() => {
                let state = display.snapshot();
                if !state.loading {
                    spinner.set_message(spinner_message(&state.city, &state.next_prayer, &state.timer));
                }
            }
        }
    }

    spinner.finish_and_clear();
    handle.shutdown().await;
    Ok(())
}

/// Copies the configured assets from `source_root` into the offline cache.
///
/// # Errors
///
/// Returns an error if any asset is missing or cannot be copied; nothing is
/// left installed in that case.
pub async fn install_cache(config: &AppConfig, source_root: &Path) -> Result<()> {
    let cache = AssetCache::from_config(&config.cache);
    let count = cache.install(source_root, &config.cache.assets).await?;
    println!(
        "Installed {count} asset(s) into {}",
        cache.store_dir().display()
    );
    Ok(())
}
