//! mawaqit - Arabic prayer-times widget with a countdown to the next prayer.
//!
//! The library fetches today's and tomorrow's timings for a fixed location,
//! orders them for display, and keeps a countdown running to the next event.
//! Rendering is left to a [`DisplaySink`]: the bundled TUI and CLI front ends
//! read from a [`SharedDisplay`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mawaqit::{AppConfig, SharedDisplay, Widget};
//!
//! # async fn example() -> mawaqit::Result<()> {
//! let config = AppConfig::default();
//! let display = SharedDisplay::new();
//!
//! // Fetches immediately, then again at every midnight and countdown expiry
//! let handle = Widget::from_config(&config, Arc::new(display.clone()))?.spawn();
//!
//! tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//! let state = display.snapshot();
//! println!("{} {}", state.next_prayer, state.timer);
//!
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod display;
pub mod error;
pub mod format;
pub mod midnight;
pub mod refresh;
pub mod schedule;
pub mod timings;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use api::{
    AladhanClient, DayResponse, FixedLocation, Location, LocationProvider, MyMemoryClient,
    PrayerTimesSource, Translator,
};
pub use cache::AssetCache;
pub use clock::{Clock, SystemClock};
pub use config::AppConfig;
pub use countdown::{Countdown, CountdownState, Tick, countdown_label};
pub use display::{DisplayRow, DisplaySink, DisplayState, SharedDisplay, render_rows};
pub use error::{Error, Result};
pub use format::{format_clock, format_countdown, format_date};
pub use refresh::{CycleOutcome, RefreshReason, Refresher, Widget, WidgetHandle};
pub use schedule::CombinedSchedule;
pub use timings::{ClockTime, Event, NamedTiming, OrderedDayTimings, RawDayTimings, normalize};
