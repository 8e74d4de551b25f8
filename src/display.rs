//! Display targets the widget writes into.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::format::format_clock;
use crate::timings::{Event, OrderedDayTimings};

/// Number of rows in the day table.
pub const ROW_COUNT: usize = 8;

/// Named text targets the refresh cycle and countdown write to.
pub trait DisplaySink: Send + Sync {
    fn set_city(&self, city: &str);
    fn set_next_prayer(&self, label: &str);
    fn set_timer(&self, timer: &str);
    fn set_row(&self, index: usize, row: &DisplayRow);
    fn set_loading(&self, loading: bool);
    /// Called after a refresh cycle has rendered a new day table.
    fn set_refreshed(&self, _at: DateTime<Local>) {}
    /// Marks the table row being counted down to, if it is one of today's.
    fn set_highlight(&self, _index: Option<usize>) {}
}

/// One name/time pair in the day table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub name: String,
    pub time: String,
}

/// Builds the eight table rows for a day.
///
/// Every name except Midnight gets the definite article.
#[must_use]
pub fn render_rows(day: &OrderedDayTimings) -> Vec<DisplayRow> {
    day.iter()
        .map(|t| DisplayRow {
            name: if t.event == Event::Midnight {
                t.title().to_string()
            } else {
                format!("ال{}", t.title())
            },
            time: format_clock(t.time),
        })
        .collect()
}

/// Snapshot of everything the widget shows.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayState {
    pub city: String,
    pub next_prayer: String,
    pub timer: String,
    pub rows: Vec<DisplayRow>,
    pub loading: bool,
    pub highlight: Option<usize>,
    pub last_refresh: Option<DateTime<Local>>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            city: String::new(),
            next_prayer: String::new(),
            timer: String::new(),
            rows: vec![DisplayRow::default(); ROW_COUNT],
            loading: true,
            highlight: None,
            last_refresh: None,
        }
    }
}

/// Thread-safe display state shared between the engine and renderers.
#[derive(Debug, Clone, Default)]
pub struct SharedDisplay {
    inner: Arc<Mutex<DisplayState>>,
}

impl SharedDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DisplayState> {
        // A panicked writer leaves plain strings behind, still fine to show.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> DisplayState {
        self.lock().clone()
    }
}

impl DisplaySink for SharedDisplay {
    fn set_city(&self, city: &str) {
        city.clone_into(&mut self.lock().city);
    }

    fn set_next_prayer(&self, label: &str) {
        label.clone_into(&mut self.lock().next_prayer);
    }

    fn set_timer(&self, timer: &str) {
        timer.clone_into(&mut self.lock().timer);
    }

    fn set_row(&self, index: usize, row: &DisplayRow) {
        if let Some(slot) = self.lock().rows.get_mut(index) {
            slot.clone_from(row);
        }
    }

    fn set_loading(&self, loading: bool) {
        self.lock().loading = loading;
    }

    fn set_refreshed(&self, at: DateTime<Local>) {
        self.lock().last_refresh = Some(at);
    }

    fn set_highlight(&self, index: Option<usize>) {
        self.lock().highlight = index;
    }
}
