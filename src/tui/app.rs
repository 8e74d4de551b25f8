//! Application state model.

use tokio::sync::mpsc;

use crate::display::{DisplayState, SharedDisplay};
use crate::refresh::RefreshReason;

pub struct App {
    pub should_quit: bool,
    // Latest copy of the widget display, refreshed once per frame
    pub state: DisplayState,
    // Status line message
    pub status: String,
    // Address of the HTTP endpoint, if serving
    pub api_addr: Option<String>,
    display: SharedDisplay,
    refresh_tx: mpsc::UnboundedSender<RefreshReason>,
}

impl App {
    pub fn new(
        display: SharedDisplay,
        refresh_tx: mpsc::UnboundedSender<RefreshReason>,
        api_addr: Option<String>,
    ) -> Self {
        Self {
            should_quit: false,
            state: display.snapshot(),
            status: String::new(),
            api_addr,
            display,
            refresh_tx,
        }
    }

    /// Pulls the latest display state.
    pub fn sync(&mut self) {
        self.state = self.display.snapshot();
    }

    /// Asks the widget for a refresh cycle.
    pub fn request_refresh(&mut self) {
        self.status = if self.refresh_tx.send(RefreshReason::Manual).is_ok() {
            "Refreshing...".to_string()
        } else {
            "Widget stopped".to_string()
        };
    }
}
