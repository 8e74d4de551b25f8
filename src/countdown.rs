//! Countdown to the next event, ticking once per period.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::display::DisplaySink;
use crate::format::format_countdown;
use crate::refresh::RefreshReason;
use crate::timings::{Event, NamedTiming};

/// Builds the "time remaining until" label for an event.
///
/// Midnight takes the bare preposition, every other title the article form.
#[must_use]
pub fn countdown_label(target: &NamedTiming<i64>) -> String {
    if target.event == Event::Midnight {
        format!("المتبقي ل{}", target.title())
    } else {
        format!("المتبقي لل{}", target.title())
    }
}

/// Result of one countdown tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// The target time has been reached.
    Expired,
    /// Time is left; both strings are ready to display.
    Remaining { label: String, timer: String },
}

/// Computes what a tick at `now_ms` should display.
#[must_use]
pub fn tick(target: &NamedTiming<i64>, now_ms: i64) -> Tick {
    let remaining = target.time - now_ms;
    if remaining <= 0 {
        Tick::Expired
    } else {
        Tick::Remaining {
            label: countdown_label(target),
            timer: format_countdown(remaining),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Idle,
    Counting(NamedTiming<i64>),
}

/// Owned handle to the single running countdown task.
///
/// Starting a new countdown cancels the previous one. Dropping the handle
/// cancels it too.
#[derive(Debug, Default)]
pub struct Countdown {
    target: Option<NamedTiming<i64>>,
    token: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl Countdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts counting down to `target`, superseding any running countdown.
    ///
    /// When the target expires the task sends `RefreshReason::Expired` on
    /// `refresh_tx` and stops. A zero `period` ticks every millisecond.
    pub fn start<D, C>(
        &mut self,
        target: NamedTiming<i64>,
        sink: Arc<D>,
        clock: Arc<C>,
        refresh_tx: mpsc::UnboundedSender<RefreshReason>,
        period: Duration,
    ) where
        D: DisplaySink + ?Sized + 'static,
        C: Clock + ?Sized + 'static,
    {
        if self.token.is_some() {
            log::debug!("Superseding countdown to {:?}", self.target.map(|t| t.event));
        }
        self.cancel();

        let period = period.max(Duration::from_millis(1));
        let token = CancellationToken::new();
        let child = token.clone();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = child.cancelled() => break,
                    _ = interval.tick() => {
                        match tick(&target, clock.now().timestamp_millis()) {
                            Tick::Expired => {
                                log::info!("{} reached, refreshing", target.title());
                                let _ = refresh_tx.send(RefreshReason::Expired);
                                break;
                            }
                            Tick::Remaining { label, timer } => {
                                sink.set_next_prayer(&label);
                                sink.set_timer(&timer);
                                sink.set_loading(false);
                            }
                        }
                    }
                }
            }
        });

        self.target = Some(target);
        self.token = Some(token);
        self.task = Some(task);
    }

    /// Stops the running countdown, if any. The display keeps its last values.
    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
        self.task = None;
        self.target = None;
    }

    /// Returns `Counting` while a countdown task is alive.
    #[must_use]
    pub fn state(&self) -> CountdownState {
        match (&self.target, &self.task) {
            (Some(target), Some(task)) if !task.is_finished() => CountdownState::Counting(*target),
            _ => CountdownState::Idle,
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}
