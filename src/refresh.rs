//! The refresh cycle and the driver task that serializes it.
//!
//! A cycle fetches today's and tomorrow's timings, renders today's table,
//! and restarts the countdown on the next upcoming event. Cycles are
//! requested through a channel by the startup path, the midnight scheduler,
//! the countdown (on expiry) and the user; a single driver task runs them
//! one at a time.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, Local};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::{
    AladhanClient, Location, MyMemoryClient, PrayerTimesSource, Translator, build_http_client,
    city_of,
};
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::countdown::{Countdown, CountdownState};
use crate::display::{DisplayRow, DisplaySink, ROW_COUNT, render_rows};
use crate::error::{Error, Result};
use crate::midnight::spawn_midnight_refresh;
use crate::schedule::CombinedSchedule;
use crate::timings::{NamedTiming, OrderedDayTimings, normalize};

/// City label shown when the timezone city cannot be translated.
pub const UNKNOWN_CITY: &str = "Unknown";

/// Why a refresh cycle was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    Startup,
    Midnight,
    Expired,
    Manual,
}

/// Everything one cycle computed, before anything is displayed.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub at: DateTime<Local>,
    pub city: String,
    pub today: OrderedDayTimings,
    pub rows: Vec<DisplayRow>,
    pub schedule: CombinedSchedule,
    pub next: Option<NamedTiming<i64>>,
}

impl CycleOutcome {
    /// Row of today's table holding the next event, if it is one of today's.
    #[must_use]
    pub fn highlight(&self) -> Option<usize> {
        self.next
            .and_then(|next| self.schedule.entries().iter().position(|t| *t == next))
            .filter(|index| *index < ROW_COUNT)
    }
}

/// Runs refresh cycles and owns the active countdown.
pub struct Refresher {
    source: Arc<dyn PrayerTimesSource>,
    translator: Arc<dyn Translator>,
    sink: Arc<dyn DisplaySink>,
    clock: Arc<dyn Clock>,
    location: Location,
    from_lang: String,
    to_lang: String,
    period: Duration,
    refresh_tx: mpsc::UnboundedSender<RefreshReason>,
    countdown: Countdown,
}

impl Refresher {
    /// Translates the timezone city, falling back to [`UNKNOWN_CITY`].
    async fn city_label(&self, timezone: &str) -> String {
        let Some(city) = city_of(timezone) else {
            log::warn!("Timezone {timezone:?} has no city segment");
            return UNKNOWN_CITY.to_string();
        };
        match self
            .translator
            .translate(city, &self.from_lang, &self.to_lang)
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                log::warn!("Could not translate {city:?}: {e}");
                UNKNOWN_CITY.to_string()
            }
        }
    }

    /// Fetches and computes a cycle without touching the display.
    ///
    /// # Errors
    ///
    /// Returns an error if either fetch fails or the timings are malformed.
    pub async fn load(&self) -> Result<CycleOutcome> {
        let at = self.clock.now();
        let today = at.date_naive();
        let tomorrow = today
            .checked_add_days(Days::new(1))
            .ok_or_else(|| Error::MalformedResponse(format!("no day after {today}")))?;

        let (today_day, tomorrow_day) = futures::try_join!(
            self.source.fetch_day(today, self.location),
            self.source.fetch_day(tomorrow, self.location),
        )?;

        let today_timings = normalize(&today_day.timings)?;
        let tomorrow_timings = normalize(&tomorrow_day.timings)?;
        let schedule =
            CombinedSchedule::build(&today_timings, &tomorrow_timings, today, &at.timezone())?;
        let next = schedule.next_after(at.timestamp_millis()).copied();
        let city = self.city_label(&today_day.timezone).await;

        Ok(CycleOutcome {
            at,
            city,
            rows: render_rows(&today_timings),
            today: today_timings,
            schedule,
            next,
        })
    }

    /// Writes a computed cycle to the display and restarts the countdown.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoUpcomingEvent` if the schedule has no future entry;
    /// the table is still updated and the previous countdown keeps running.
    pub fn apply(&mut self, outcome: &CycleOutcome) -> Result<NamedTiming<i64>> {
        self.sink.set_city(&outcome.city);
        for (index, row) in outcome.rows.iter().enumerate() {
            self.sink.set_row(index, row);
        }
        self.sink.set_refreshed(outcome.at);

        self.sink.set_highlight(outcome.highlight());

        let next = outcome.next.ok_or(Error::NoUpcomingEvent)?;
        self.countdown.start(
            next,
            Arc::clone(&self.sink),
            Arc::clone(&self.clock),
            self.refresh_tx.clone(),
            self.period,
        );
        Ok(next)
    }

    /// Runs one full cycle. On error the display keeps its previous values.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching, parsing or next-event selection fails.
    pub async fn run_cycle(&mut self) -> Result<NamedTiming<i64>> {
        let outcome = self.load().await?;
        self.apply(&outcome)
    }

    #[must_use]
    pub fn countdown_state(&self) -> CountdownState {
        self.countdown.state()
    }

    /// Stops the countdown.
    pub fn stop(&mut self) {
        self.countdown.cancel();
    }
}

/// Receives refresh requests and runs cycles one at a time until `token` is
/// cancelled.
///
/// The refresher keeps a sender for countdown expiry, so the channel never
/// closes on its own. Requests that queued up while a cycle was running are
/// merged into one.
pub async fn run_refresh_loop(
    mut refresher: Refresher,
    mut rx: mpsc::UnboundedReceiver<RefreshReason>,
    token: CancellationToken,
) {
    loop {
        let reason = tokio::select! {
            biased;
            () = token.cancelled() => break,
            reason = rx.recv() => match reason {
                Some(reason) => reason,
                None => break,
            },
        };

        let mut merged = 0usize;
        while rx.try_recv().is_ok() {
            merged += 1;
        }
        if merged > 0 {
            log::debug!("Merged {merged} queued refresh request(s)");
        }

        log::info!("Refreshing prayer times ({reason:?})");
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            result = refresher.run_cycle() => match result {
                Ok(next) => log::info!("Fetched prayer times, next is {}", next.title()),
                Err(Error::NoUpcomingEvent) => {
                    log::error!("No upcoming prayer time after refresh");
                }
                Err(e) => log::error!("Refresh failed: {e}"),
            },
        }
    }
    refresher.stop();
}

/// Assembled widget: services, display and timing settings.
pub struct Widget {
    source: Arc<dyn PrayerTimesSource>,
    translator: Arc<dyn Translator>,
    sink: Arc<dyn DisplaySink>,
    clock: Arc<dyn Clock>,
    location: Location,
    from_lang: String,
    to_lang: String,
    period: Duration,
}

impl Widget {
    /// Creates a widget from explicit services.
    #[must_use]
    pub fn new(
        source: Arc<dyn PrayerTimesSource>,
        translator: Arc<dyn Translator>,
        sink: Arc<dyn DisplaySink>,
        config: &AppConfig,
    ) -> Self {
        Self {
            source,
            translator,
            sink,
            clock: Arc::new(SystemClock),
            location: config.location,
            from_lang: config.api.from_lang.clone(),
            to_lang: config.api.to_lang.clone(),
            period: config.countdown.period(),
        }
    }

    /// Creates a widget backed by the configured HTTP services.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig, sink: Arc<dyn DisplaySink>) -> Result<Self> {
        let http = build_http_client(config.api.timeout())?;
        let source = AladhanClient::with_base_url(http.clone(), &config.api.timings_url);
        let translator = MyMemoryClient::with_base_url(http, &config.api.translate_url);
        Ok(Self::new(Arc::new(source), Arc::new(translator), sink, config))
    }

    /// Replaces the system clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds a refresher whose countdown reports expiry on `refresh_tx`.
    #[must_use]
    pub fn into_refresher(self, refresh_tx: mpsc::UnboundedSender<RefreshReason>) -> Refresher {
        Refresher {
            source: self.source,
            translator: self.translator,
            sink: self.sink,
            clock: self.clock,
            location: self.location,
            from_lang: self.from_lang,
            to_lang: self.to_lang,
            period: self.period,
            refresh_tx,
            countdown: Countdown::new(),
        }
    }

    /// Starts the driver and midnight tasks and requests the first refresh.
    #[must_use]
    pub fn spawn(self) -> WidgetHandle {
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let clock = Arc::clone(&self.clock);

        let midnight = spawn_midnight_refresh(clock, refresh_tx.clone(), token.child_token());
        let refresher = self.into_refresher(refresh_tx.clone());
        let driver = tokio::spawn(run_refresh_loop(refresher, refresh_rx, token.child_token()));

        let _ = refresh_tx.send(RefreshReason::Startup);

        WidgetHandle {
            refresh_tx,
            token,
            driver,
            midnight,
        }
    }
}

/// Handle to a running widget.
pub struct WidgetHandle {
    refresh_tx: mpsc::UnboundedSender<RefreshReason>,
    token: CancellationToken,
    driver: JoinHandle<()>,
    midnight: JoinHandle<()>,
}

impl WidgetHandle {
    /// Requests a refresh. Returns `false` if the widget has stopped.
    pub fn refresh(&self) -> bool {
        self.refresh_tx.send(RefreshReason::Manual).is_ok()
    }

    /// Returns a sender other components can use to request refreshes.
    #[must_use]
    pub fn sender(&self) -> mpsc::UnboundedSender<RefreshReason> {
        self.refresh_tx.clone()
    }

    /// Stops all widget tasks and waits for them to finish.
    pub async fn shutdown(self) {
        self.token.cancel();
        let _ = self.driver.await;
        let _ = self.midnight.await;
    }
}
