//! Conversion of clock times to instants and selection of the next event.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};

use crate::error::{Error, Result};
use crate::timings::{ClockTime, NamedTiming, OrderedDayTimings};

/// Resolves a local wall-clock time to an instant in `tz`.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times that
/// do not exist (clocks going forward) are pushed forward by an hour.
pub(crate) fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest().or_else(|| {
        let shifted = naive.checked_add_signed(TimeDelta::hours(1))?;
        tz.from_local_datetime(&shifted).earliest()
    })
}

/// Anchors a clock time to `date` in `tz` and returns unix milliseconds.
///
/// # Errors
///
/// Returns `Error::MalformedResponse` if the time cannot be placed on the date.
pub fn to_instant<Tz: TimeZone>(time: ClockTime, date: NaiveDate, tz: &Tz) -> Result<i64> {
    let clock = NaiveTime::from_hms_opt(time.hour, time.minute, 0)
        .ok_or_else(|| Error::MalformedResponse(format!("invalid clock time {time}")))?;
    resolve_local(tz, date.and_time(clock))
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| Error::MalformedResponse(format!("{time} does not exist on {date}")))
}

/// Converts a day's ordered timings to instants anchored to `date`.
///
/// # Errors
///
/// Returns an error if any time cannot be placed on the date.
pub fn to_instants<Tz: TimeZone>(
    day: &OrderedDayTimings,
    date: NaiveDate,
    tz: &Tz,
) -> Result<Vec<NamedTiming<i64>>> {
    day.iter()
        .map(|t| Ok(NamedTiming::new(t.event, to_instant(t.time, date, tz)?)))
        .collect()
}

/// Today's events followed by tomorrow's, as instants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedSchedule {
    entries: Vec<NamedTiming<i64>>,
}

impl CombinedSchedule {
    /// Converts both days and concatenates them, today first.
    ///
    /// # Errors
    ///
    /// Returns an error if any time cannot be placed on its date.
    pub fn build<Tz: TimeZone>(
        today: &OrderedDayTimings,
        tomorrow: &OrderedDayTimings,
        today_date: NaiveDate,
        tz: &Tz,
    ) -> Result<Self> {
        let tomorrow_date = today_date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| Error::MalformedResponse(format!("no day after {today_date}")))?;
        let mut entries = to_instants(today, today_date, tz)?;
        entries.extend(to_instants(tomorrow, tomorrow_date, tz)?);
        Ok(Self { entries })
    }

    #[must_use]
    pub const fn from_entries(entries: Vec<NamedTiming<i64>>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[NamedTiming<i64>] {
        &self.entries
    }

    /// Returns the first entry strictly after `now_ms`, scanning in order.
    #[must_use]
    pub fn next_after(&self, now_ms: i64) -> Option<&NamedTiming<i64>> {
        self.entries.iter().find(|t| t.time > now_ms)
    }
}
