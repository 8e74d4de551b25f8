//! Raw day timings and their normalization into the eight displayed events.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{1,2}):(\d{2})\b").expect("valid regex"));

/// A wall-clock time of day as reported by the timings API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    #[must_use]
    pub const fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// Parses `H:MM` or `HH:MM`, ignoring a trailing suffix such as ` (EET)`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedResponse` if the text is not a valid 24-hour time.
    pub fn parse(text: &str) -> Result<Self> {
        let caps = CLOCK_RE
            .captures(text)
            .ok_or_else(|| Error::MalformedResponse(format!("invalid clock time {text:?}")))?;
        let hour: u32 = caps[1]
            .parse()
            .map_err(|_| Error::MalformedResponse(format!("invalid hour in {text:?}")))?;
        let minute: u32 = caps[2]
            .parse()
            .map_err(|_| Error::MalformedResponse(format!("invalid minute in {text:?}")))?;
        if hour > 23 || minute > 59 {
            return Err(Error::MalformedResponse(format!(
                "clock time out of range {text:?}"
            )));
        }
        Ok(Self { hour, minute })
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Timings for one calendar day, exactly as the API returns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawDayTimings {
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub sunset: String,
    pub maghrib: String,
    pub isha: String,
    pub imsak: String,
    pub midnight: String,
    pub firstthird: String,
    pub lastthird: String,
}

/// The eight events shown by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Event {
    Midnight,
    LastThird,
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Event {
    /// Arabic display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Midnight => "منتصف الليل",
            Self::LastThird => "ثلث الليل الأخر",
            Self::Fajr => "فجر",
            Self::Sunrise => "شروق",
            Self::Dhuhr => "ظهر",
            Self::Asr => "عصر",
            Self::Maghrib => "مغرب",
            Self::Isha => "عشاء",
        }
    }
}

/// A titled time, either a clock time (`NamedTiming<ClockTime>`) or an
/// absolute instant in unix milliseconds (`NamedTiming<i64>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedTiming<T> {
    pub event: Event,
    pub time: T,
}

impl<T> NamedTiming<T> {
    #[must_use]
    pub const fn new(event: Event, time: T) -> Self {
        Self { event, time }
    }

    #[must_use]
    pub const fn title(&self) -> &'static str {
        self.event.label()
    }
}

/// One day's eight events in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedDayTimings([NamedTiming<ClockTime>; 8]);

impl OrderedDayTimings {
    #[must_use]
    pub const fn entries(&self) -> &[NamedTiming<ClockTime>; 8] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedTiming<ClockTime>> {
        self.0.iter()
    }
}

/// Orders a day's timings for display.
///
/// When Midnight falls in hour 0 it opens the day; otherwise it closes it.
/// Sunset, Imsak and Firstthird are validated but not shown.
///
/// # Errors
///
/// Returns `Error::MalformedResponse` if any timing is not a valid clock time.
pub fn normalize(raw: &RawDayTimings) -> Result<OrderedDayTimings> {
    let fajr = ClockTime::parse(&raw.fajr)?;
    let sunrise = ClockTime::parse(&raw.sunrise)?;
    let dhuhr = ClockTime::parse(&raw.dhuhr)?;
    let asr = ClockTime::parse(&raw.asr)?;
    ClockTime::parse(&raw.sunset)?;
    let maghrib = ClockTime::parse(&raw.maghrib)?;
    let isha = ClockTime::parse(&raw.isha)?;
    ClockTime::parse(&raw.imsak)?;
    let midnight = ClockTime::parse(&raw.midnight)?;
    ClockTime::parse(&raw.firstthird)?;
    let last_third = ClockTime::parse(&raw.lastthird)?;

    let midnight = NamedTiming::new(Event::Midnight, midnight);
    let last_third = NamedTiming::new(Event::LastThird, last_third);
    let fajr = NamedTiming::new(Event::Fajr, fajr);
    let sunrise = NamedTiming::new(Event::Sunrise, sunrise);
    let dhuhr = NamedTiming::new(Event::Dhuhr, dhuhr);
    let asr = NamedTiming::new(Event::Asr, asr);
    let maghrib = NamedTiming::new(Event::Maghrib, maghrib);
    let isha = NamedTiming::new(Event::Isha, isha);

    let ordered = if midnight.time.hour == 0 {
        [midnight, last_third, fajr, sunrise, dhuhr, asr, maghrib, isha]
    } else {
        [last_third, fajr, sunrise, dhuhr, asr, maghrib, isha, midnight]
    };
    Ok(OrderedDayTimings(ordered))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;

    pub(crate) fn sample_raw(midnight: &str) -> RawDayTimings {
        RawDayTimings {
            fajr: "04:50".to_string(),
            sunrise: "06:10".to_string(),
            dhuhr: "12:05".to_string(),
            asr: "15:30".to_string(),
            sunset: "18:00".to_string(),
            maghrib: "18:02".to_string(),
            isha: "19:25".to_string(),
            imsak: "04:40".to_string(),
            midnight: midnight.to_string(),
            firstthird: "21:00".to_string(),
            lastthird: "23:30".to_string(),
        }
    }

    #[test]
    fn clock_time_parse() {
        assert_eq!(ClockTime::parse("05:30").unwrap(), ClockTime::new(5, 30));
        assert_eq!(ClockTime::parse("5:07").unwrap(), ClockTime::new(5, 7));
        assert_eq!(ClockTime::parse("04:50 (EET)").unwrap(), ClockTime::new(4, 50));
    }

    #[test]
    fn clock_time_rejects_garbage() {
        assert!(ClockTime::parse("").is_err());
        assert!(ClockTime::parse("noon").is_err());
        assert!(ClockTime::parse("24:00").is_err());
        assert!(ClockTime::parse("12:60").is_err());
        assert!(ClockTime::parse("123:00").is_err());
    }

    #[test]
    fn midnight_in_hour_zero_leads() {
        let day = normalize(&sample_raw("00:10")).unwrap();
        let events: Vec<Event> = day.iter().map(|t| t.event).collect();
        assert_eq!(
            events,
            vec![
                Event::Midnight,
                Event::LastThird,
                Event::Fajr,
                Event::Sunrise,
                Event::Dhuhr,
                Event::Asr,
                Event::Maghrib,
                Event::Isha,
            ]
        );
        assert_eq!(day.entries()[0].title(), "منتصف الليل");
        assert_eq!(day.entries()[0].time, ClockTime::new(0, 10));
    }

    #[test]
    fn midnight_before_day_end_trails() {
        let day = normalize(&sample_raw("23:45")).unwrap();
        assert_eq!(day.entries()[0].event, Event::LastThird);
        assert_eq!(day.entries()[7].title(), "منتصف الليل");
    }

    #[test]
    fn midnight_test_ignores_minutes() {
        let day = normalize(&sample_raw("00:59")).unwrap();
        assert_eq!(day.entries()[0].event, Event::Midnight);
        let day = normalize(&sample_raw("13:05")).unwrap();
        assert_eq!(day.entries()[7].event, Event::Midnight);
    }

    #[test]
    fn hidden_timings_are_still_validated() {
        let mut raw = sample_raw("00:10");
        raw.sunset = "dusk".to_string();
        assert!(matches!(normalize(&raw), Err(Error::MalformedResponse(_))));
    }

    #[test]
    fn deserializes_api_keys() {
        let json = r#"{
            "Fajr": "04:50", "Sunrise": "06:10", "Dhuhr": "12:05", "Asr": "15:30",
            "Sunset": "18:00", "Maghrib": "18:02", "Isha": "19:25", "Imsak": "04:40",
            "Midnight": "00:10", "Firstthird": "21:00", "Lastthird": "23:30"
        }"#;
        let raw: RawDayTimings = serde_json::from_str(json).unwrap();
        assert_eq!(raw, sample_raw("00:10"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn always_eight_distinct_events(hour in 0u32..24, minute in 0u32..60) {
                let raw = sample_raw(&format!("{hour:02}:{minute:02}"));
                let day = normalize(&raw).unwrap();
                let events: HashSet<Event> = day.iter().map(|t| t.event).collect();
                prop_assert_eq!(events.len(), 8);
                if hour == 0 {
                    prop_assert_eq!(day.entries()[0].event, Event::Midnight);
                } else {
                    prop_assert_eq!(day.entries()[7].event, Event::Midnight);
                }
            }
        }
    }
}
