//! Formatting helpers for dates, countdowns and 12-hour clock strings.

use chrono::{Datelike, NaiveDate};

use crate::timings::ClockTime;

/// Half of the day a clock time is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Am,
    Pm,
}

impl Period {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Am => "AM",
            Self::Pm => "PM",
        }
    }
}

/// Formats a calendar date as `DD-MM-YYYY`, the form the timings API expects.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    format!("{:02}-{:02}-{:04}", date.day(), date.month(), date.year())
}

/// Formats a millisecond count as `HH:MM:SS`.
///
/// Hours are not wrapped into days. Negative input renders as `00:00:00`.
#[must_use]
pub fn format_countdown(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    format!(
        "{:02}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}

/// Converts a 24-hour hour to its 12-hour face value (0 and 12 both show 12).
#[must_use]
pub const fn twelve_hour(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

/// Returns the period for a 24-hour hour.
///
/// Only hours strictly greater than 12 are `PM`, so 12:xx shows as `AM`.
#[must_use]
pub const fn period(hour: u32) -> Period {
    if hour > 12 { Period::Pm } else { Period::Am }
}

/// Formats a clock time as `hh:mm AM` / `hh:mm PM`.
#[must_use]
pub fn format_clock(time: ClockTime) -> String {
    format!(
        "{:02}:{:02} {}",
        twelve_hour(time.hour),
        time.minute,
        period(time.hour).as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_countdown_units() {
        assert_eq!(format_countdown(3_661_000), "01:01:01");
        assert_eq!(format_countdown(0), "00:00:00");
        assert_eq!(format_countdown(59_999), "00:00:59");
        assert_eq!(format_countdown(25 * 3_600_000), "25:00:00");
    }

    #[test]
    fn format_countdown_negative_clamps() {
        assert_eq!(format_countdown(-5_000), "00:00:00");
    }

    #[test]
    fn format_date_pads_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_date(date), "05-01-2024");
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(format_date(date), "31-12-2024");
    }

    #[test]
    fn twelve_hour_faces() {
        assert_eq!(twelve_hour(0), 12);
        assert_eq!(twelve_hour(4), 4);
        assert_eq!(twelve_hour(12), 12);
        assert_eq!(twelve_hour(19), 7);
    }

    #[test]
    fn period_boundary_is_strictly_after_noon() {
        assert_eq!(period(0), Period::Am);
        assert_eq!(period(12), Period::Am);
        assert_eq!(period(13), Period::Pm);
        assert_eq!(period(23), Period::Pm);
    }

    #[test]
    fn format_clock_examples() {
        assert_eq!(format_clock(ClockTime::new(12, 5)), "12:05 AM");
        assert_eq!(format_clock(ClockTime::new(19, 25)), "07:25 PM");
        assert_eq!(format_clock(ClockTime::new(0, 10)), "12:10 AM");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn format_countdown_shape(ms in 0i64..360_000_000) {
                let s = format_countdown(ms);
                let parts: Vec<&str> = s.split(':').collect();
                prop_assert_eq!(parts.len(), 3);
                prop_assert!(parts.iter().all(|p| p.len() >= 2));
            }

            #[test]
            fn format_countdown_recovers_whole_seconds(secs in 0i64..360_000) {
                let s = format_countdown(secs * 1000 + 999);
                let parts: Vec<i64> = s.split(':').map(|p| p.parse().unwrap()).collect();
                prop_assert_eq!(parts[0] * 3600 + parts[1] * 60 + parts[2], secs);
            }

            #[test]
            fn twelve_hour_in_range(hour in 0u32..24) {
                let h = twelve_hour(hour);
                prop_assert!((1..=12).contains(&h));
            }
        }
    }
}
