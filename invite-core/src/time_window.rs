//! Start/end window of an invite in the reference time zone.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{InviteError, InviteResult};

/// The only accepted shape for `"{date} {time}"`.
const INPUT_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/// Compact local form used in DTSTART/DTEND.
pub const COMPACT_FORMAT: &str = "%Y%m%dT%H%M%S";

/// UTC form, for times a TZID cannot pin down.
pub const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Every invite lasts one hour.
pub const INVITE_LENGTH_MINUTES: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl TimeWindow {
    /// Parse a `YYYY-MM-DD` date and a `HH:MM AM/PM` time as wall-clock time
    /// in `tz`.
    pub fn parse(date: &str, time: &str, tz: Tz) -> InviteResult<Self> {
        let input = format!("{} {}", date.trim(), time.trim());
        let naive = NaiveDateTime::parse_from_str(&input, INPUT_FORMAT).map_err(|_| {
            InviteError::InvalidDateTime(format!(
                "'{}' does not match YYYY-MM-DD HH:MM AM/PM",
                input
            ))
        })?;

        let start = match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => {
                return Err(InviteError::InvalidDateTime(format!(
                    "'{}' does not exist in {} (clocks skip that hour)",
                    input,
                    tz.name()
                )));
            }
        };

        Ok(Self::starting_at(start))
    }

    pub fn starting_at(start: DateTime<Tz>) -> Self {
        TimeWindow {
            start,
            end: start + Duration::minutes(INVITE_LENGTH_MINUTES),
        }
    }

    pub fn tz(&self) -> Tz {
        self.start.timezone()
    }

    pub fn start_stamp(&self) -> String {
        self.start.format(COMPACT_FORMAT).to_string()
    }

    pub fn end_stamp(&self) -> String {
        self.end.format(COMPACT_FORMAT).to_string()
    }

    /// Whether the end falls on the second pass through a repeated hour.
    /// A TZID-qualified local time always means the first pass, so such an
    /// end has to be written in UTC.
    pub fn end_is_repeated_wall_clock(&self) -> bool {
        match self.tz().from_local_datetime(&self.end.naive_local()) {
            LocalResult::Ambiguous(earliest, _) => earliest != self.end,
            _ => false,
        }
    }

    pub fn end_utc_stamp(&self) -> String {
        self.end.with_timezone(&Utc).format(UTC_FORMAT).to_string()
    }
}

/// Render `now` in `tz` using the compact local form.
pub fn compact_stamp(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz).format(COMPACT_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Los_Angeles;

    #[test]
    fn end_is_one_hour_after_start() {
        let window = TimeWindow::parse("2025-09-25", "12:30 PM", Los_Angeles).unwrap();

        assert_eq!(window.end - window.start, Duration::minutes(60));
        assert_eq!(window.start_stamp(), "20250925T123000");
        assert_eq!(window.end_stamp(), "20250925T133000");
    }

    #[test]
    fn late_evening_rolls_into_next_day() {
        let window = TimeWindow::parse("2025-12-31", "11:30 PM", Los_Angeles).unwrap();

        assert_eq!(window.start_stamp(), "20251231T233000");
        assert_eq!(window.end_stamp(), "20260101T003000");
    }

    #[test]
    fn twelve_am_is_midnight() {
        let window = TimeWindow::parse("2025-09-25", "12:00 AM", Los_Angeles).unwrap();
        assert_eq!(window.start_stamp(), "20250925T000000");
    }

    #[test]
    fn other_shapes_are_rejected() {
        for (date, time) in [
            ("2025-09-25", "14:30"),
            ("25-09-2025", "12:30 PM"),
            ("2025/09/25", "12:30 PM"),
            ("2025-09-25", "12:30:00 PM"),
            ("2025-02-30", "12:30 PM"),
            ("2025-09-25", "13:30 PM"),
        ] {
            let err = TimeWindow::parse(date, time, Los_Angeles).unwrap_err();
            assert!(
                matches!(err, InviteError::InvalidDateTime(_)),
                "{date} {time} should fail"
            );
        }
    }

    #[test]
    fn skipped_hour_is_rejected() {
        // 2025-03-09 02:30 does not exist in Los Angeles.
        let err = TimeWindow::parse("2025-03-09", "02:30 AM", Los_Angeles).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn repeated_hour_takes_first_occurrence() {
        // 2025-11-02 01:30 happens twice; the first one is still PDT.
        let window = TimeWindow::parse("2025-11-02", "01:30 AM", Los_Angeles).unwrap();

        assert_eq!(window.start.with_timezone(&Utc).format(UTC_FORMAT).to_string(), "20251102T083000Z");
        assert_eq!(window.end - window.start, Duration::minutes(60));
        // One real hour later the clocks have fallen back to the same wall clock.
        assert_eq!(window.end_stamp(), "20251102T013000");
        assert!(window.end_is_repeated_wall_clock());
        assert_eq!(window.end_utc_stamp(), "20251102T093000Z");
    }

    #[test]
    fn ordinary_end_is_not_repeated() {
        for (date, time) in [
            ("2025-09-25", "12:30 PM"),
            ("2025-03-09", "01:30 AM"),
            // Ends at 01:00 PDT, the first pass through the repeated hour.
            ("2025-11-02", "12:00 AM"),
        ] {
            let window = TimeWindow::parse(date, time, Los_Angeles).unwrap();
            assert!(!window.end_is_repeated_wall_clock(), "{date} {time}");
        }
    }

    #[test]
    fn stamp_uses_reference_zone() {
        let now = Utc.with_ymd_and_hms(2025, 9, 25, 19, 0, 5).unwrap();
        assert_eq!(compact_stamp(now, Los_Angeles), "20250925T120005");
    }
}
