//! VTIMEZONE block for the reference zone.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use chrono_tz::{OffsetComponents, Tz};
use icalendar::parser::{Component, ParseString, Property};

use crate::time_window::COMPACT_FORMAT;

/// One STANDARD or DAYLIGHT sub-component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observance {
    pub daylight: bool,
    /// Wall clock at which the observance begins, in the offset it replaces.
    pub onset: NaiveDateTime,
    /// Seconds east of UTC before the onset.
    pub offset_from: i32,
    /// Seconds east of UTC from the onset on.
    pub offset_to: i32,
    pub name: String,
}

impl Observance {
    fn to_component(&self) -> Component<'static> {
        let kind = if self.daylight { "DAYLIGHT" } else { "STANDARD" };
        Component {
            name: kind.into(),
            properties: vec![
                property("DTSTART", self.onset.format(COMPACT_FORMAT).to_string()),
                property("TZOFFSETFROM", format_offset(self.offset_from)),
                property("TZOFFSETTO", format_offset(self.offset_to)),
                property("TZNAME", self.name.clone()),
            ],
            components: Vec::new(),
        }
    }
}

/// Every offset change of `tz` from the start of the year before `year` to
/// the end of `year`. A zone without changes gets one fixed STANDARD
/// observance.
pub fn observances(tz: Tz, year: i32) -> Vec<Observance> {
    let bounds = NaiveDate::from_ymd_opt(year - 1, 1, 1).zip(NaiveDate::from_ymd_opt(year + 1, 1, 1));
    let Some((first, last)) = bounds else {
        return vec![fixed_observance(tz, DateTime::<Utc>::UNIX_EPOCH)];
    };
    let from = first.and_time(NaiveTime::MIN).and_utc();
    let until = last.and_time(NaiveTime::MIN).and_utc();

    let mut found = Vec::new();
    let mut current = utc_offset(tz, from);
    let mut t = from;

    while t < until {
        let next = t + Duration::hours(1);
        if utc_offset(tz, next) != current {
            // Narrow the change down to the minute.
            let change = (1..=60)
                .map(|m| t + Duration::minutes(m))
                .find(|c| utc_offset(tz, *c) != current)
                .unwrap_or(next);
            found.push(observance_at(tz, change, current));
            current = utc_offset(tz, change);
        }
        t = next;
    }

    if found.is_empty() {
        found.push(fixed_observance(tz, from));
    }
    found
}

/// The VTIMEZONE component for an event starting in `year`.
pub fn vtimezone(tz: Tz, year: i32) -> Component<'static> {
    Component {
        name: "VTIMEZONE".into(),
        properties: vec![
            property("TZID", tz.name().to_string()),
            property("X-LIC-LOCATION", tz.name().to_string()),
        ],
        components: observances(tz, year)
            .iter()
            .map(Observance::to_component)
            .collect(),
    }
}

fn observance_at(tz: Tz, change: DateTime<Utc>, offset_from: i32) -> Observance {
    let local = change.with_timezone(&tz);
    Observance {
        daylight: !local.offset().dst_offset().is_zero(),
        onset: change.naive_utc() + Duration::seconds(i64::from(offset_from)),
        offset_from,
        offset_to: local.offset().fix().local_minus_utc(),
        name: local.format("%Z").to_string(),
    }
}

fn fixed_observance(tz: Tz, at: DateTime<Utc>) -> Observance {
    let offset = utc_offset(tz, at);
    Observance {
        daylight: false,
        onset: DateTime::<Utc>::UNIX_EPOCH.naive_utc(),
        offset_from: offset,
        offset_to: offset,
        name: at.with_timezone(&tz).format("%Z").to_string(),
    }
}

fn utc_offset(tz: Tz, at: DateTime<Utc>) -> i32 {
    at.with_timezone(&tz).offset().fix().local_minus_utc()
}

/// `-0800`, `+0530`
fn format_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("{}{:02}{:02}", sign, minutes / 60, minutes % 60)
}

fn property(name: &'static str, value: String) -> Property<'static> {
    Property {
        name: name.into(),
        val: ParseString::from(value),
        params: Vec::new(),
    }
}
