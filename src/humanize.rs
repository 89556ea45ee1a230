//! Human-relative time phrases ("3 days ago", "1 month from now").
use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 12 * MONTH;
const LONG_TIME: i64 = 37 * YEAR;

enum Phrase {
    Now,
    Fixed(&'static str),
    Count(&'static str, i64),
    LongWhile,
}

/// Upper bound (exclusive, seconds) and the phrase used below it.
const MAGNITUDES: &[(i64, Phrase)] = &[
    (1, Phrase::Now),
    (2, Phrase::Fixed("1 second")),
    (MINUTE, Phrase::Count("seconds", 1)),
    (2 * MINUTE, Phrase::Fixed("1 minute")),
    (HOUR, Phrase::Count("minutes", MINUTE)),
    (2 * HOUR, Phrase::Fixed("1 hour")),
    (DAY, Phrase::Count("hours", HOUR)),
    (2 * DAY, Phrase::Fixed("1 day")),
    (WEEK, Phrase::Count("days", DAY)),
    (2 * WEEK, Phrase::Fixed("1 week")),
    (MONTH, Phrase::Count("weeks", WEEK)),
    (2 * MONTH, Phrase::Fixed("1 month")),
    (YEAR, Phrase::Count("months", MONTH)),
    (18 * MONTH, Phrase::Fixed("1 year")),
    (2 * YEAR, Phrase::Fixed("2 years")),
    (LONG_TIME, Phrase::Count("years", YEAR)),
];

pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(then).num_seconds();
    let (secs, suffix) = if diff < 0 {
        (-diff, "from now")
    } else {
        (diff, "ago")
    };

    let phrase = MAGNITUDES
        .iter()
        .find(|(bound, _)| secs < *bound)
        .map(|(_, phrase)| phrase)
        .unwrap_or(&Phrase::LongWhile);

    match phrase {
        Phrase::Now => "now".to_string(),
        Phrase::Fixed(text) => format!("{} {}", text, suffix),
        Phrase::Count(unit, div) => format!("{} {} {}", secs / div, unit, suffix),
        Phrase::LongWhile => format!("a long while {}", suffix),
    }
}
