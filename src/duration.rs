/// Compact duration strings ("8h", "45m", "1h30m") and HH:MM time ranges.
use std::sync::LazyLock;

use chrono::{NaiveTime, Timelike};
use regex::Regex;

const MINUTES_PER_DAY: i64 = 24 * 60;

static HOURS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*h").expect("hours pattern is valid"));
static MINUTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*m").expect("minutes pattern is valid"));

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Duration {
    pub hours: u32,
    pub minutes: u32,
}

impl Duration {
    pub fn total_minutes(&self) -> u32 {
        self.hours.saturating_mul(60).saturating_add(self.minutes)
    }
}

/// Parses a duration string. Anything that does not match yields zero.
pub fn parse_duration(text: &str) -> Duration {
    Duration {
        hours: capture_number(&HOURS_RE, text),
        minutes: capture_number(&MINUTES_RE, text),
    }
}

fn capture_number(re: &Regex, text: &str) -> u32 {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

pub fn duration_to_minutes(text: &str) -> u32 {
    parse_duration(text).total_minutes()
}

/// Inverse of [`parse_duration`], omitting zero components.
///
/// Not normalising: `{0, 90}` formats as "90m".
pub fn format_duration(duration: Duration) -> String {
    let mut out = String::new();
    if duration.hours > 0 {
        out.push_str(&format!("{}h", duration.hours));
    }
    if duration.minutes > 0 {
        out.push_str(&format!("{}m", duration.minutes));
    }
    out
}

/// Splits a minute count into whole hours and the remainder.
pub fn minutes_to_duration(total: u32) -> Duration {
    Duration {
        hours: total / 60,
        minutes: total % 60,
    }
}

/// Minutes for display, "0m" when there are none.
pub fn display_minutes(total: u32) -> String {
    match format_duration(minutes_to_duration(total)) {
        text if text.is_empty() => "0m".to_string(),
        text => text,
    }
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Minutes from `start` to `end`, wrapping past midnight when `end` is earlier.
/// Unparseable times count as zero.
pub fn range_duration_minutes(start: &str, end: &str) -> u32 {
    let (Some(start), Some(end)) = (parse_time(start), parse_time(end)) else {
        return 0;
    };
    let start = i64::from(start.hour() * 60 + start.minute());
    let end = i64::from(end.hour() * 60 + end.minute());
    let mut diff = end - start;
    if diff < 0 {
        diff += MINUTES_PER_DAY;
    }
    diff as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_never_blank() {
        assert_eq!(display_minutes(0), "0m");
        assert_eq!(display_minutes(90), "1h30m");
    }

    #[test]
    fn parses_compact_strings() {
        assert_eq!(duration_to_minutes("1h30m"), 90);
        assert_eq!(duration_to_minutes("45m"), 45);
        assert_eq!(duration_to_minutes("8h"), 480);
        assert_eq!(duration_to_minutes("30m2h"), 150);
    }

    #[test]
    fn permissive_on_garbage() {
        assert_eq!(duration_to_minutes(""), 0);
        assert_eq!(duration_to_minutes("bogus"), 0);
        assert_eq!(parse_duration("h m"), Duration::default());
    }

    #[test]
    fn no_upper_bound() {
        assert_eq!(parse_duration("30h"), Duration { hours: 30, minutes: 0 });
        assert_eq!(duration_to_minutes("30h"), 1800);
    }

    #[test]
    fn formats_without_zero_parts() {
        assert_eq!(format_duration(Duration { hours: 1, minutes: 30 }), "1h30m");
        assert_eq!(format_duration(Duration { hours: 8, minutes: 0 }), "8h");
        assert_eq!(format_duration(Duration { hours: 0, minutes: 0 }), "");
    }

    #[test]
    fn formatting_is_not_normalising() {
        let formatted = format_duration(Duration { hours: 0, minutes: 90 });
        assert_eq!(formatted, "90m");
        assert_eq!(parse_duration(&formatted), Duration { hours: 0, minutes: 90 });
    }

    #[test]
    fn range_within_a_day() {
        assert_eq!(range_duration_minutes("09:00", "17:00"), 480);
        assert_eq!(range_duration_minutes("09:15", "09:45"), 30);
    }

    #[test]
    fn range_wraps_past_midnight() {
        assert_eq!(range_duration_minutes("23:00", "02:00"), 180);
        assert_eq!(range_duration_minutes("22:00", "06:30"), 510);
    }

    #[test]
    fn range_with_bad_input_is_zero() {
        assert_eq!(range_duration_minutes("", "17:00"), 0);
        assert_eq!(range_duration_minutes("9am", "5pm"), 0);
    }

    #[test]
    fn splits_minutes() {
        assert_eq!(minutes_to_duration(135), Duration { hours: 2, minutes: 15 });
    }
}
