use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognised timestamp {0:?}")]
pub struct TimestampError(pub String);

/// Parse a server timestamp. `""` and `"-"` mean "no timestamp".
///
/// Accepts RFC 3339 and the naive `YYYY-MM-DD HH:MM[:SS]` forms (read as UTC).
pub fn parse_timestamp(raw: &str) -> Result<Option<DateTime<Utc>>, TimestampError> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Some(naive.and_utc()));
        }
    }
    Err(TimestampError(raw.to_owned()))
}

/// Format a datetime according to the configured date format.
///
/// `"relative"` displays times like `"2h"`, `"3d"`, `"1w"`; anything else is
/// a `strftime` pattern.
pub(crate) fn format_date(dt: &DateTime<Utc>, date_format: &str) -> String {
    if date_format.is_empty() || date_format == "relative" {
        format_relative_time(dt, Utc::now())
    } else {
        dt.format(date_format).to_string()
    }
}

/// Like [`format_date`], with a placeholder for missing timestamps.
pub(crate) fn format_optional_date(
    dt: Option<&DateTime<Utc>>,
    date_format: &str,
    placeholder: &str,
) -> String {
    dt.map_or_else(|| placeholder.to_owned(), |d| format_date(d, date_format))
}

fn format_relative_time(dt: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(dt);

    // Queue finish dates lie in the future.
    let (duration, suffix) = if duration.num_seconds() < 0 {
        (-duration, " left")
    } else {
        (duration, "")
    };

    let minutes = duration.num_minutes();
    if minutes < 1 {
        return "now".to_owned();
    }
    if minutes < 60 {
        return format!("{minutes}m{suffix}");
    }
    let hours = duration.num_hours();
    if hours < 24 {
        return format!("{hours}h{suffix}");
    }
    let days = duration.num_days();
    if days < 7 {
        return format!("{days}d{suffix}");
    }
    if days < 30 {
        return format!("{}w{suffix}", days / 7);
    }
    format!("{}mo{suffix}", days / 30)
}

/// Roman numeral for a skill level (1-5); level 0 renders as `"0"`.
pub fn roman_level(level: u8) -> &'static str {
    match level {
        0 => "0",
        1 => "I",
        2 => "II",
        3 => "III",
        4 => "IV",
        5 => "V",
        _ => "?",
    }
}

/// Split a trailing level numeral off a queued skill name:
/// `"Cybernetics V"` → `("Cybernetics", Some(5))`.
pub fn split_roman_suffix(name: &str) -> (&str, Option<u8>) {
    let name = name.trim();
    if let Some((base, suffix)) = name.rsplit_once(' ')
        && let Some(level) = (1..=5).find(|&l| roman_level(l) == suffix)
        && !base.trim().is_empty()
    {
        return (base.trim_end(), Some(level));
    }
    (name, None)
}

/// Format skill points with thousands separators: `1234567` → `"1,234,567"`.
pub fn format_sp(sp: u64) -> String {
    let digits = sp.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Drop markup tags and collapse whitespace.
pub(crate) fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The last `NN%` / `NN.N%` figure in a rendered fragment.
pub(crate) fn last_percentage(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut found = None;
    for (idx, _) in text.match_indices('%') {
        let mut start = idx;
        while start > 0 && (bytes[start - 1].is_ascii_digit() || bytes[start - 1] == b'.') {
            start -= 1;
        }
        if start < idx
            && let Ok(v) = text[start..idx].parse::<f64>()
        {
            found = Some(v);
        }
    }
    found
}

/// Numeric path segment following `marker`, e.g. `.../switch_alarm/42/` → 42.
pub(crate) fn path_id_after(text: &str, marker: &str) -> Option<u64> {
    let rest = &text[text.find(marker)? + marker.len()..];
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Truncate to a display width, appending `…` when shortened.
pub(crate) fn truncate_to_width(text: &str, width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_owned();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('\u{2026}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn timestamps_in_server_forms() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-01T12:00:00Z"), Ok(Some(expected)));
        assert_eq!(
            parse_timestamp("2025-03-01T13:00:00+01:00"),
            Ok(Some(expected))
        );
        assert_eq!(parse_timestamp("2025-03-01 12:00"), Ok(Some(expected)));
        assert_eq!(parse_timestamp("-"), Ok(None));
        assert_eq!(parse_timestamp("  "), Ok(None));
        assert!(parse_timestamp("soon").is_err());
    }

    #[test]
    fn relative_time_past_and_future() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        assert_eq!(format_relative_time(&(now - Duration::hours(3)), now), "3h");
        assert_eq!(format_relative_time(&(now - Duration::days(9)), now), "1w");
        assert_eq!(
            format_relative_time(&(now + Duration::days(2)), now),
            "2d left"
        );
        assert_eq!(format_relative_time(&now, now), "now");
    }

    #[test]
    fn missing_date_uses_placeholder() {
        assert_eq!(
            format_optional_date(None, "%Y", "not updated"),
            "not updated"
        );
    }

    #[test]
    fn sp_separators() {
        assert_eq!(format_sp(0), "0");
        assert_eq!(format_sp(999), "999");
        assert_eq!(format_sp(256_000), "256,000");
        assert_eq!(format_sp(1_234_567), "1,234,567");
    }

    #[test]
    fn roman_levels() {
        assert_eq!(roman_level(4), "IV");
        assert_eq!(roman_level(0), "0");
    }

    #[test]
    fn roman_suffix_is_split_off() {
        assert_eq!(split_roman_suffix("Cybernetics V"), ("Cybernetics", Some(5)));
        assert_eq!(
            split_roman_suffix("Spaceship Command IV"),
            ("Spaceship Command", Some(4))
        );
        assert_eq!(split_roman_suffix("Drones"), ("Drones", None));
        assert_eq!(split_roman_suffix("Drone Interfacing"), ("Drone Interfacing", None));
        assert_eq!(split_roman_suffix("V"), ("V", None));
    }

    #[test]
    fn html_is_stripped() {
        assert_eq!(
            strip_html("<img src='a.png'><span class=\"x\">Farmer\n One</span><i></i>"),
            "Farmer One"
        );
    }

    #[test]
    fn percentage_and_path_id_extraction() {
        assert_eq!(last_percentage("width: 12.5%; <b>13%</b>"), Some(13.0));
        assert_eq!(last_percentage("no figure %"), None);
        assert_eq!(path_id_after("/skillfarm/switch_alarm/42/", "switch_alarm/"), Some(42));
        assert_eq!(path_id_after("/skillfarm/", "switch_alarm/"), None);
    }

    #[test]
    fn truncation_respects_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("Farmer Number One", 8), "Farmer \u{2026}");
    }
}
