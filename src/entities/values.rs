// 📅 Value normalization for Date and Time entities
//
// Filings mix date and clock formats; the same day or time must resolve to
// one entity, so values are canonicalized before they become natural keys.

use chrono::{NaiveDate, NaiveTime};

/// Normalize a date to ISO `YYYY-MM-DD` (raw value kept if unparseable)
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();

    // Timestamps exported by pandas: "2021-03-04 00:00:00"
    let date_part = raw.split_whitespace().next().unwrap_or(raw);

    // Two-digit years first: "%Y" would read "21" as year 21
    for format in ["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d", "%m-%d-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    raw.to_string()
}

/// Normalize a clock time to 24h `HH:MM` (raw value kept if unparseable)
pub fn normalize_time(raw: &str) -> String {
    let raw = raw.trim();
    let upper = raw.to_uppercase().replace('.', "");

    for format in ["%I:%M %p", "%I:%M%p", "%H:%M", "%H:%M:%S"] {
        if let Ok(time) = NaiveTime::parse_from_str(&upper, format) {
            return time.format("%H:%M").to_string();
        }
    }

    // "7 AM" / "7AM" carry no minutes
    let compact = upper.replace(' ', "");
    if let Some(hour) = compact
        .strip_suffix("AM")
        .or_else(|| compact.strip_suffix("PM"))
        .and_then(|h| h.parse::<u32>().ok())
    {
        let with_minutes = format!("{}:00{}", hour, &compact[compact.len() - 2..]);
        if let Ok(time) = NaiveTime::parse_from_str(&with_minutes, "%I:%M%p") {
            return time.format("%H:%M").to_string();
        }
    }

    raw.to_string()
}
