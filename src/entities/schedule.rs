// 🕒 Weekly schedule parsing
//
// "Hours of Operation (Monday)" holds text like "7:00 AM - 6:00 PM" or
// "Closed". Each present day becomes one ScheduleEntry.

use super::values::normalize_time;
use super::Field;

/// Days of the week in source column order
pub const WEEK: [(&str, Field); 7] = [
    ("Sunday", Field::HoursSunday),
    ("Monday", Field::HoursMonday),
    ("Tuesday", Field::HoursTuesday),
    ("Wednesday", Field::HoursWednesday),
    ("Thursday", Field::HoursThursday),
    ("Friday", Field::HoursFriday),
    ("Saturday", Field::HoursSaturday),
];

/// Marker used in the Schedule natural key for a day with no hours
pub const CLOSED_MARKER: &str = "closed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayHours {
    Closed,
    Open {
        opens: Option<String>,
        closes: Option<String>,
    },
}

impl DayHours {
    /// Parse one day's hours text
    pub fn parse(text: &str) -> DayHours {
        let text = text.trim();

        if text.eq_ignore_ascii_case("closed") {
            return DayHours::Closed;
        }

        // Split on the first range separator only
        let separator = text
            .find(['-', '–'])
            .map(|idx| (idx, text[idx..].chars().next().map_or(1, char::len_utf8)));

        match separator {
            Some((idx, width)) => {
                let opens = text[..idx].trim();
                let closes = text[idx + width..].trim();
                DayHours::Open {
                    opens: (!opens.is_empty()).then(|| normalize_time(opens)),
                    closes: (!closes.is_empty()).then(|| normalize_time(closes)),
                }
            }
            None => DayHours::Open {
                opens: None,
                closes: None,
            },
        }
    }

    /// Status entity value for this day
    pub fn status(&self) -> &'static str {
        match self {
            DayHours::Closed => "Closed",
            DayHours::Open { .. } => "Open",
        }
    }
}
