//! Fixed one-hour booking slots and the ISO-8601 parsing that produces them.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Length of every slot. There is deliberately no way to configure it.
pub const SLOT_MINUTES: i64 = 60;

/// Offset-aware layouts, tried after RFC 3339.
const AWARE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
];

/// Layouts without an offset.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotParseError {
    #[error("no date-time was given")]
    Empty,

    #[error("invalid ISO-8601 date-time: '{0}'")]
    Invalid(String),

    #[error("date-time is out of the supported range: '{0}'")]
    OutOfRange(String),
}

/// A contiguous one-hour window identified by its start instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    naive_input: bool,
}

impl TimeSlot {
    /// Slot starting at an already-resolved instant, or `None` when its end
    /// falls outside the representable range.
    pub fn starting_at(start: DateTime<FixedOffset>) -> Option<Self> {
        Self::build(start, false)
    }

    fn build(start: DateTime<FixedOffset>, naive_input: bool) -> Option<Self> {
        let end = start.checked_add_signed(Duration::minutes(SLOT_MINUTES))?;
        Some(Self {
            start,
            end,
            naive_input,
        })
    }

    /// Parse an ISO-8601 date-time.
    ///
    /// Accepts `T` or a space between date and time, optional seconds and
    /// fractional seconds, `Z`, `+hh:mm` or `+hhmm` offsets, and a bare date
    /// (midnight). Input without an offset is placed at `naive_offset`; the
    /// offset of aware input is taken as given.
    pub fn parse(input: &str, naive_offset: FixedOffset) -> Result<Self, SlotParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SlotParseError::Empty);
        }

        let normalized = normalize(trimmed);
        let out_of_range = || SlotParseError::OutOfRange(trimmed.to_string());

        if let Ok(start) = DateTime::parse_from_rfc3339(&normalized) {
            return Self::starting_at(start).ok_or_else(out_of_range);
        }

        for format in AWARE_FORMATS {
            if let Ok(start) = DateTime::parse_from_str(&normalized, format) {
                return Self::starting_at(start).ok_or_else(out_of_range);
            }
        }

        let naive = NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&normalized, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
            .ok_or_else(|| SlotParseError::Invalid(trimmed.to_string()))?;

        let start = naive
            .and_local_timezone(naive_offset)
            .single()
            .ok_or_else(|| SlotParseError::Invalid(trimmed.to_string()))?;

        Self::build(start, true).ok_or_else(out_of_range)
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    /// Exclusive end of the slot, exactly one hour after the start.
    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    /// Whether the text this slot came from carried no offset.
    pub fn was_naive(&self) -> bool {
        self.naive_input
    }

    /// Short clock label, e.g. `10:00 AM`.
    pub fn clock_label(&self) -> String {
        self.start.format("%I:%M %p").to_string()
    }

    /// Long label, e.g. `Wednesday, January 01 at 10:00 AM`.
    pub fn long_label(&self) -> String {
        self.start.format("%A, %B %d at %I:%M %p").to_string()
    }
}

fn normalize(input: &str) -> String {
    let mut text = input.to_string();

    // Date and time separated by a space, as in `2025-01-01 10:00`.
    if text.len() > 10 && text.is_char_boundary(10) && text.is_char_boundary(11) && &text[10..11] == " " {
        text.replace_range(10..11, "T");
    }

    if let Some(stripped) = text.strip_suffix(['Z', 'z']) {
        text = format!("{stripped}+00:00");
    }

    text
}

/// Parse a UTC offset such as `+05:30`, `-0800`, `Z` or `UTC`.
pub fn parse_utc_offset(text: &str) -> Option<FixedOffset> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("z") || text.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match text.chars().next()? {
        '+' => (1, &text[1..]),
        '-' => (-1, &text[1..]),
        _ => return None,
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
