// src/status/time_format.rs - ETL and ETA rendering
use std::fmt::{Display, Write};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeDelta, TimeZone};

use crate::template::{render, FieldValue, FormatError};

/// A duration split into clock components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeParts {
    pub fn from_seconds(total: u64) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }

    fn fields(&self) -> [(&'static str, FieldValue); 3] {
        let int = |v: u64| FieldValue::Int(i64::try_from(v).unwrap_or(i64::MAX));
        [
            ("hours", int(self.hours)),
            ("minutes", int(self.minutes)),
            ("seconds", int(self.seconds)),
        ]
    }
}

/// Render a time-left value through an ETL format such as
/// `{hours:02d}:{minutes:02d}:{seconds:02d}`.
pub fn format_time_left(seconds: Option<u64>, format: &str) -> Result<String, FormatError> {
    let seconds = seconds.ok_or_else(|| FormatError::MissingValue("printTimeLeft".to_string()))?;
    render(format, &TimeParts::from_seconds(seconds).fields())
}

/// Render `now + seconds` with a strftime pattern.
pub fn format_eta<Tz>(now: DateTime<Tz>, seconds: Option<u64>, pattern: &str) -> Result<String, FormatError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let seconds = seconds.ok_or_else(|| FormatError::MissingValue("ETA".to_string()))?;

    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(FormatError::InvalidPattern(pattern.to_string()));
    }

    let eta = i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| FormatError::OutOfRange("ETA".to_string()))?;

    let mut out = String::new();
    write!(out, "{}", eta.format_with_items(items.iter()))
        .map_err(|_| FormatError::InvalidPattern(pattern.to_string()))?;
    Ok(out)
}
