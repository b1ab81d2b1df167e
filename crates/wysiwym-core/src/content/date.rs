//! Date values with optional begin and end components.

use crate::types::WysiwymError;
use serde::{Deserialize, Serialize};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// How a date is realised in text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateKind {
    /// A single day.
    Point,
    /// A span with an end.
    Range,
    /// A month or a year.
    Period,
    /// A decade or a century.
    Era,
}

impl DateKind {
    /// Preposition introducing a date of this kind.
    #[must_use]
    pub fn preposition(&self) -> &'static str {
        match self {
            DateKind::Point => "on",
            DateKind::Range => "between",
            DateKind::Period => "in",
            DateKind::Era => "during",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DateKind::Point => "point",
            DateKind::Range => "range",
            DateKind::Period => "period",
            DateKind::Era => "era",
        }
    }
}

/// Day, month and year of one end of a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateParts {
    #[serde(default)]
    pub day: Option<u8>,
    #[serde(default)]
    pub month: Option<u8>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl DateParts {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.day.is_none() && self.month.is_none() && self.year.is_none()
    }

    fn validate(&self) -> Result<(), WysiwymError> {
        if let Some(day) = self.day.filter(|d| !(1..=31).contains(d)) {
            return Err(WysiwymError::InvalidValue(format!("day {day}")));
        }
        if let Some(month) = self.month.filter(|m| !(1..=12).contains(m)) {
            return Err(WysiwymError::InvalidValue(format!("month {month}")));
        }
        Ok(())
    }

    fn month_name(&self) -> Option<&'static str> {
        self.month
            .and_then(|m| MONTHS.get(usize::from(m).checked_sub(1)?))
            .copied()
    }

    fn text(&self) -> String {
        let mut words = Vec::new();
        if let Some(day) = self.day {
            words.push(day.to_string());
        }
        if let Some(month) = self.month_name() {
            words.push(month.to_string());
        }
        if let Some(year) = self.year {
            words.push(year.to_string());
        }
        words.join(" ")
    }
}

/// A date node value.
///
/// Every component is optional; which ones are set decides the
/// [`DateKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateValue {
    #[serde(default)]
    pub begin: DateParts,
    #[serde(default)]
    pub end: DateParts,
    /// First year of a decade, e.g. 1990.
    #[serde(default)]
    pub decade: Option<i32>,
    /// Century number, e.g. 19 for the 1800s.
    #[serde(default)]
    pub century: Option<i32>,
}

impl DateValue {
    /// A single day.
    pub fn point(day: u8, month: u8, year: i32) -> Result<Self, WysiwymError> {
        Self {
            begin: DateParts {
                day: Some(day),
                month: Some(month),
                year: Some(year),
            },
            ..Self::default()
        }
        .validated()
    }

    /// A whole year.
    #[must_use]
    pub fn year(year: i32) -> Self {
        Self {
            begin: DateParts {
                year: Some(year),
                ..DateParts::default()
            },
            ..Self::default()
        }
    }

    /// A month of a year.
    pub fn month(month: u8, year: i32) -> Result<Self, WysiwymError> {
        Self {
            begin: DateParts {
                month: Some(month),
                year: Some(year),
                ..DateParts::default()
            },
            ..Self::default()
        }
        .validated()
    }

    /// A span between two (partial) dates.
    pub fn range(begin: DateParts, end: DateParts) -> Result<Self, WysiwymError> {
        Self {
            begin,
            end,
            ..Self::default()
        }
        .validated()
    }

    #[must_use]
    pub fn decade(first_year: i32) -> Self {
        Self {
            decade: Some(first_year),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn century(century: i32) -> Self {
        Self {
            century: Some(century),
            ..Self::default()
        }
    }

    /// Check day and month ranges of both ends.
    pub fn validated(self) -> Result<Self, WysiwymError> {
        self.begin.validate()?;
        self.end.validate()?;
        Ok(self)
    }

    /// Classify the date; `None` when nothing is set.
    #[must_use]
    pub fn kind(&self) -> Option<DateKind> {
        if !self.end.is_empty() {
            Some(DateKind::Range)
        } else if self.begin.day.is_some() {
            Some(DateKind::Point)
        } else if self.begin.month.is_some() || self.begin.year.is_some() {
            Some(DateKind::Period)
        } else if self.decade.is_some() || self.century.is_some() {
            Some(DateKind::Era)
        } else {
            None
        }
    }

    /// The preposition phrase for this date.
    #[must_use]
    pub fn describe(&self) -> Option<String> {
        let kind = self.kind()?;
        let body = match kind {
            DateKind::Point | DateKind::Period => self.begin.text(),
            DateKind::Range if self.begin.is_empty() => {
                return Some(format!("by {}", self.end.text()));
            }
            DateKind::Range => format!("{} and {}", self.begin.text(), self.end.text()),
            DateKind::Era => match (self.decade, self.century) {
                (Some(decade), _) => format!("the {decade}s"),
                (None, Some(century)) => format!("the {} century", numeric_ordinal(i64::from(century))),
                (None, None) => return None,
            },
        };
        Some(format!("{} {}", kind.preposition(), body))
    }
}

/// `1st`, `2nd`, `11th`, `23rd`.
pub(crate) fn numeric_ordinal(n: i64) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
