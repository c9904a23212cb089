use super::{CondoError, Result};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A billing month. Payment cells are addressed by (apartment, period).
///
/// Deserialization goes through [`Period::new`], so a decoded period always
/// has a month in `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct Period {
    pub year: i32,
    pub month: u8,
}

#[derive(Deserialize)]
struct RawPeriod {
    year: i32,
    month: u8,
}

impl TryFrom<RawPeriod> for Period {
    type Error = CondoError;

    fn try_from(raw: RawPeriod) -> Result<Self> {
        Period::new(raw.year, raw.month)
    }
}

impl Period {
    pub fn new(year: i32, month: u8) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(CondoError::validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The current calendar month in UTC.
    pub fn current() -> Self {
        let now = Utc::now();
        Self {
            year: now.year(),
            // chrono guarantees 1..=12
            month: now.month() as u8,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Identity of the thing a speculative edit targets.
///
/// Most edits target a whole entity (`period == None`). Payment cells use the
/// composite `(entity, period)` so edits to different months of the same
/// apartment never conflict.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditKey<K> {
    pub entity: K,
    pub period: Option<Period>,
}

impl<K> EditKey<K> {
    pub fn entity(entity: K) -> Self {
        Self {
            entity,
            period: None,
        }
    }

    pub fn cell(entity: K, period: Period) -> Self {
        Self {
            entity,
            period: Some(period),
        }
    }
}

impl<K: fmt::Display> fmt::Display for EditKey<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.period {
            Some(period) => write!(f, "{}@{}", self.entity, period),
            None => write!(f, "{}", self.entity),
        }
    }
}
