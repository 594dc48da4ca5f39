//! Time utilities: naive wall-clock "HH:MM" times and ISO dates.
//!
//! Everything here is zone-less. A day is a calendar date plus the window
//! between its anchor (where scheduling starts) and its end.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

const HHMM: &str = "%H:%M";

pub const DEFAULT_ANCHOR: NaiveTime = match NaiveTime::from_hms_opt(9, 0, 0) {
    Some(t) => t,
    None => panic!("09:00 is a valid time"),
};

pub const DEFAULT_DAY_END: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 0) {
    Some(t) => t,
    None => panic!("23:59 is a valid time"),
};

/// Parse a wall-clock time like "09:30".
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, ParseError> {
    NaiveTime::parse_from_str(s.trim(), HHMM).map_err(|_| ParseError::Time(s.to_string()))
}

/// Format a wall-clock time as "HH:MM".
pub fn format_hhmm(t: NaiveTime) -> String {
    t.format(HHMM).to_string()
}

/// Parse an ISO calendar date like "2025-07-01".
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| ParseError::Date(s.to_string()))
}

/// Add whole minutes to a point in time; `None` if the result is not representable.
pub fn plus_minutes(at: NaiveDateTime, minutes: i64) -> Option<NaiveDateTime> {
    at.checked_add_signed(TimeDelta::try_minutes(minutes)?)
}

/// Where a day's scheduling starts and the last minute it may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBounds {
    /// Default earliest start for flexible tasks, and the cursor origin for goal expansion.
    #[serde(with = "hhmm")]
    pub anchor: NaiveTime,
    /// Default latest end for flexible tasks.
    #[serde(with = "hhmm")]
    pub day_end: NaiveTime,
}

impl Default for DayBounds {
    fn default() -> Self {
        Self {
            anchor: DEFAULT_ANCHOR,
            day_end: DEFAULT_DAY_END,
        }
    }
}

impl DayBounds {
    pub fn anchor_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.anchor)
    }

    pub fn end_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.day_end)
    }
}

/// serde adapter for `NaiveTime` as "HH:MM".
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_hhmm(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_hhmm(&raw).map_err(serde::de::Error::custom)
    }
}

/// serde adapter for `Option<NaiveTime>` as an optional "HH:MM".
pub mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_str(&super::format_hhmm(*t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|s| super::parse_hhmm(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
