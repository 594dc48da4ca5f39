//! Task record model: the unit the engine places on a day.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ScheduleError};

/// Minutes assumed when a serialized record carries no duration.
pub const DEFAULT_DURATION: i64 = 60;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Priority {
    /// Placed first, evicted last.
    High = 0,
    #[default]
    Medium = 1,
    /// Placed last, evicted first.
    Low = 2,
}

impl Priority {
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// True when `self` may be evicted to make room for `other`.
    pub fn yields_to(self, other: Priority) -> bool {
        self.rank() > other.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(ParseError::Priority(s.to_string())),
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Where a record came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Task,
    /// A slice of an expanded goal.
    GoalBlock,
    /// Spacing inserted between goal blocks.
    Rest,
}

pub fn new_task_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_duration() -> i64 {
    DEFAULT_DURATION
}

fn is_default_kind(kind: &TaskKind) -> bool {
    *kind == TaskKind::Task
}

/// A schedulable task.
///
/// Input records leave `start_time`/`end_time` empty unless fixed; records
/// emitted by a scheduling run always carry both plus `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default = "new_task_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,

    /// Minutes.
    #[serde(default = "default_duration")]
    pub duration: i64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub fixed: bool,

    #[serde(default, with = "crate::time::hhmm_opt", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "crate::time::hhmm_opt", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,

    /// Window bounds for flexible tasks.
    #[serde(default, with = "crate::time::hhmm_opt", skip_serializing_if = "Option::is_none")]
    pub earliest_time: Option<NaiveTime>,
    #[serde(default, with = "crate::time::hhmm_opt", skip_serializing_if = "Option::is_none")]
    pub latest_time: Option<NaiveTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "is_default_kind")]
    pub kind: TaskKind,
}

impl TaskRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            duration: DEFAULT_DURATION,
            priority: Priority::Medium,
            fixed: false,
            start_time: None,
            end_time: None,
            earliest_time: None,
            latest_time: None,
            date: None,
            kind: TaskKind::Task,
        }
    }

    /// A fixed appointment pinned at `start`.
    pub fn fixed(
        id: impl Into<String>,
        title: impl Into<String>,
        start: NaiveTime,
        minutes: i64,
    ) -> Self {
        Self::new(id, title).with_duration(minutes).fixed_at(start)
    }

    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration = minutes;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_window(mut self, earliest: Option<NaiveTime>, latest: Option<NaiveTime>) -> Self {
        self.earliest_time = earliest;
        self.latest_time = latest;
        self
    }

    pub fn fixed_at(mut self, start: NaiveTime) -> Self {
        self.fixed = true;
        self.start_time = Some(start);
        self
    }

    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_kind(mut self, kind: TaskKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.duration <= 0 {
            return Err(ScheduleError::InvalidTask {
                id: self.id.clone(),
                reason: format!("duration must be > 0 minutes (got {})", self.duration),
            });
        }
        if self.fixed && self.start_time.is_none() {
            return Err(ScheduleError::MissingStartTime {
                id: self.id.clone(),
                title: self.title.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_hhmm;

    #[test]
    fn priority_orders_high_first() {
        assert!(Priority::High < Priority::Medium);
        assert!(Priority::Medium < Priority::Low);
        assert!(Priority::Low.yields_to(Priority::Medium));
        assert!(!Priority::Medium.yields_to(Priority::Medium));
        assert!(!Priority::High.yields_to(Priority::Low));
    }

    #[test]
    fn unknown_priority_is_rejected() {
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(
            "urgent".parse::<Priority>(),
            Err(ParseError::Priority("urgent".into()))
        );
    }

    #[test]
    fn json_priority_goes_through_the_same_parser() {
        let t: TaskRecord = serde_json::from_str(r#"{"title": "A", "priority": "HIGH"}"#).unwrap();
        assert_eq!(t.priority, Priority::High);
        assert_eq!(serde_json::to_value(t.priority).unwrap(), "high");

        let err = serde_json::from_str::<TaskRecord>(r#"{"title": "A", "priority": "urgent"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("urgent"));
    }

    #[test]
    fn fixed_without_start_is_invalid() {
        let mut t = TaskRecord::new("exam", "Exam");
        t.fixed = true;
        assert!(matches!(
            t.validate(),
            Err(ScheduleError::MissingStartTime { ref id, .. }) if id == "exam"
        ));
    }

    #[test]
    fn non_positive_duration_is_invalid() {
        let t = TaskRecord::new("t", "zero").with_duration(0);
        assert!(matches!(t.validate(), Err(ScheduleError::InvalidTask { .. })));
    }

    #[test]
    fn deserializes_sparse_record_with_defaults() {
        let t: TaskRecord = serde_json::from_str(r#"{"title": "Chores"}"#).unwrap();
        assert_eq!(t.duration, DEFAULT_DURATION);
        assert_eq!(t.priority, Priority::Medium);
        assert!(!t.fixed);
        assert!(!t.id.is_empty());
        assert_eq!(t.kind, TaskKind::Task);
    }

    #[test]
    fn serializes_times_as_hhmm() {
        let t = TaskRecord::fixed("exam", "Exam", parse_hhmm("12:00").unwrap(), 60);
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["start_time"], "12:00");
        assert_eq!(v["priority"], "medium");
        assert!(v.get("end_time").is_none());
        assert!(v.get("kind").is_none());
    }
}
