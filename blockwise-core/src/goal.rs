//! Goal expansion: turn "spend N minutes on X" into concrete flexible blocks.
//!
//! Expansion only produces records. It never positions them; the day placer
//! does that on the next scheduling run.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::GoalError;
use crate::gap::Interval;
use crate::task::{Priority, TaskKind, TaskRecord, new_task_id};
use crate::time::{DayBounds, parse_date, plus_minutes};

pub const REST_TITLE: &str = "Rest";

/// Parameters shared by every goal shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSpec {
    pub title: String,
    /// Minutes to distribute.
    pub total_minutes: i64,
    /// Largest single block, in minutes.
    pub max_block_size: i64,
    /// Rest inserted after each block while work remains (0 = none).
    #[serde(default)]
    pub rest_between: i64,
    #[serde(default)]
    pub priority: Priority,
}

impl GoalSpec {
    pub fn new(title: impl Into<String>, total_minutes: i64, max_block_size: i64) -> Self {
        Self {
            title: title.into(),
            total_minutes,
            max_block_size,
            rest_between: 0,
            priority: Priority::Medium,
        }
    }

    pub fn with_rest(mut self, minutes: i64) -> Self {
        self.rest_between = minutes;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn validate(&self) -> Result<(), GoalError> {
        if self.total_minutes <= 0 {
            return Err(GoalError::NonPositiveTotal(self.total_minutes));
        }
        if self.max_block_size <= 0 {
            return Err(GoalError::NonPositiveBlockSize(self.max_block_size));
        }
        if self.rest_between < 0 {
            return Err(GoalError::NegativeRest(self.rest_between));
        }
        Ok(())
    }
}

/// Inclusive calendar range, never inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, GoalError> {
        if end < start {
            return Err(GoalError::InvertedRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, GoalError> {
        let s = parse_date(start).map_err(|_| GoalError::InvalidDate(start.to_string()))?;
        let e = parse_date(end).map_err(|_| GoalError::InvalidDate(end.to_string()))?;
        Self::new(s, e)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    /// Number of days, both ends included; at least 1.
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// A goal as it appears in a request document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Goal {
    /// Fill one day around its fixed appointments.
    Hybrid {
        #[serde(flatten)]
        spec: GoalSpec,
        /// Defaults to the scheduler's anchor date.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date: Option<NaiveDate>,
    },
    /// Spread evenly over an inclusive date range.
    Periodic {
        #[serde(flatten)]
        spec: GoalSpec,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

impl Goal {
    pub fn spec(&self) -> &GoalSpec {
        match self {
            Goal::Hybrid { spec, .. } | Goal::Periodic { spec, .. } => spec,
        }
    }
}

/// Split `total` minutes over `days` days; the first `total % days` days get
/// one extra minute.
pub fn daily_quotas(total: i64, days: i64) -> Vec<i64> {
    if days <= 0 {
        return Vec::new();
    }
    (0..days).map(|i| quota_for_day(total, days, i)).collect()
}

/// Quota of day `index` (0-based) when `total` is split over `days` days.
fn quota_for_day(total: i64, days: i64, index: i64) -> i64 {
    total / days + i64::from(index < total % days)
}

/// Expand a goal for a single day.
///
/// `fixed` are the day's fixed appointments; gaps between them bound how
/// large each emitted block can be.
pub fn expand_hybrid(
    spec: &GoalSpec,
    date: NaiveDate,
    fixed: &[Interval],
    bounds: DayBounds,
) -> Result<Vec<TaskRecord>, GoalError> {
    spec.validate()?;
    Ok(fill_day(spec, spec.total_minutes, date, fixed, bounds))
}

/// Expand a goal over every day of `range`.
///
/// `fixed_on` supplies each day's fixed appointments. Every day is expanded
/// independently, so rests never span two days.
pub fn expand_periodic<F>(
    spec: &GoalSpec,
    range: DateRange,
    mut fixed_on: F,
    bounds: DayBounds,
) -> Result<Vec<TaskRecord>, GoalError>
where
    F: FnMut(NaiveDate) -> Vec<Interval>,
{
    spec.validate()?;

    let days = range.day_count();
    let mut out = Vec::new();
    for (index, day) in (0..days).zip(range.days()) {
        let quota = quota_for_day(spec.total_minutes, days, index);
        if quota == 0 {
            // Quotas only shrink from here on.
            break;
        }
        let fixed = fixed_on(day);
        out.extend(fill_day(spec, quota, day, &fixed, bounds));
    }
    Ok(out)
}

fn fill_day(
    spec: &GoalSpec,
    quota: i64,
    date: NaiveDate,
    fixed: &[Interval],
    bounds: DayBounds,
) -> Vec<TaskRecord> {
    let mut fixed = fixed.to_vec();
    fixed.sort_by_key(|iv| iv.start);

    let mut out = Vec::new();
    let mut remaining = quota;
    let mut cursor = bounds.anchor_on(date);

    let block = |minutes: i64| {
        TaskRecord::new(new_task_id(), spec.title.clone())
            .with_duration(minutes)
            .with_priority(spec.priority)
            .with_kind(TaskKind::GoalBlock)
            .on_date(date)
    };
    let rest = || {
        TaskRecord::new(new_task_id(), REST_TITLE)
            .with_duration(spec.rest_between)
            .with_priority(Priority::Low)
            .with_kind(TaskKind::Rest)
            .on_date(date)
    };

    for iv in &fixed {
        let mut gap = (iv.start - cursor).num_minutes();
        while remaining > 0 && gap > 0 {
            let size = spec.max_block_size.min(remaining).min(gap);
            out.push(block(size));
            remaining -= size;
            gap -= size;
            if spec.rest_between > 0 && remaining > 0 {
                out.push(rest());
                cursor = plus_minutes(cursor, spec.rest_between).unwrap_or(NaiveDateTime::MAX);
            }
        }
        cursor = cursor.max(iv.end);
    }

    while remaining > 0 {
        let size = spec.max_block_size.min(remaining);
        out.push(block(size));
        remaining -= size;
        if spec.rest_between > 0 && remaining > 0 {
            out.push(rest());
        }
    }

    out
}
