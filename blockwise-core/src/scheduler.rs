//! Multi-day orchestrator: owns the working task set and turns it into an
//! ordered, placed schedule.
//!
//! A `Scheduler` is meant to be built fresh for each request, seeded with the
//! caller's stored tasks, and discarded after `schedule()`. It has no internal
//! locking; share one across callers only behind a mutex.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::info;

use crate::error::{GoalError, ScheduleError};
use crate::gap::Interval;
use crate::goal::{DateRange, Goal, GoalSpec, expand_hybrid, expand_periodic};
use crate::placer::place_day;
use crate::task::TaskRecord;
use crate::time::DayBounds;

/// Output of a scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleReport {
    /// Placed records ordered by `(date, start_time)`.
    pub scheduled: Vec<TaskRecord>,
    /// Flexible tasks that found no slot, in the order they were dropped.
    pub unscheduled: Vec<TaskRecord>,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    anchor_date: NaiveDate,
    bounds: DayBounds,
    tasks: Vec<TaskRecord>,
}

impl Scheduler {
    pub fn new(anchor_date: NaiveDate) -> Self {
        Self::with_bounds(anchor_date, DayBounds::default())
    }

    pub fn with_bounds(anchor_date: NaiveDate, bounds: DayBounds) -> Self {
        Self {
            anchor_date,
            bounds,
            tasks: Vec::new(),
        }
    }

    pub fn anchor_date(&self) -> NaiveDate {
        self.anchor_date
    }

    pub fn bounds(&self) -> DayBounds {
        self.bounds
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    /// Add a task, tagging it with the anchor date if it has none.
    /// Returns the task id.
    pub fn add_task(&mut self, mut task: TaskRecord) -> String {
        if task.date.is_none() {
            task.date = Some(self.anchor_date);
        }
        let id = task.id.clone();
        self.tasks.push(task);
        id
    }

    /// Remove every task with `id`. Returns true if any existed.
    pub fn remove_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Update the window of the first task with `id`; `None` leaves a bound
    /// unchanged. Takes effect on the next `schedule()`.
    pub fn move_task(
        &mut self,
        id: &str,
        earliest: Option<NaiveTime>,
        latest: Option<NaiveTime>,
    ) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if earliest.is_some() {
            task.earliest_time = earliest;
        }
        if latest.is_some() {
            task.latest_time = latest;
        }
        true
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Expand a single-day goal on the anchor date. Returns how many records were added.
    pub fn add_goal_hybrid(&mut self, spec: &GoalSpec) -> Result<usize, GoalError> {
        self.add_goal_hybrid_on(spec, self.anchor_date)
    }

    pub fn add_goal_hybrid_on(
        &mut self,
        spec: &GoalSpec,
        date: NaiveDate,
    ) -> Result<usize, GoalError> {
        let fixed = self.fixed_intervals_on(date);
        let records = expand_hybrid(spec, date, &fixed, self.bounds)?;
        Ok(self.extend(records))
    }

    /// Expand a goal across an inclusive date range.
    pub fn add_goal_periodic(
        &mut self,
        spec: &GoalSpec,
        range: DateRange,
    ) -> Result<usize, GoalError> {
        let records = expand_periodic(
            spec,
            range,
            |day| self.fixed_intervals_on(day),
            self.bounds,
        )?;
        Ok(self.extend(records))
    }

    pub fn add_goal(&mut self, goal: &Goal) -> Result<usize, GoalError> {
        match goal {
            Goal::Hybrid { spec, date } => {
                self.add_goal_hybrid_on(spec, date.unwrap_or(self.anchor_date))
            }
            Goal::Periodic {
                spec,
                start_date,
                end_date,
            } => self.add_goal_periodic(spec, DateRange::new(*start_date, *end_date)?),
        }
    }

    /// Place every task and return the ordered schedule.
    ///
    /// Fails only when some record is malformed; a task that does not fit is
    /// simply absent from the result.
    pub fn schedule(&self) -> Result<Vec<TaskRecord>, ScheduleError> {
        Ok(self.schedule_report()?.scheduled)
    }

    /// Like [`Scheduler::schedule`], also listing the tasks that were dropped.
    pub fn schedule_report(&self) -> Result<ScheduleReport, ScheduleError> {
        for task in &self.tasks {
            task.validate()?;
        }

        let mut by_date: BTreeMap<NaiveDate, Vec<&TaskRecord>> = BTreeMap::new();
        for task in &self.tasks {
            by_date
                .entry(task.date.unwrap_or(self.anchor_date))
                .or_default()
                .push(task);
        }

        let mut report = ScheduleReport::default();
        for (date, tasks) in by_date {
            let outcome = place_day(date, &tasks, self.bounds);
            info!(
                %date,
                placed = outcome.placed.len(),
                unscheduled = outcome.unscheduled.len(),
                "scheduled day"
            );
            report.scheduled.extend(outcome.placed);
            report.unscheduled.extend(outcome.unscheduled);
        }

        report.scheduled.sort_by_key(|t| (t.date, t.start_time));
        Ok(report)
    }

    fn fixed_intervals_on(&self, date: NaiveDate) -> Vec<Interval> {
        self.tasks
            .iter()
            .filter(|t| t.fixed && t.date.unwrap_or(self.anchor_date) == date)
            .filter_map(|t| {
                t.start_time
                    .map(|start| Interval::new(date.and_time(start), t.duration))
            })
            .collect()
    }

    fn extend(&mut self, records: Vec<TaskRecord>) -> usize {
        let n = records.len();
        for r in records {
            self.add_task(r);
        }
        n
    }
}
