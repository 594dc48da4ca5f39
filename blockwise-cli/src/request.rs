//! JSON request document shared by `blockwise plan` and `POST /schedule`.

use anyhow::{Context, Result};
use blockwise_core::{DayBounds, Goal, ScheduleReport, Scheduler, TaskRecord};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleRequest {
    pub anchor_date: Option<NaiveDate>,
    pub tasks: Vec<TaskRecord>,
    pub goals: Vec<Goal>,
    pub moves: Vec<MoveRequest>,
    pub removals: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub id: String,
    #[serde(
        default,
        with = "blockwise_core::time::hhmm_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub earliest_time: Option<NaiveTime>,
    #[serde(
        default,
        with = "blockwise_core::time::hhmm_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub latest_time: Option<NaiveTime>,
}

impl ScheduleRequest {
    /// Build a scheduler from `stored` tasks followed by this request's
    /// tasks, goals, moves and removals, in that order.
    pub fn build(
        &self,
        stored: &[TaskRecord],
        default_date: NaiveDate,
        bounds: DayBounds,
    ) -> Result<Scheduler> {
        let anchor = self.anchor_date.unwrap_or(default_date);
        let mut scheduler = Scheduler::with_bounds(anchor, bounds);

        for task in stored.iter().chain(&self.tasks) {
            scheduler.add_task(task.clone());
        }
        for goal in &self.goals {
            let added = scheduler
                .add_goal(goal)
                .with_context(|| format!("expand goal '{}'", goal.spec().title))?;
            debug!(title = %goal.spec().title, added, "expanded goal");
        }
        for mv in &self.moves {
            if !scheduler.move_task(&mv.id, mv.earliest_time, mv.latest_time) {
                warn!(id = %mv.id, "move skipped: no such task");
            }
        }
        for id in &self.removals {
            if !scheduler.remove_task(id) {
                warn!(%id, "removal skipped: no such task");
            }
        }
        Ok(scheduler)
    }

    pub fn run(
        &self,
        stored: &[TaskRecord],
        default_date: NaiveDate,
        bounds: DayBounds,
    ) -> Result<ScheduleReport> {
        let scheduler = self.build(stored, default_date, bounds)?;
        let report = scheduler.schedule_report().context("schedule tasks")?;
        Ok(report)
    }
}
