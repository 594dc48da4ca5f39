//! Day placer: commits one day's fixed tasks, then seats flexible tasks in
//! priority order.
//!
//! All working state lives in a [`DayContext`] built for the day and thrown
//! away afterwards, so nothing leaks between days or between runs.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::displace;
use crate::gap::{Interval, find_gap};
use crate::task::TaskRecord;
use crate::time::{DayBounds, plus_minutes};

/// A task committed to the day.
#[derive(Debug, Clone)]
pub(crate) struct Placed {
    /// Commit order; identifies the block across evictions.
    pub seq: u64,
    pub interval: Interval,
    pub task: TaskRecord,
}

/// Per-day working state: the anchor and the committed blocks.
#[derive(Debug)]
pub struct DayContext {
    date: NaiveDate,
    bounds: DayBounds,
    /// Kept in commit order; eviction order depends on it.
    blocks: Vec<Placed>,
    dropped: Vec<TaskRecord>,
    seq: u64,
}

/// Result of placing one day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayOutcome {
    /// Placed records sorted by start, with times and date stamped.
    pub placed: Vec<TaskRecord>,
    /// Flexible tasks that could not be seated.
    pub unscheduled: Vec<TaskRecord>,
}

impl DayContext {
    pub fn new(date: NaiveDate, bounds: DayBounds) -> Self {
        Self {
            date,
            bounds,
            blocks: Vec::new(),
            dropped: Vec::new(),
            seq: 0,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Committed intervals sorted by start.
    pub fn intervals(&self) -> Vec<Interval> {
        let mut out: Vec<Interval> = self.blocks.iter().map(|b| b.interval).collect();
        out.sort_by_key(|iv| iv.start);
        out
    }

    /// Anchored `(earliest start, latest start)` for a flexible task, or
    /// `None` when its duration reaches outside the representable range.
    pub fn window(&self, task: &TaskRecord) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let earliest = self
            .date
            .and_time(task.earliest_time.unwrap_or(self.bounds.anchor));
        let latest_end = self
            .date
            .and_time(task.latest_time.unwrap_or(self.bounds.day_end));
        Some((earliest, plus_minutes(latest_end, task.duration.checked_neg()?)?))
    }

    pub(crate) fn commit(&mut self, task: &TaskRecord, start: NaiveDateTime) {
        self.seq += 1;
        debug!(
            date = %self.date,
            task = %task.id,
            start = %start.time(),
            minutes = task.duration,
            "committed block"
        );
        self.blocks.push(Placed {
            seq: self.seq,
            interval: Interval::new(start, task.duration),
            task: task.clone(),
        });
    }

    pub(crate) fn blocks(&self) -> &[Placed] {
        &self.blocks
    }

    pub(crate) fn evict(&mut self, seq: u64) -> Option<Placed> {
        let idx = self.blocks.iter().position(|b| b.seq == seq)?;
        Some(self.blocks.remove(idx))
    }

    pub(crate) fn drop_task(&mut self, task: &TaskRecord) {
        debug!(date = %self.date, task = %task.id, title = %task.title, "no slot; task dropped");
        self.dropped.push(task.clone());
    }

    /// Commit a fixed task at its declared start. Returns false if it has none.
    pub fn place_fixed(&mut self, task: &TaskRecord) -> bool {
        match task.start_time {
            Some(start) => {
                self.commit(task, self.date.and_time(start));
                true
            }
            None => false,
        }
    }

    /// Seat a flexible task, displacing lower-priority blocks if needed.
    /// A task that cannot be seated is recorded as unscheduled.
    pub fn place(&mut self, task: &TaskRecord) -> bool {
        if self.slot(task, true) {
            return true;
        }
        self.drop_task(task);
        false
    }

    /// Try to seat a flexible task, falling back to displacement when allowed.
    pub(crate) fn slot(&mut self, task: &TaskRecord, allow_displace: bool) -> bool {
        let Some((earliest, latest)) = self.window(task) else {
            return false;
        };
        if let Some(start) = find_gap(task.duration, earliest, latest, &self.intervals()) {
            self.commit(task, start);
            return true;
        }
        allow_displace && displace::seat_by_displacement(self, task, earliest, latest)
    }

    /// Consume the context into the day's sorted, stamped output.
    pub fn finish(self) -> DayOutcome {
        let date = self.date;
        let mut blocks = self.blocks;
        blocks.sort_by_key(|b| b.interval.start);

        let placed = blocks
            .into_iter()
            .map(|b| {
                let mut record = b.task;
                record.start_time = Some(b.interval.start.time());
                record.end_time = Some(b.interval.end.time());
                record.date = Some(date);
                record
            })
            .collect();

        DayOutcome {
            placed,
            unscheduled: self.dropped,
        }
    }
}

/// Place one day's tasks.
///
/// Fixed tasks are committed as declared (never checked against each other);
/// every record must already have passed [`TaskRecord::validate`].
pub fn place_day(date: NaiveDate, tasks: &[&TaskRecord], bounds: DayBounds) -> DayOutcome {
    let mut ctx = DayContext::new(date, bounds);

    for task in tasks.iter().filter(|t| t.fixed) {
        ctx.place_fixed(task);
    }

    let mut flexible: Vec<&TaskRecord> = tasks.iter().copied().filter(|t| !t.fixed).collect();
    flexible.sort_by_key(|t| (t.priority, t.earliest_time));

    for task in flexible {
        ctx.place(task);
    }

    ctx.finish()
}
