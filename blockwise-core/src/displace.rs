//! Priority displacement: evict lower-priority flexible blocks to seat a task
//! that found no gap.
//!
//! Evicted tasks are re-seated with displacement turned off, so a chain of
//! evictions is at most one level deep.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::gap::find_gap;
use crate::placer::DayContext;
use crate::task::TaskRecord;

/// Returns true if `task` was committed.
pub(crate) fn seat_by_displacement(
    ctx: &mut DayContext,
    task: &TaskRecord,
    earliest: NaiveDateTime,
    latest: NaiveDateTime,
) -> bool {
    // Lowest priority first; ties keep commit order.
    let mut candidates: Vec<(u64, u8)> = ctx
        .blocks()
        .iter()
        .filter(|b| !b.task.fixed && b.task.priority.yields_to(task.priority))
        .map(|b| (b.seq, b.task.priority.rank()))
        .collect();
    candidates.sort_by(|a, b| b.1.cmp(&a.1));

    let mut evicted: Vec<TaskRecord> = Vec::new();

    for (seq, _) in candidates {
        let Some(block) = ctx.evict(seq) else { continue };
        debug!(
            date = %ctx.date(),
            evicted = %block.task.id,
            for_task = %task.id,
            "evicted lower-priority block"
        );
        evicted.push(block.task);

        if let Some(start) = find_gap(task.duration, earliest, latest, &ctx.intervals()) {
            ctx.commit(task, start);
            reseat(ctx, &evicted);
            return true;
        }
    }

    reseat(ctx, &evicted);
    false
}

fn reseat(ctx: &mut DayContext, evicted: &[TaskRecord]) {
    for task in evicted {
        if !ctx.slot(task, false) {
            ctx.drop_task(task);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::placer::{DayContext, DayOutcome, place_day};
    use crate::task::{Priority, TaskRecord};
    use crate::time::{DayBounds, format_hhmm, parse_date, parse_hhmm};

    fn hm(s: &str) -> chrono::NaiveTime {
        parse_hhmm(s).unwrap()
    }

    fn start(out: &DayOutcome, id: &str) -> Option<String> {
        out.placed
            .iter()
            .find(|t| t.id == id)
            .map(|t| format_hhmm(t.start_time.unwrap()))
    }

    fn dropped(out: &DayOutcome) -> Vec<&str> {
        out.unscheduled.iter().map(|t| t.id.as_str()).collect()
    }

    /// A day with only 10:00-12:00 usable.
    fn narrow_day() -> DayContext {
        let bounds = DayBounds {
            anchor: hm("10:00"),
            day_end: hm("12:00"),
        };
        DayContext::new(parse_date("2025-07-01").unwrap(), bounds)
    }

    fn task(id: &str, minutes: i64, priority: Priority) -> TaskRecord {
        TaskRecord::new(id, id).with_duration(minutes).with_priority(priority)
    }

    #[test]
    fn evicted_task_is_dropped_when_no_room_remains() {
        let mut ctx = narrow_day();
        assert!(ctx.place(&task("a", 60, Priority::Low)));
        assert!(ctx.place(&task("b", 60, Priority::Low)));
        assert!(ctx.place(&task("h", 60, Priority::High)));

        let out = ctx.finish();
        assert_eq!(start(&out, "h").as_deref(), Some("10:00"));
        assert_eq!(start(&out, "b").as_deref(), Some("11:00"));
        assert_eq!(start(&out, "a"), None);
        assert_eq!(dropped(&out), ["a"]);
    }

    #[test]
    fn evicted_task_is_reseated_elsewhere() {
        let mut ctx = narrow_day();
        let low = task("low", 30, Priority::Low).with_window(Some(hm("10:30")), None);
        assert!(ctx.place(&low));
        assert!(ctx.place(&task("high", 90, Priority::High)));

        let out = ctx.finish();
        assert_eq!(start(&out, "high").as_deref(), Some("10:00"));
        assert_eq!(start(&out, "low").as_deref(), Some("11:30"));
        assert!(out.unscheduled.is_empty());
    }

    #[test]
    fn evictions_accumulate_lowest_priority_first() {
        let mut ctx = narrow_day();
        assert!(ctx.place(&task("a", 30, Priority::Low)));
        assert!(ctx.place(&task("m", 30, Priority::Medium)));
        assert!(ctx.place(&task("c", 30, Priority::Low)));
        assert!(ctx.place(&task("h", 90, Priority::High)));

        // a, then c, then m were evicted before h fit; only a found room again.
        let out = ctx.finish();
        assert_eq!(start(&out, "h").as_deref(), Some("10:00"));
        assert_eq!(start(&out, "a").as_deref(), Some("11:30"));
        assert_eq!(dropped(&out), ["c", "m"]);
    }

    #[test]
    fn failed_displacement_restores_evicted_tasks() {
        let mut ctx = narrow_day();
        let fixed = TaskRecord::fixed("f", "Fixed", hm("10:00"), 90).with_priority(Priority::Low);
        assert!(ctx.place_fixed(&fixed));
        assert!(ctx.place(&task("a", 30, Priority::Low)));
        assert!(!ctx.place(&task("h", 60, Priority::High)));

        let out = ctx.finish();
        assert_eq!(start(&out, "f").as_deref(), Some("10:00"));
        assert_eq!(start(&out, "a").as_deref(), Some("11:30"));
        assert_eq!(dropped(&out), ["h"]);
    }

    #[test]
    fn equal_priority_is_not_evicted() {
        let mut ctx = narrow_day();
        assert!(ctx.place(&task("a", 120, Priority::Medium)));
        assert!(!ctx.place(&task("b", 60, Priority::Medium)));

        let out = ctx.finish();
        assert_eq!(start(&out, "a").as_deref(), Some("10:00"));
        assert_eq!(dropped(&out), ["b"]);
    }

    #[test]
    fn fixed_blocks_are_never_evicted() {
        let date = parse_date("2025-07-01").unwrap();
        let bounds = DayBounds {
            anchor: hm("10:00"),
            day_end: hm("12:00"),
        };
        let fixed = TaskRecord::fixed("f", "Fixed", hm("10:00"), 120).with_priority(Priority::Low);
        let high = task("high", 60, Priority::High);

        let out = place_day(date, &[&fixed, &high], bounds);
        assert_eq!(start(&out, "f").as_deref(), Some("10:00"));
        assert_eq!(start(&out, "high"), None);
        assert_eq!(dropped(&out), ["high"]);
    }
}
