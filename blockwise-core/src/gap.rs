//! Earliest-fit gap search over a day's committed intervals.

use chrono::NaiveDateTime;

use crate::time::plus_minutes;

/// Half-open `[start, end)` span of committed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    /// The end saturates at `NaiveDateTime::MAX` when `minutes` runs past it.
    pub fn new(start: NaiveDateTime, minutes: i64) -> Self {
        Self {
            start,
            end: plus_minutes(start, minutes).unwrap_or(NaiveDateTime::MAX),
        }
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Find the earliest start in `[earliest, latest]` where `minutes` fit
/// without touching any of `committed`.
///
/// `latest` is the last permissible *start*, already adjusted for the
/// duration by the caller. `committed` must be sorted by start. A duration
/// that runs past the representable range never fits.
pub fn find_gap(
    minutes: i64,
    earliest: NaiveDateTime,
    latest: NaiveDateTime,
    committed: &[Interval],
) -> Option<NaiveDateTime> {
    let mut candidate = earliest;

    for block in committed {
        let end = plus_minutes(candidate, minutes)?;
        if end <= block.start && candidate <= latest {
            return Some(candidate);
        }
        candidate = candidate.max(block.end);
        if candidate > latest {
            return None;
        }
    }

    plus_minutes(candidate, minutes)?;
    (candidate <= latest).then_some(candidate)
}
