//! blockwise-core: minute-granularity time-block scheduling.
//!
//! Fixed appointments are pinned first, flexible tasks are seated in priority
//! order into the earliest gap of their window, and lower-priority blocks are
//! displaced when a higher-priority task has nowhere else to go. Goals
//! ("spend 5 hours on X this week") expand into flexible blocks beforehand.

mod displace;
pub mod error;
pub mod gap;
pub mod goal;
pub mod placer;
pub mod scheduler;
pub mod task;
pub mod time;

pub use error::{GoalError, ParseError, ScheduleError};
pub use gap::{Interval, find_gap};
pub use goal::{DateRange, Goal, GoalSpec, daily_quotas, expand_hybrid, expand_periodic};
pub use placer::{DayContext, DayOutcome, place_day};
pub use scheduler::{ScheduleReport, Scheduler};
pub use task::{Priority, TaskKind, TaskRecord};
pub use time::{DayBounds, format_hhmm, parse_date, parse_hhmm};
