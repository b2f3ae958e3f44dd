//! Errors raised by the holiday rule set and the collection scheduler.

use std::ops::RangeInclusive;

use chrono::NaiveDate;

/// Malformed holiday data.
///
/// A refresh failing with this error must leave the previously active rule set in place.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq, Hash)]
pub enum ConfigError {
    #[error("the holidays {first:?} and {second:?} share the date {date}")]
    DuplicateDate {
        date: NaiveDate,
        first: String,
        second: String,
    },
    #[error("the holiday {name:?} on {date} is outside the valid window [{}, {}] of {year}", .window.start(), .window.end())]
    OutsideYear {
        name: String,
        date: NaiveDate,
        year: i32,
        window: RangeInclusive<NaiveDate>,
    },
    #[error("the collection on {nominal} did not settle within {iterations} shifts (last candidate {last})")]
    UnstableCascade {
        nominal: NaiveDate,
        last: NaiveDate,
        iterations: usize,
    },
    #[error("the year {0} cannot be represented")]
    InvalidYear(i32),
}

/// Errors of schedule queries.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq, Hash)]
pub enum ScheduleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no collection in [{start}, {end}] within the valid window [{}, {}]", .window.start(), .window.end())]
    NotFound {
        start: NaiveDate,
        end: NaiveDate,
        window: RangeInclusive<NaiveDate>,
    },
}
