//! This crate computes weekly refuse and recycling collection dates adjusted for municipal holidays.
//! It also renders the resulting schedule as an iCalendar file.
//!
//! The holiday notice is published at <https://www.delawareohio.net>.

pub use ical;

pub mod error;
pub mod garbage_calendar;
pub mod holiday;
pub mod holiday_parser;
pub mod refresh;
pub mod schedule;
