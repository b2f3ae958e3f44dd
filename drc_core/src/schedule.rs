//! The holiday adjusted weekly collection schedule.

use std::iter::FusedIterator;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, ScheduleError},
    holiday::{week_start, HolidayRuleSet, ShiftPolicy},
};

/// The number of shifts after which a cascade is considered malformed.
pub const MAX_CASCADE: usize = 7;

/// One weekly collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Collection {
    /// The date implied by the weekday alone.
    pub nominal: NaiveDate,
    /// The date after all holiday shifts, never before `nominal`.
    pub actual: NaiveDate,
}

/// Maps nominal weekly collection dates to holiday adjusted ones.
///
/// The scheduler borrows a single rule set for its whole lifetime,
/// so one computation never mixes rules of two refreshes.
#[derive(Debug, Clone, Copy)]
pub struct CollectionScheduler<'a> {
    base_weekday: Weekday,
    rules: &'a HolidayRuleSet,
}

impl<'a> CollectionScheduler<'a> {
    pub fn new(base_weekday: Weekday, rules: &'a HolidayRuleSet) -> Self {
        Self {
            base_weekday,
            rules,
        }
    }

    pub fn base_weekday(&self) -> Weekday {
        self.base_weekday
    }

    pub fn rules(&self) -> &'a HolidayRuleSet {
        self.rules
    }

    /// Get the actual collection date for a nominal one.
    ///
    /// A [`ShiftPolicy::ShiftFollowingDayForward`] holiday earlier in the week delays the
    /// collection by one day, and so does a [`ShiftPolicy::ShiftSameWeekForward`] holiday on
    /// the day before, whose collections move onto the nominal day. Afterwards every holiday
    /// the candidate lands on pushes it one more day, at most [`MAX_CASCADE`] times.
    pub fn adjust(&self, nominal: NaiveDate) -> Result<NaiveDate, ConfigError> {
        let unstable = |last: NaiveDate| ConfigError::UnstableCascade {
            nominal,
            last,
            iterations: MAX_CASCADE,
        };
        let mut candidate = nominal;
        if let (Some(week_start), Some(day_before)) = (week_start(nominal), nominal.pred_opt()) {
            let delaying_holiday = self
                .rules
                .rules_affecting(week_start, day_before)
                .iter()
                .find(|rule| match rule.policy {
                    ShiftPolicy::ShiftFollowingDayForward => true,
                    ShiftPolicy::ShiftSameWeekForward => rule.date == day_before,
                });
            if let Some(rule) = delaying_holiday {
                log::debug!(
                    "{} on {} delays the collection of {nominal}",
                    rule.name,
                    rule.date
                );
                candidate = candidate.succ_opt().ok_or_else(|| unstable(candidate))?;
            }
        }
        for _ in 0..MAX_CASCADE {
            let Some(rule) = self.rules.get(candidate) else {
                return Ok(candidate);
            };
            log::debug!(
                "{} moves the collection of {nominal} off {candidate}",
                rule.name
            );
            candidate = candidate.succ_opt().ok_or_else(|| unstable(candidate))?;
        }
        if self.rules.get(candidate).is_none() {
            return Ok(candidate);
        }
        log::warn!("the collection of {nominal} did not settle, last candidate {candidate}");
        Err(unstable(candidate))
    }

    /// Get the collections whose nominal date lies within `[start, end]`.
    ///
    /// The range is clamped to the valid window of the rule set. Actual dates may lie after `end`.
    pub fn schedule_for(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Schedule<'a>, ScheduleError> {
        let window = self.rules.valid_window();
        if start > end || end < *window.start() || start > *window.end() {
            return Err(ScheduleError::NotFound {
                start,
                end,
                window: window.clone(),
            });
        }
        let start = start.max(*window.start());
        let end = end.min(*window.end());
        Ok(Schedule {
            scheduler: *self,
            next: first_on_or_after(start, self.base_weekday),
            end,
        })
    }

    /// Get the first collection actually taking place on or after `after`.
    ///
    /// Collections are at most `MAX_CASCADE + 1` days late, so the scan starts that far
    /// before `after` to find a collection shifted onto that day.
    pub fn next_collection(&self, after: NaiveDate) -> Result<Collection, ScheduleError> {
        let window = self.rules.valid_window();
        let end = *window.end();
        let not_found = || ScheduleError::NotFound {
            start: after,
            end,
            window: window.clone(),
        };
        if after > end {
            return Err(not_found());
        }
        let from = after
            .checked_sub_days(Days::new(MAX_CASCADE as u64 + 1))
            .unwrap_or(after);
        for collection in self.schedule_for(from, end)? {
            let collection = collection?;
            if collection.actual >= after {
                return Ok(collection);
            }
        }
        Err(not_found())
    }
}

/// A lazy weekly sequence of collections, ascending by nominal date.
///
/// Clone it to restart from the beginning.
#[derive(Debug, Clone)]
pub struct Schedule<'a> {
    scheduler: CollectionScheduler<'a>,
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for Schedule<'_> {
    type Item = Result<Collection, ConfigError>;

    fn next(&mut self) -> Option<Self::Item> {
        let nominal = self.next.filter(|nominal| *nominal <= self.end)?;
        self.next = nominal.checked_add_days(Days::new(7));
        Some(
            self.scheduler
                .adjust(nominal)
                .map(|actual| Collection { nominal, actual }),
        )
    }
}

impl FusedIterator for Schedule<'_> {}

fn first_on_or_after(date: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let offset = (7 + weekday.num_days_from_monday() - date.weekday().num_days_from_monday()) % 7;
    date.checked_add_days(Days::new(offset.into()))
}
