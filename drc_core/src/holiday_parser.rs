//! This parser turns the text of the city's holiday notice into holiday rules.
//!
//! Fetching the notice and extracting its text happens elsewhere.

use std::str::FromStr;

use anyhow::{bail, Result};
use chrono::{Datelike, Month, NaiveDate, Weekday};
use regex::Regex;

use crate::holiday::{HolidayRule, ShiftPolicy};

/// A holiday header with the lines describing its collection changes.
#[derive(Debug)]
struct Entry<'a> {
    name: &'a str,
    date: NaiveDate,
    description: Vec<&'a str>,
}

/// What the notice says happens to collections in the week of a holiday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Adjustment {
    None,
    DelayedOneDay,
    Rescheduled,
    Accelerated,
}

/// Parse the holiday notice to holiday rules.
///
/// Headers without a year fall into `default_year`.
/// Holidays without collection changes yield no rule.
pub fn parse(text: &str, default_year: i32) -> Result<Vec<HolidayRule>> {
    let header_regex = Regex::new(
        r"(?x)
            ^(?P<weekday>Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday),\s+
            (?P<month>[[:alpha:]]+)\s+
            (?P<day>\d{1,2})
            (?:,\s+(?P<year>\d{4}))? # the year is optional
            \s+(?P<name>.+)$
        ",
    )?;
    let mut entries: Vec<Entry> = vec![];
    let mut current: Option<Entry> = None;
    let mut headers = 0;
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let Some(captures) = header_regex.captures(line) else {
            if let Some(entry) = current.as_mut() {
                entry.description.push(line);
            }
            continue;
        };
        headers += 1;
        entries.extend(current.take());
        let year = match captures.name("year") {
            Some(year) => year.as_str().parse()?,
            None => default_year,
        };
        let date = Month::from_str(&captures["month"])
            .ok()
            .and_then(|month| {
                let day = captures["day"].parse().ok()?;
                NaiveDate::from_ymd_opt(year, month.number_from_month(), day)
            });
        let Some(date) = date else {
            log::warn!("could not parse the date of the holiday header {line:?}");
            continue;
        };
        if let Ok(weekday) = Weekday::from_str(&captures["weekday"]) {
            if weekday != date.weekday() {
                log::warn!(
                    "the holiday header {line:?} names {weekday} but {date} is a {}",
                    date.weekday()
                );
            }
        }
        current = Some(Entry {
            name: captures.name("name").map_or("", |name| name.as_str().trim()),
            date,
            description: vec![],
        });
    }
    entries.extend(current);
    if headers == 0 {
        bail!("the holiday notice does not contain any holiday");
    }
    let classifier = Classifier::new()?;
    let rules: Vec<HolidayRule> = entries
        .into_iter()
        .filter(|entry| !entry.description.is_empty())
        .filter_map(|entry| {
            let description = entry.description.join("\n");
            let adjustment = classifier.classify(&description);
            log::debug!("{} on {} is {adjustment:?}", entry.name, entry.date);
            let policy = match adjustment {
                Adjustment::DelayedOneDay => ShiftPolicy::ShiftFollowingDayForward,
                Adjustment::Rescheduled => {
                    for (from, to) in classifier.reschedules(&description) {
                        if from.succ() != to {
                            log::warn!(
                                "{} moves {from} collections to {to}, \
                                 only a shift to the following day is applied",
                                entry.name
                            );
                        }
                    }
                    ShiftPolicy::ShiftSameWeekForward
                }
                Adjustment::None | Adjustment::Accelerated => return None,
            };
            Some(HolidayRule::new(entry.name, entry.date, policy))
        })
        .collect();
    log::info!("parsed {} holiday rules from {headers} holidays", rules.len());
    Ok(rules)
}

struct Classifier {
    whitespace: Regex,
    delayed: Regex,
    rescheduled: Regex,
    reschedule_days: Regex,
}

impl Classifier {
    fn new() -> Result<Self> {
        Ok(Self {
            whitespace: Regex::new(r"\s+")?,
            delayed: Regex::new(r"(?i)delayed\s+one\s+day")?,
            // the text extraction sometimes splits "place" into "pl ace"
            rescheduled: Regex::new(r"(?i)collections will (?:take pl?\s*ace|occur) on")?,
            reschedule_days: Regex::new(
                r"(?ix)
                    (?P<from>monday|tuesday|wednesday|thursday|friday|saturday|sunday)
                    \s+collections\s+will\s+(?:take\s+pl?\s*ace|occur)\s+on\s+
                    (?P<to>monday|tuesday|wednesday|thursday|friday|saturday|sunday)
                ",
            )?,
        })
    }

    /// The weekdays whose collections move, with the weekday they move to.
    fn reschedules(&self, description: &str) -> Vec<(Weekday, Weekday)> {
        let description = self.whitespace.replace_all(description, " ");
        self.reschedule_days
            .captures_iter(&description)
            .filter_map(|captures| {
                let from = Weekday::from_str(&captures["from"]).ok()?;
                let to = Weekday::from_str(&captures["to"]).ok()?;
                Some((from, to))
            })
            .collect()
    }

    fn classify(&self, description: &str) -> Adjustment {
        let description = self.whitespace.replace_all(description, " ");
        match () {
            _ if description.contains("No Collection Delays") => Adjustment::None,
            _ if description.contains("No Delay") => Adjustment::None,
            _ if self.delayed.is_match(&description) => Adjustment::DelayedOneDay,
            _ if self.rescheduled.is_match(&description) => Adjustment::Rescheduled,
            _ if description.contains("accelerated schedule") => Adjustment::Accelerated,
            _ if description.contains("will NOT occur") => Adjustment::Rescheduled,
            _ => Adjustment::None,
        }
    }
}
