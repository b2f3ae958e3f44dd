//! The holiday rules of one collection year.

use std::ops::RangeInclusive;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How a holiday moves collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftPolicy {
    /// Every collection of the week on or after the holiday is delayed by one day.
    ShiftFollowingDayForward,
    /// Only the collection falling on the holiday itself moves to the next day.
    ShiftSameWeekForward,
}

/// A single holiday observance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HolidayRule {
    pub name: String,
    pub date: NaiveDate,
    pub policy: ShiftPolicy,
}

impl HolidayRule {
    pub fn new(name: impl Into<String>, date: NaiveDate, policy: ShiftPolicy) -> Self {
        Self {
            name: name.into(),
            date,
            policy,
        }
    }
}

/// Validated holiday rules of one year, sorted by date.
///
/// The set is immutable. A refresh builds a new set and swaps it in as a whole,
/// see [`crate::refresh::RuleSetHandle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayRuleSet {
    year: i32,
    rules: Vec<HolidayRule>,
    window: RangeInclusive<NaiveDate>,
}

impl HolidayRuleSet {
    /// Build the rule set of a year.
    ///
    /// Fails if two rules share a date or a rule lies outside the weeks covering the year.
    pub fn build(
        year: i32,
        raw_rules: impl IntoIterator<Item = HolidayRule>,
    ) -> Result<Self, ConfigError> {
        let window = valid_window(year)?;
        let mut rules: Vec<HolidayRule> = raw_rules.into_iter().collect();
        if let Some(rule) = rules.iter().find(|rule| !window.contains(&rule.date)) {
            return Err(ConfigError::OutsideYear {
                name: rule.name.clone(),
                date: rule.date,
                year,
                window,
            });
        }
        rules.sort_by_key(|rule| rule.date);
        if let Some(pair) = rules.windows(2).find(|pair| pair[0].date == pair[1].date) {
            return Err(ConfigError::DuplicateDate {
                date: pair[0].date,
                first: pair[0].name.clone(),
                second: pair[1].name.clone(),
            });
        }
        log::debug!("built holiday rule set for {year} with {} rules", rules.len());
        Ok(Self {
            year,
            rules,
            window,
        })
    }

    /// A rule set without any holidays.
    pub fn empty(year: i32) -> Result<Self, ConfigError> {
        Self::build(year, [])
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn rules(&self) -> &[HolidayRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The dates this set can answer for: Monday of the week of January 1st through
    /// Sunday of the week of December 31st.
    pub fn valid_window(&self) -> &RangeInclusive<NaiveDate> {
        &self.window
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.window.contains(&date)
    }

    /// The rule observed on `date`, if any.
    pub fn get(&self, date: NaiveDate) -> Option<&HolidayRule> {
        self.rules
            .binary_search_by_key(&date, |rule| rule.date)
            .ok()
            .map(|index| &self.rules[index])
    }

    /// All rules dated within `[week_start, week_end]`, ascending.
    pub fn rules_affecting(&self, week_start: NaiveDate, week_end: NaiveDate) -> &[HolidayRule] {
        if week_start > week_end {
            return &[];
        }
        let from = self.rules.partition_point(|rule| rule.date < week_start);
        let to = self.rules.partition_point(|rule| rule.date <= week_end);
        &self.rules[from..to]
    }
}

/// The Monday starting the week of `date`.
pub fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(date.weekday().num_days_from_monday().into()))
}

/// The Sunday ending the week of `date`.
pub fn week_end(date: NaiveDate) -> Option<NaiveDate> {
    let days_to_sunday =
        Weekday::Sun.num_days_from_monday() - date.weekday().num_days_from_monday();
    date.checked_add_days(Days::new(days_to_sunday.into()))
}

fn valid_window(year: i32) -> Result<RangeInclusive<NaiveDate>, ConfigError> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1).and_then(week_start);
    let last = NaiveDate::from_ymd_opt(year, 12, 31).and_then(week_end);
    match (first, last) {
        (Some(first), Some(last)) => Ok(first..=last),
        _ => Err(ConfigError::InvalidYear(year)),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;
    use rstest::rstest;

    use crate::{
        error::ConfigError,
        holiday::{week_end, week_start, HolidayRule, HolidayRuleSet, ShiftPolicy},
    };

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn get_test_rules() -> Vec<HolidayRule> {
        vec![
            HolidayRule::new(
                "Thanksgiving",
                date("2025-11-27"),
                ShiftPolicy::ShiftSameWeekForward,
            ),
            HolidayRule::new(
                "New Year's Day",
                date("2025-01-01"),
                ShiftPolicy::ShiftFollowingDayForward,
            ),
            HolidayRule::new(
                "Memorial Day",
                date("2025-05-26"),
                ShiftPolicy::ShiftFollowingDayForward,
            ),
            HolidayRule::new(
                "Christmas Day",
                date("2025-12-25"),
                ShiftPolicy::ShiftSameWeekForward,
            ),
        ]
    }

    #[test]
    fn test_build_sorts_by_date() {
        let rule_set = HolidayRuleSet::build(2025, get_test_rules()).unwrap();
        let names: Vec<&str> = rule_set.rules().iter().map(|rule| rule.name.as_str()).collect();
        assert_eq!(
            names,
            ["New Year's Day", "Memorial Day", "Thanksgiving", "Christmas Day"]
        );
        assert_eq!(rule_set.year(), 2025);
        assert_eq!(rule_set.len(), 4);
    }

    #[test]
    fn test_build_rejects_duplicate_dates() {
        let mut rules = get_test_rules();
        rules.push(HolidayRule::new(
            "Day after Thanksgiving",
            date("2025-11-27"),
            ShiftPolicy::ShiftSameWeekForward,
        ));
        let err = HolidayRuleSet::build(2025, rules).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateDate {
                date: date("2025-11-27"),
                first: String::from("Thanksgiving"),
                second: String::from("Day after Thanksgiving"),
            }
        );
    }

    #[test]
    fn test_build_rejects_rules_outside_year() {
        let rules = vec![HolidayRule::new(
            "Labor Day",
            date("2024-09-02"),
            ShiftPolicy::ShiftFollowingDayForward,
        )];
        let err = HolidayRuleSet::build(2025, rules).unwrap_err();
        assert!(matches!(err, ConfigError::OutsideYear { year: 2025, .. }));
    }

    #[test]
    fn test_valid_window_covers_whole_weeks() {
        let rule_set = HolidayRuleSet::empty(2025).unwrap();
        // 2025-01-01 is a Wednesday, 2025-12-31 is a Wednesday.
        assert_eq!(*rule_set.valid_window().start(), date("2024-12-30"));
        assert_eq!(*rule_set.valid_window().end(), date("2026-01-04"));
        assert!(rule_set.contains(date("2024-12-31")));
        assert!(!rule_set.contains(date("2026-01-05")));
        assert!(rule_set.is_empty());
    }

    #[test]
    fn test_observed_holiday_in_previous_december_is_accepted() {
        // New Year's Day 2022 was observed on Friday 2021-12-31.
        let rules = vec![HolidayRule::new(
            "New Year's Day (observed)",
            date("2021-12-31"),
            ShiftPolicy::ShiftFollowingDayForward,
        )];
        let rule_set = HolidayRuleSet::build(2022, rules).unwrap();
        assert!(rule_set.get(date("2021-12-31")).is_some());
    }

    #[rstest]
    #[case("2025-05-26", Some("Memorial Day"))]
    #[case("2025-11-27", Some("Thanksgiving"))]
    #[case("2025-11-28", None)]
    #[case("2025-07-04", None)]
    fn test_get(#[case] day: &str, #[case] expected: Option<&str>) {
        let rule_set = HolidayRuleSet::build(2025, get_test_rules()).unwrap();
        let found = rule_set.get(date(day)).map(|rule| rule.name.as_str());
        assert_eq!(found, expected);
    }

    #[rstest]
    #[case("2025-05-26", "2025-06-01", &["Memorial Day"])]
    #[case("2025-05-27", "2025-06-01", &[])]
    #[case("2025-11-24", "2025-12-28", &["Thanksgiving", "Christmas Day"])]
    #[case(
        "2024-12-30",
        "2025-12-31",
        &["New Year's Day", "Memorial Day", "Thanksgiving", "Christmas Day"]
    )]
    #[case("2025-06-01", "2025-05-26", &[])]
    fn test_rules_affecting(#[case] start: &str, #[case] end: &str, #[case] expected: &[&str]) {
        let rule_set = HolidayRuleSet::build(2025, get_test_rules()).unwrap();
        let names: Vec<&str> = rule_set
            .rules_affecting(date(start), date(end))
            .iter()
            .map(|rule| rule.name.as_str())
            .collect();
        assert_eq!(names, expected);
    }

    #[rstest]
    #[case("2025-11-27", "2025-11-24", "2025-11-30")]
    #[case("2025-11-24", "2025-11-24", "2025-11-30")]
    #[case("2025-11-30", "2025-11-24", "2025-11-30")]
    fn test_week_bounds(#[case] day: &str, #[case] start: &str, #[case] end: &str) {
        assert_eq!(week_start(date(day)), Some(date(start)));
        assert_eq!(week_end(date(day)), Some(date(end)));
    }
}
