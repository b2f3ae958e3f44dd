use chrono::NaiveDate;
use drc_core::refresh::RuleSetHandle;

/// State shared by all request handlers and the refresh task.
#[derive(Debug)]
pub struct AppState {
    pub rules: RuleSetHandle,
    /// the number of days a calendar covers
    pub days_ahead: u64,
    /// the first day of every calendar
    pub today: fn() -> NaiveDate,
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
