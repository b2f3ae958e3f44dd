//! This crate implements an iCalendar server serving holiday adjusted refuse collection dates.
//!
//! The path and query string are `/calendar?address=<your_address>&weekday=<your_collection_day>`.

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use chrono::Datelike;
use clap::Parser;
use drc_core::{holiday::HolidayRuleSet, holiday_parser, refresh::RuleSetHandle};

mod route;
mod state;

use state::AppState;

#[derive(Debug, Parser)]
struct Arguments {
    /// the text of the holiday notice, read again on every refresh
    #[arg(long)]
    holidays: PathBuf,
    /// the address to listen on
    #[arg(long, default_value = "0.0.0.0:8008")]
    bind: SocketAddr,
    /// the year of the holiday notice [default: the current year]
    #[arg(long)]
    year: Option<i32>,
    /// the seconds between two refreshes of the holiday notice
    #[arg(long, default_value_t = 3600)]
    refresh_interval: u64,
    /// the number of days a calendar covers
    #[arg(long, default_value_t = 90)]
    days_ahead: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Arguments::parse();
    let year = args.year.unwrap_or_else(|| state::today().year());
    let rules = load_rule_set(&args.holidays, year).await?;
    let state = Arc::new(AppState {
        rules: RuleSetHandle::new(rules),
        days_ahead: args.days_ahead,
        today: state::today,
    });
    tokio::spawn(refresh_periodically(
        state.clone(),
        args.holidays,
        args.year,
        Duration::from_secs(args.refresh_interval.max(1)),
    ));
    let app = Router::new()
        .route("/calendar", get(route::calendar::handler))
        .route("/next", get(route::next::handler))
        .with_state(state);
    log::info!("listening on {}", args.bind);
    axum::Server::bind(&args.bind)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

/// Read and parse the holiday notice.
async fn load_rule_set(path: &Path, year: i32) -> Result<HolidayRuleSet> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("could not read {}", path.display()))?;
    build_rule_set(&text, year)
}

fn build_rule_set(text: &str, year: i32) -> Result<HolidayRuleSet> {
    Ok(HolidayRuleSet::build(year, holiday_parser::parse(text, year)?)?)
}

/// Replace the active rule set on every tick, keeping it when the notice cannot be used.
///
/// Without a fixed `year` the notice is read for the current year of `state.today`,
/// so the rules move on to the next year at the turn of the year.
async fn refresh_periodically(
    state: Arc<AppState>,
    path: PathBuf,
    year: Option<i32>,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    // the first tick completes immediately, the notice was just loaded
    interval.tick().await;
    loop {
        interval.tick().await;
        let year = year.unwrap_or_else(|| (state.today)().year());
        let active_year = state.rules.current().year();
        if year != active_year {
            log::info!("moving the holiday rules from {active_year} to {year}");
        }
        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("could not read {}", path.display()));
        // failures are logged by the handle
        let _ = state.rules.refresh(|| build_rule_set(&text?, year));
    }
}

#[cfg(test)]
mod tests {
    use std::{str::FromStr, sync::Arc, time::Duration};

    use chrono::NaiveDate;
    use drc_core::{holiday::HolidayRuleSet, refresh::RuleSetHandle};

    use crate::{build_rule_set, refresh_periodically, state, state::AppState};

    #[test]
    fn test_build_rule_set() {
        let text = "Thursday, November 27   Thanksgiving Day\n\
                    Thursday collections will take place on Friday.";
        let rules = build_rule_set(text, 2025).unwrap();
        assert_eq!(rules.len(), 1);
        assert!(build_rule_set("no holidays this year", 2025).is_err());
    }

    #[tokio::test]
    async fn test_refresh_keeps_rules_when_notice_is_missing() {
        let state = Arc::new(AppState {
            rules: RuleSetHandle::new(HolidayRuleSet::empty(2025).unwrap()),
            days_ahead: 90,
            today: state::today,
        });
        let task = tokio::spawn(refresh_periodically(
            state.clone(),
            "does/not/exist.txt".into(),
            Some(2025),
            Duration::from_millis(5),
        ));
        tokio::time::sleep(Duration::from_millis(50)).await;
        task.abort();
        assert_eq!(state.rules.version(), 0);
        assert_eq!(state.rules.current().year(), 2025);
    }

    #[tokio::test]
    async fn test_refresh_moves_on_to_the_next_year() {
        let path = std::env::temp_dir().join("drc_server_holiday_notice_2027.txt");
        tokio::fs::write(
            &path,
            "Monday, May 31   Memorial Day\n\
             Collections will be delayed one day this week.",
        )
        .await
        .unwrap();
        let state = Arc::new(AppState {
            rules: RuleSetHandle::new(HolidayRuleSet::empty(2026).unwrap()),
            days_ahead: 90,
            today: || NaiveDate::from_str("2027-01-10").unwrap(),
        });
        assert!(!state.rules.current().contains((state.today)()));
        let task = tokio::spawn(refresh_periodically(
            state.clone(),
            path.clone(),
            None,
            Duration::from_millis(5),
        ));
        tokio::time::sleep(Duration::from_millis(50)).await;
        task.abort();
        let _ = tokio::fs::remove_file(&path).await;
        let rules = state.rules.current();
        assert!(state.rules.version() >= 1);
        assert_eq!(rules.year(), 2027);
        assert!(rules.contains((state.today)()));
        assert!(rules.get(NaiveDate::from_str("2027-05-31").unwrap()).is_some());
    }
}
