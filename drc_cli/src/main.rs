use std::{
    env::current_dir,
    fs::{read_to_string, write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use clap::Parser;
use drc_core::{
    garbage_calendar,
    holiday::HolidayRuleSet,
    holiday_parser,
    ical::generator::Emitter,
    schedule::CollectionScheduler,
};

#[derive(Debug, Parser)]
pub struct Arguments {
    /// the address, only used as the location of the events
    pub address: String,
    /// the collection weekday of the address, e.g. "thursday"
    pub weekday: Weekday,
    /// the text of the holiday notice
    pub holidays: PathBuf,
    /// the year of the holiday notice [default: the current year]
    #[arg(long)]
    pub year: Option<i32>,
    /// the first day of the calendar [default: today]
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// the number of days the calendar covers
    #[arg(long, default_value_t = 90)]
    pub days_ahead: u64,
    /// print the next collection instead of writing the calendar
    #[arg(long)]
    pub next: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Arguments::parse();
    let start = args
        .start
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let year = args.year.unwrap_or(start.year());
    let text = read_to_string(&args.holidays)
        .with_context(|| format!("could not read {}", args.holidays.display()))?;
    let rule_set = HolidayRuleSet::build(year, holiday_parser::parse(&text, year)?)?;
    let scheduler = CollectionScheduler::new(args.weekday, &rule_set);
    if args.next {
        let collection = scheduler.next_collection(start)?;
        println!("{}", collection.actual);
        if collection.actual != collection.nominal {
            log::info!("moved from {} by holidays", collection.nominal);
        }
        return Ok(());
    }
    let end = start
        .checked_add_days(Days::new(args.days_ahead))
        .context("the calendar ends after the last representable date")?;
    let calendar = garbage_calendar::get(&args.address, &scheduler, start, end)?;
    let mut path = current_dir()?;
    path.push("calendar.ics");
    log::info!("writing {}", path.display());
    write(path, calendar.generate())?;
    Ok(())
}
