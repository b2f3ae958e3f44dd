//! This module renders collections as an iCalendar file.

use anyhow::Result;
use chrono::NaiveDate;
use ical::{
    generator::{IcalCalendar, IcalCalendarBuilder, IcalEvent, IcalEventBuilder, Property},
    ical_property,
};

use crate::schedule::{Collection, CollectionScheduler};

static URL: &str = "https://www.delawareohio.net/departments/public-works/refuse-recycling";
static PROD_ID: &str = "-//Refuse Schedule//delawareohio.net";
static TIMEZONE: &str = "America/New_York";
static FORMAT: &str = "%Y%m%d";

static SUMMARY: &str = "Trash & Recycling Collection";

/// Get the calendar of all collections with a nominal date in `[start, end]`.
///
/// The `address` is only used as a label.
pub fn get(
    address: &str,
    scheduler: &CollectionScheduler,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<IcalCalendar> {
    let collections = scheduler
        .schedule_for(start, end)?
        .collect::<Result<Vec<Collection>, _>>()?;
    log::debug!("rendering {} collections for {address}", collections.len());
    Ok(get_calendar(address, &collections))
}

fn get_calendar(address: &str, collections: &[Collection]) -> IcalCalendar {
    let changed = chrono::Local::now().format("%Y%m%dT%H%M%S").to_string();
    let mut calendar = IcalCalendarBuilder::version("2.0")
        .gregorian()
        .prodid(PROD_ID)
        .build();
    calendar.events.extend(
        collections
            .iter()
            .map(|collection| get_event(address, collection, &changed)),
    );
    calendar
}

/// Build the all-day event of one collection, on its actual date.
fn get_event(address: &str, collection: &Collection, changed: &str) -> IcalEvent {
    IcalEventBuilder::tzid(TIMEZONE)
        .uid(uid(address, collection.nominal))
        .changed(changed)
        .one_day(collection.actual.format(FORMAT).to_string())
        .set(ical_property!("SUMMARY", SUMMARY))
        .set(ical_property!("DESCRIPTION", description(address, collection)))
        .set(ical_property!("LOCATION", address))
        .set(ical_property!("URL", URL))
        .set(ical_property!("TRANSP", "TRANSPARENT"))
        .build()
}

fn description(address: &str, collection: &Collection) -> String {
    if collection.actual == collection.nominal {
        format!("Trash and recycling collection for {address}")
    } else {
        format!(
            "Trash and recycling collection for {address}, moved from {} by holidays",
            collection.nominal.format("%A, %B %-d")
        )
    }
}

/// Get a unique id for the collection of a specific week at a specific address.
///
/// The id follows the nominal date, so a shifted collection replaces its unshifted event.
/// Changing this function is a breaking change!
fn uid(address: &str, nominal: NaiveDate) -> String {
    let address = address.split_whitespace().collect::<Vec<&str>>().join("-");
    format!(
        "RefuseSchedule_{address}_{}@delawareohio.net",
        nominal.format(FORMAT)
    )
}
