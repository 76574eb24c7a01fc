pub mod errors;

use chrono::{Datelike, Local, NaiveDate, NaiveTime, TimeDelta, TimeZone};
use log::debug;
use solar_positioning::time::DeltaT;
use solar_positioning::{spa, Horizon, SunriseResult};
use crate::manager_sun::errors::SunError;
use crate::models::{Location, SunEventSource, SunEvents};

/// Calculates sun event times with the NREL solar position algorithm
#[derive(Default)]
pub struct SunCalculator;

impl SunCalculator {
    pub fn new() -> SunCalculator {
        SunCalculator
    }

    /// Calculates the sun events for the given date, expressed as clock times in the given time zone
    ///
    /// # Arguments
    ///
    /// * 'location' - the location to calculate for
    /// * 'date' - the date to calculate for
    /// * 'tz' - the time zone to express the event times in
    pub fn sun_events_in<Tz: TimeZone>(&self, location: &Location, date: NaiveDate, tz: &Tz) -> Result<SunEvents, SunError> {
        let delta_t = DeltaT::estimate_from_date(date.year(), date.month())
            .map_err(|e| SunError::CalculationError(format!("delta T: {}", e)))?;

        let (sunrise, noon, sunset) = events_utc(location, date, delta_t, Horizon::SunriseSunset, "sunrise")?;
        let (dawn, _, dusk) = events_utc(location, date, delta_t, Horizon::CivilTwilight, "civil twilight")?;

        let events = SunEvents {
            dawn: clock_time(date, dawn, tz),
            sunrise: clock_time(date, sunrise, tz),
            noon: clock_time(date, noon, tz),
            sunset: clock_time(date, sunset, tz),
            dusk: clock_time(date, dusk, tz),
        };
        debug!("sun events for {} on {}: {:?}", location.name, date, events);

        Ok(events)
    }
}

impl SunEventSource for SunCalculator {
    fn sun_events(&self, location: &Location, date: NaiveDate) -> Result<SunEvents, SunError> {
        self.sun_events_in(location, date, &Local)
    }
}

/// Returns rise, transit and set for the given horizon as hours after UTC midnight of the date
///
/// # Arguments
///
/// * 'location' - the location to calculate for
/// * 'date' - the date to calculate for
/// * 'delta_t' - difference between terrestrial time and UT in seconds
/// * 'horizon' - the sun elevation that counts as rise and set
/// * 'horizon_name' - name of the horizon used in errors
fn events_utc(location: &Location, date: NaiveDate, delta_t: f64, horizon: Horizon, horizon_name: &str) -> Result<(f64, f64, f64), SunError> {
    let result = spa::sunrise_sunset_utc_for_horizon(
        date.year(),
        date.month(),
        date.day(),
        location.lat,
        location.long,
        delta_t,
        horizon,
    ).map_err(|e| SunError::CalculationError(e.to_string()))?;

    match result {
        SunriseResult::RegularDay { sunrise, transit, sunset } => {
            Ok((sunrise.hours(), transit.hours(), sunset.hours()))
        },
        SunriseResult::AllDay { .. } => {
            Err(SunError::NoSunEventError(format!("sun stays above the {} horizon on {}", horizon_name, date)))
        },
        SunriseResult::AllNight { .. } => {
            Err(SunError::NoSunEventError(format!("sun stays below the {} horizon on {}", horizon_name, date)))
        },
    }
}

/// Converts hours after UTC midnight of a date to a clock time in the given time zone,
/// truncated to whole seconds towards the past
///
/// # Arguments
///
/// * 'date' - the date the hours are counted from
/// * 'hours' - hours after UTC midnight, may be negative or exceed 24
/// * 'tz' - the time zone of the clock
fn clock_time<Tz: TimeZone>(date: NaiveDate, hours: f64, tz: &Tz) -> NaiveTime {
    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    let date_time = midnight + TimeDelta::seconds((hours * 3600.0).floor() as i64);

    date_time.with_timezone(tz).time()
}
