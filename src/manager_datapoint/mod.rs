pub mod codes;
pub mod errors;
mod models;

use std::collections::HashMap;
use std::time::Duration;
use chrono::{NaiveDate, NaiveTime, TimeDelta};
use log::{debug, info};
use reqwest::blocking::Client;
use serde_json::Value;
use crate::config::DataPointParameters;
use crate::geo::distance_km;
use crate::manager_datapoint::errors::DataPointError;
use crate::manager_datapoint::models::{Site, SiteList, SiteRepDocument};
use crate::models::{FieldValue, ForecastReport, ForecastSource, Location, ReportKind, Station, TimeStep};

/// Struct for fetching forecasts and observations from the Met Office DataPoint service
pub struct DataPoint {
    client: Client,
    base_url: String,
    api_key: String,
}

impl DataPoint {
    /// Returns a DataPoint struct ready for fetching weather reports
    ///
    /// # Arguments
    ///
    /// * 'config' - DataPoint configuration to use
    pub fn new(config: &DataPointParameters) -> Result<DataPoint, DataPointError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(DataPoint {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Retrieves the list of sites that have reports of the given kind
    ///
    /// # Arguments
    ///
    /// * 'kind' - forecast sites or observation stations
    fn site_list(&self, kind: ReportKind) -> Result<Vec<Site>, DataPointError> {
        let url = format!("{}/val/{}/all/json/sitelist", self.base_url, resource(kind).0);

        let json = self.client
            .get(url)
            .query(&vec![("key", self.api_key.as_str())])
            .send()?
            .error_for_status()?
            .text()?;

        let site_list: SiteList = serde_json::from_str(&json)
            .map_err(|e| DataPointError::ParseError(format!("site list: {}", e)))?;
        let sites = site_list.locations.location.into_vec();
        debug!("fetched {} {:?} sites", sites.len(), kind);

        Ok(sites)
    }

    /// Retrieves the report for one site
    ///
    /// # Arguments
    ///
    /// * 'kind' - forecast or observation
    /// * 'site_id' - the DataPoint id of the site
    fn site_report(&self, kind: ReportKind, site_id: &str) -> Result<ForecastReport, DataPointError> {
        let (path, res) = resource(kind);
        let url = format!("{}/val/{}/all/json/{}", self.base_url, path, site_id);

        let json = self.client
            .get(url)
            .query(&vec![("res", res), ("key", self.api_key.as_str())])
            .send()?
            .error_for_status()?
            .text()?;

        let document: SiteRepDocument = serde_json::from_str(&json)
            .map_err(|e| DataPointError::ParseError(format!("site report: {}", e)))?;

        to_report(kind, document)
    }
}

impl ForecastSource for DataPoint {
    /// Fetches the report of the site nearest to the location
    ///
    /// # Arguments
    ///
    /// * 'location' - the location to find the nearest site for
    /// * 'kind' - forecast or observation
    fn fetch_report(&self, location: &Location, kind: ReportKind) -> Result<ForecastReport, DataPointError> {
        let sites = self.site_list(kind)?;
        let (site, distance) = nearest_site(&sites, location.lat, location.long)
            .ok_or_else(|| DataPointError::NoSitesError(format!("{:?}", kind)))?;

        info!("nearest {:?} site to {}: {} (id {}), {} km away", kind, location.name, site.name, site.id, distance);

        self.site_report(kind, &site.id)
    }
}

/// Returns the DataPoint resource path and time resolution for a kind of report
///
/// # Arguments
///
/// * 'kind' - forecast or observation
fn resource(kind: ReportKind) -> (&'static str, &'static str) {
    match kind {
        ReportKind::Forecast => ("wxfcs", "3hourly"),
        ReportKind::Observation => ("wxobs", "hourly"),
    }
}

/// Finds the site closest to the given point together with its distance in km.
/// Sites with unparsable coordinates are ignored.
///
/// # Arguments
///
/// * 'sites' - sites to search
/// * 'lat' - latitude of the point
/// * 'long' - longitude of the point
fn nearest_site(sites: &[Site], lat: f64, long: f64) -> Option<(&Site, f64)> {
    sites.iter()
        .filter_map(|s| {
            let site_lat = s.latitude.parse::<f64>().ok()?;
            let site_long = s.longitude.parse::<f64>().ok()?;
            Some((s, distance_km(lat, long, site_lat, site_long)))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Transforms a SiteRep document into a report with time steps in chronological order
///
/// # Arguments
///
/// * 'kind' - the kind of report the document holds
/// * 'document' - the parsed document
fn to_report(kind: ReportKind, document: SiteRepDocument) -> Result<ForecastReport, DataPointError> {
    let params: HashMap<String, (String, String)> = document.site_rep.wx.param
        .into_vec()
        .into_iter()
        .map(|p| (p.name, (p.description, p.units)))
        .collect();

    let location = document.site_rep.dv.location;
    let elevation = match location.elevation.as_deref() {
        Some(e) => parse_f64("elevation", e)?,
        None => 0.0,
    };
    let station = Station {
        lat: parse_f64("lat", &location.lat)?,
        long: parse_f64("lon", &location.lon)?,
        id: location.i,
        name: location.name,
        elevation,
    };

    let mut time_steps: Vec<TimeStep> = Vec::new();
    for period in location.period.into_vec() {
        let date = NaiveDate::parse_from_str(period.value.trim_end_matches('Z'), "%Y-%m-%d")
            .map_err(|e| DataPointError::ParseError(format!("period date '{}': {}", period.value, e)))?;

        for rep in period.rep.into_vec() {
            time_steps.push(to_time_step(date, rep, &params)?);
        }
    }

    if time_steps.is_empty() {
        return Err(DataPointError::EmptyReportError(station.id));
    }

    Ok(ForecastReport { kind, station, time_steps })
}

/// Transforms one Rep entry into a time step, translating parameter codes into their long names
///
/// # Arguments
///
/// * 'date' - the date of the period the entry belongs to
/// * 'rep' - parameter code to value, where "$" holds minutes after midnight
/// * 'params' - parameter code to long name and units
fn to_time_step(date: NaiveDate, rep: HashMap<String, Value>, params: &HashMap<String, (String, String)>) -> Result<TimeStep, DataPointError> {
    let mut minutes: i64 = 0;
    let mut fields: HashMap<String, FieldValue> = HashMap::new();

    for (code, value) in rep {
        let value = match value {
            Value::String(s) => s,
            v => v.to_string(),
        };

        if code == "$" {
            minutes = value.parse::<i64>()
                .map_err(|e| DataPointError::ParseError(format!("minutes '{}': {}", value, e)))?;
            continue;
        }

        let (name, units) = params.get(&code)
            .cloned()
            .unwrap_or_else(|| (code.clone(), String::new()));
        fields.insert(name, FieldValue { value, units });
    }

    let timestamp = TimeDelta::try_minutes(minutes)
        .and_then(|d| date.and_time(NaiveTime::MIN).checked_add_signed(d))
        .ok_or_else(|| DataPointError::ParseError(format!("minutes '{}' out of range", minutes)))?;

    Ok(TimeStep { timestamp, fields })
}

fn parse_f64(what: &str, value: &str) -> Result<f64, DataPointError> {
    value.trim().parse::<f64>()
        .map_err(|e| DataPointError::ParseError(format!("{} '{}': {}", what, value, e)))
}
