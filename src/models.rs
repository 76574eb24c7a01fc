use std::collections::{HashMap, HashSet};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use thiserror::Error;
use crate::manager_datapoint::errors::DataPointError;
use crate::manager_sun::errors::SunError;

/// The fixed point the weather is read for
#[derive(Clone, Debug)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub long: f64,
}

/// Whether a report holds forecasts for a grid point or observations from a weather station
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Forecast,
    Observation,
}

impl ReportKind {
    /// Returns the prefix used for the names of metrics derived from this kind of report
    pub fn metric_prefix(&self) -> &'static str {
        match self {
            ReportKind::Forecast => "LocalForecast",
            ReportKind::Observation => "NearestObservation",
        }
    }
}

/// The site (grid point or weather station) a report belongs to
#[derive(Clone, Debug)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub long: f64,
    pub elevation: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldValue {
    pub value: String,
    pub units: String,
}

/// All fields reported for one point in time, keyed by their long name, e.g. "Wind Speed"
#[derive(Clone, Debug)]
pub struct TimeStep {
    pub timestamp: NaiveDateTime,
    pub fields: HashMap<String, FieldValue>,
}

#[derive(Clone, Debug)]
pub struct ForecastReport {
    pub kind: ReportKind,
    pub station: Station,
    pub time_steps: Vec<TimeStep>,
}

/// Local clock times of the sun events of one day
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunEvents {
    pub dawn: NaiveTime,
    pub sunrise: NaiveTime,
    pub noon: NaiveTime,
    pub sunset: NaiveTime,
    pub dusk: NaiveTime,
}

/// Anything that can produce a weather report for a location
pub trait ForecastSource {
    fn fetch_report(&self, location: &Location, kind: ReportKind) -> Result<ForecastReport, DataPointError>;
}

/// Anything that can tell the sun event times for a location and date
pub trait SunEventSource {
    fn sun_events(&self, location: &Location, date: NaiveDate) -> Result<SunEvents, SunError>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Metric {
    pub name: String,
    pub value: MetricValue,
}

impl Metric {
    pub fn number(name: impl Into<String>, value: f64) -> Metric {
        Metric { name: name.into(), value: MetricValue::Number(value) }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Metric {
        Metric { name: name.into(), value: MetricValue::Text(value.into()) }
    }
}

/// An ordered set of uniquely named metrics, ready to publish
#[derive(Clone, Debug)]
pub struct ForecastSnapshot {
    metrics: Vec<Metric>,
}

impl ForecastSnapshot {
    /// Returns a new snapshot, given that all metric names are unique and free from whitespace
    ///
    /// # Arguments
    ///
    /// * 'metrics' - the metrics in the order they should be published
    pub fn new(metrics: Vec<Metric>) -> Result<ForecastSnapshot, SnapshotError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for m in metrics.iter() {
            if m.name.is_empty() || m.name.chars().any(char::is_whitespace) {
                return Err(SnapshotError::InvalidMetricName(m.name.clone()));
            }
            if !seen.insert(m.name.as_str()) {
                return Err(SnapshotError::DuplicateMetric(m.name.clone()));
            }
        }

        Ok(ForecastSnapshot { metrics })
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Returns the value of the named metric, if present
    ///
    /// # Arguments
    ///
    /// * 'name' - name of the metric
    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.iter().find(|m| m.name == name).map(|m| &m.value)
    }
}

/// Error depicting violations of the snapshot naming rules
///
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("DuplicateMetric: {0}")]
    DuplicateMetric(String),
    #[error("InvalidMetricName: '{0}'")]
    InvalidMetricName(String),
}
