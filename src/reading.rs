use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use thiserror::Error;
use crate::geo::{compass_to_degrees, distance_km, GeoError};
use crate::manager_datapoint::codes;
use crate::manager_sun::errors::SunError;
use crate::models::{ForecastReport, ForecastSnapshot, Location, Metric, ReportKind, SnapshotError, SunEventSource, SunEvents, TimeStep};

/// Time step used for forecasts. Forecast steps are 3 hours apart and
/// the third one is the one closest to real time when run after a report update.
const FORECAST_TIME_STEP: usize = 2;

/// Values only found in one kind of report
#[derive(Debug, Clone, PartialEq)]
pub enum KindDetails {
    Forecast {
        feels_like_c: f64,
        wind_gust_mph: f64,
        precipitation_probability_pct: f64,
        max_uv_index: u32,
        uv_guidance: Option<&'static str>,
        visibility_code: String,
        visibility: &'static str,
    },
    Observation {
        dew_point_c: f64,
        pressure_hpa: f64,
        pressure_tendency: String,
        visibility_m: f64,
    },
}

/// One point in time picked out of a weather report, with the day's sun events
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastReading {
    pub kind: ReportKind,
    pub location_name: String,
    pub station_name: String,
    pub station_lat: f64,
    pub station_long: f64,
    pub station_distance_km: f64,
    pub elevation_m: f64,
    pub time_step: usize,
    pub time_steps: usize,
    pub timestamp: NaiveDateTime,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_mph: f64,
    pub wind_direction: String,
    pub wind_direction_deg: f64,
    pub weather_type_code: String,
    pub weather_type: String,
    pub details: KindDetails,
    pub sun: SunEvents,
}

impl ForecastReading {
    /// Picks the time step to use from the report and extracts its values together with
    /// the sun events of the given date
    ///
    /// # Arguments
    ///
    /// * 'report' - the weather report
    /// * 'location' - the location the report was fetched for
    /// * 'sun_source' - source of sun events
    /// * 'date' - the date to get sun events for
    /// * 'time_step' - time step to use instead of the default for the report kind
    pub fn read(report: &ForecastReport, location: &Location, sun_source: &impl SunEventSource, date: NaiveDate, time_step: Option<usize>) -> Result<ForecastReading, ReadingError> {
        let index = select_time_step(report.kind, report.time_steps.len(), time_step)?;
        let step = &report.time_steps[index];

        let wind_direction = text(step, "Wind Direction")?;
        let wind_direction_deg = compass_to_degrees(&wind_direction)?;

        let weather_type_code = text(step, "Weather Type")?;
        let weather_type = codes::weather_type(&weather_type_code)
            .map(strip_qualifier)
            .ok_or_else(|| ReadingError::UnknownWeatherCode(weather_type_code.clone()))?
            .to_string();

        let details = match report.kind {
            ReportKind::Forecast => forecast_details(step)?,
            ReportKind::Observation => observation_details(step)?,
        };

        let sun = sun_source.sun_events(location, date)?;

        let station = &report.station;
        Ok(ForecastReading {
            kind: report.kind,
            location_name: location.name.clone(),
            station_name: station.name.clone(),
            station_lat: station.lat,
            station_long: station.long,
            station_distance_km: distance_km(location.lat, location.long, station.lat, station.long),
            elevation_m: station.elevation,
            time_step: index,
            time_steps: report.time_steps.len(),
            timestamp: step.timestamp,
            temperature_c: number(step, "Temperature")?,
            humidity_pct: number(step, "Screen Relative Humidity")?,
            wind_speed_mph: number(step, "Wind Speed")?,
            wind_direction,
            wind_direction_deg,
            weather_type_code,
            weather_type,
            details,
            sun,
        })
    }

    /// Returns the reading as named metrics, in the order they are to be published
    pub fn snapshot(&self) -> Result<ForecastSnapshot, SnapshotError> {
        let p = self.kind.metric_prefix();

        let mut metrics = vec![Metric::number(format!("{}Temperature_C", p), self.temperature_c)];
        if let KindDetails::Forecast { feels_like_c, .. } = &self.details {
            metrics.push(Metric::number(format!("{}FeelTemperature_C", p), *feels_like_c));
        }
        metrics.push(Metric::number(format!("{}Humidity_P", p), self.humidity_pct));
        metrics.push(Metric::number(format!("{}WindSpeed_mph", p), self.wind_speed_mph));
        metrics.push(Metric::number(format!("{}WindDirection_D", p), self.wind_direction_deg));

        match &self.details {
            KindDetails::Forecast { wind_gust_mph, precipitation_probability_pct, max_uv_index, uv_guidance, visibility, .. } => {
                metrics.push(Metric::number(format!("{}WindGusts_mph", p), *wind_gust_mph));
                metrics.push(Metric::number(format!("{}PrecipitationProbability_P", p), *precipitation_probability_pct));
                metrics.push(Metric::number(format!("{}MaxUVIndex", p), *max_uv_index as f64));
                if let Some(guidance) = uv_guidance {
                    metrics.push(Metric::text(format!("{}UVGuidance", p), *guidance));
                }
                metrics.push(Metric::text(format!("{}Visibility", p), *visibility));
            },
            KindDetails::Observation { dew_point_c, pressure_hpa, pressure_tendency, visibility_m } => {
                metrics.push(Metric::number(format!("{}DewPoint_C", p), *dew_point_c));
                metrics.push(Metric::number(format!("{}Pressure_hPa", p), *pressure_hpa));
                metrics.push(Metric::text(format!("{}PressureTendency", p), pressure_tendency.as_str()));
                metrics.push(Metric::number(format!("{}Visibility_m", p), *visibility_m));
            },
        }

        metrics.push(Metric::text(format!("{}WindDirection", p), self.wind_direction.as_str()));
        metrics.push(Metric::text(format!("{}WeatherType", p), self.weather_type.as_str()));
        metrics.push(Metric::text(format!("{}TimeStamp", p), self.timestamp.format("%Y-%m-%dT%H:%M").to_string()));
        metrics.push(Metric::text(format!("{}StationName", p), self.station_name.as_str()));
        metrics.push(Metric::number(format!("{}StationDistance_km", p), self.station_distance_km));
        metrics.push(Metric::number(format!("{}Elevation_m", p), self.elevation_m));

        metrics.push(Metric::number("DawnTime_24", clock_decimal(self.sun.dawn)));
        metrics.push(Metric::number("SunRiseTime_24", clock_decimal(self.sun.sunrise)));
        metrics.push(Metric::number("NoonTime_24", clock_decimal(self.sun.noon)));
        metrics.push(Metric::number("SunSetTime_24", clock_decimal(self.sun.sunset)));
        metrics.push(Metric::number("DuskTime_24", clock_decimal(self.sun.dusk)));

        ForecastSnapshot::new(metrics)
    }
}

/// Selects which time step of a report to read.
///
/// Forecasts always use index 2 and observations the latest entry, unless overridden.
/// No comparison against the current time is made.
///
/// # Arguments
///
/// * 'kind' - the kind of report
/// * 'len' - number of time steps in the report
/// * 'override_index' - optional index to use instead
pub fn select_time_step(kind: ReportKind, len: usize, override_index: Option<usize>) -> Result<usize, ReadingError> {
    let index = match (override_index, kind) {
        (Some(i), _) => i,
        (None, ReportKind::Forecast) => FORECAST_TIME_STEP,
        (None, ReportKind::Observation) => len.checked_sub(1).ok_or(ReadingError::TimeStepOutOfRange { index: 0, len })?,
    };

    if index >= len {
        return Err(ReadingError::TimeStepOutOfRange { index, len });
    }

    Ok(index)
}

/// Removes any trailing qualifier in brackets, e.g. "Light rain (night)" becomes "Light rain"
///
/// # Arguments
///
/// * 'description' - weather type description
pub fn strip_qualifier(description: &str) -> &str {
    description
        .split_once('(')
        .map_or(description, |(head, _)| head)
        .trim()
}

/// Formats a clock time as hours with the minutes as decimals, so 06:30 becomes 6.30
/// (and not 6.5). Seconds are dropped.
///
/// # Arguments
///
/// * 'time' - the clock time
pub fn clock_decimal(time: NaiveTime) -> f64 {
    (time.hour() * 100 + time.minute()) as f64 / 100.0
}

fn forecast_details(step: &TimeStep) -> Result<KindDetails, ReadingError> {
    let uv = text(step, "Max UV Index")?;
    let max_uv_index = uv.parse::<u32>()
        .map_err(|_| ReadingError::UnknownUVIndex(uv.clone()))?;

    let visibility_code = text(step, "Visibility")?;
    let visibility = codes::visibility(&visibility_code)
        .ok_or_else(|| ReadingError::UnknownVisibilityCode(visibility_code.clone()))?;

    Ok(KindDetails::Forecast {
        feels_like_c: number(step, "Feels Like Temperature")?,
        wind_gust_mph: number(step, "Wind Gust")?,
        precipitation_probability_pct: number(step, "Precipitation Probability")?,
        max_uv_index,
        uv_guidance: codes::uv_guidance(max_uv_index),
        visibility_code,
        visibility,
    })
}

fn observation_details(step: &TimeStep) -> Result<KindDetails, ReadingError> {
    let tendency = text(step, "Pressure Tendency")?;
    let pressure_tendency = codes::pressure_tendency(&tendency)
        .map(str::to_string)
        .unwrap_or(tendency);

    Ok(KindDetails::Observation {
        dew_point_c: number(step, "Dew Point")?,
        pressure_hpa: number(step, "Pressure")?,
        pressure_tendency,
        visibility_m: number(step, "Visibility")?,
    })
}

fn text(step: &TimeStep, field: &str) -> Result<String, ReadingError> {
    step.fields.get(field)
        .map(|f| f.value.clone())
        .ok_or_else(|| ReadingError::MissingField(field.to_string()))
}

fn number(step: &TimeStep, field: &str) -> Result<f64, ReadingError> {
    let value = text(step, field)?;
    value.trim().parse::<f64>()
        .map_err(|_| ReadingError::InvalidField { field: field.to_string(), value })
}

/// Error depicting errors that occur while extracting values from a weather report
///
#[derive(Debug, Error)]
pub enum ReadingError {
    #[error("MissingField: {0}")]
    MissingField(String),
    #[error("InvalidField: {field} = '{value}'")]
    InvalidField { field: String, value: String },
    #[error("UnknownWeatherCode: {0}")]
    UnknownWeatherCode(String),
    #[error("UnknownVisibilityCode: {0}")]
    UnknownVisibilityCode(String),
    #[error("UnknownUVIndex: {0}")]
    UnknownUVIndex(String),
    #[error("{0}")]
    Direction(#[from] GeoError),
    #[error("TimeStepOutOfRange: index {index} of {len} time steps")]
    TimeStepOutOfRange { index: usize, len: usize },
    #[error("SunEventsError: {0}")]
    SunEvents(#[from] SunError),
}
