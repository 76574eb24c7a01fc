use chrono::{Local, NaiveDate};
use log::info;
use crate::config::Config;
use crate::errors::WorkerError;
use crate::initialization::Mgr;
use crate::manager_emoncms::{publish_all, Emoncms, PublishReport};
use crate::models::{ForecastSource, SunEventSource};
use crate::reading::{ForecastReading, KindDetails};

/// What a run read and how publishing went
pub struct RunSummary {
    pub reading: ForecastReading,
    pub metrics: usize,
    pub reports: Vec<PublishReport>,
}

/// Runs one fetch, read and publish cycle for today's date
///
/// # Arguments
///
/// * 'config' - configuration
/// * 'mgr' - struct with configured managers
pub fn run(config: &Config, mgr: &Mgr) -> Result<RunSummary, WorkerError> {
    let date = Local::now().date_naive();

    read_and_publish(config, &mgr.datapoint, &mgr.sun, &mgr.emoncms, date)
}

/// Fetches a report, reads the configured time step and publishes the resulting metrics to all endpoints.
/// Nothing is published if fetching or reading fails.
///
/// # Arguments
///
/// * 'config' - configuration
/// * 'source' - the weather report source
/// * 'sun' - the sun events source
/// * 'endpoints' - endpoints to publish to
/// * 'date' - the date to get sun events for
pub fn read_and_publish(config: &Config, source: &impl ForecastSource, sun: &impl SunEventSource, endpoints: &[Emoncms], date: NaiveDate) -> Result<RunSummary, WorkerError> {
    let location = config.location();

    let report = source.fetch_report(&location, config.datapoint.kind)?;
    info!("fetched {:?} report from {} with {} time steps", report.kind, report.station.name, report.time_steps.len());

    let reading = ForecastReading::read(&report, &location, sun, date, config.datapoint.time_step)?;
    log_reading(&reading);

    let snapshot = reading.snapshot()?;

    let reports = if config.publish.enabled {
        publish_all(endpoints, &snapshot, config.publish.include_text)
    } else {
        info!("publishing disabled, {} metrics not sent", snapshot.len());
        Vec::new()
    };

    Ok(RunSummary { reading, metrics: snapshot.len(), reports })
}

/// Logs the reading in a readable form
///
/// # Arguments
///
/// * 'r' - the reading to log
fn log_reading(r: &ForecastReading) {
    info!("weather data for {} from {} ({}, {}), {} km away",
        r.location_name, r.station_name, r.station_lat, r.station_long, r.station_distance_km);
    info!("time step {} of {}, time stamp {}", r.time_step, r.time_steps, r.timestamp);
    info!("elevation: {} m, weather type: {} ({})", r.elevation_m, r.weather_type, r.weather_type_code);
    info!("temperature: {} *C, humidity: {} %", r.temperature_c, r.humidity_pct);
    info!("wind: {} mph from {} ({} *)", r.wind_speed_mph, r.wind_direction, r.wind_direction_deg);

    match &r.details {
        KindDetails::Forecast { feels_like_c, wind_gust_mph, precipitation_probability_pct, max_uv_index, uv_guidance, visibility_code, visibility } => {
            info!("feels like: {} *C, wind gust: {} mph, precipitation probability: {} %",
                feels_like_c, wind_gust_mph, precipitation_probability_pct);
            info!("max UV index: {} ({}), visibility: {} ({})", max_uv_index, uv_guidance.unwrap_or("no guidance"), visibility, visibility_code);
        },
        KindDetails::Observation { dew_point_c, pressure_hpa, pressure_tendency, visibility_m } => {
            info!("dew point: {} *C, pressure: {} hPa ({}), visibility: {} m",
                dew_point_c, pressure_hpa, pressure_tendency, visibility_m);
        },
    }

    info!("dawn: {}, sunrise: {}, noon: {}, sunset: {}, dusk: {}",
        r.sun.dawn, r.sun.sunrise, r.sun.noon, r.sun.sunset, r.sun.dusk);
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use crate::config::parse_config;
    use crate::config::tests::CONFIG;
    use crate::manager_datapoint::errors::DataPointError;
    use crate::manager_emoncms::tests::{closed_port, endpoint, mock_endpoint};
    use crate::models::{ForecastReport, Location, ReportKind};
    use crate::reading::tests::{forecast_report, FixedSun, PolarSun};

    struct FakeSource {
        report: Option<ForecastReport>,
    }

    impl ForecastSource for FakeSource {
        fn fetch_report(&self, _location: &Location, kind: ReportKind) -> Result<ForecastReport, DataPointError> {
            self.report.clone().ok_or(DataPointError::NoSitesError(format!("{:?}", kind)))
        }
    }

    fn config(publish: bool) -> Config {
        let mut config = parse_config(CONFIG).unwrap();
        config.publish.enabled = publish;
        config
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 21).unwrap()
    }

    #[test]
    fn test_run_without_publishing() {
        let source = FakeSource { report: Some(forecast_report(9)) };
        let summary = read_and_publish(&config(false), &source, &FixedSun::new(), &[], date()).unwrap();

        assert_eq!(summary.reading.time_step, 2);
        assert_eq!(summary.metrics, 21);
        assert!(summary.reports.is_empty());
    }

    #[test]
    fn test_source_failure_is_a_data_source_error() {
        let source = FakeSource { report: None };
        let sun = FixedSun::new();
        let result = read_and_publish(&config(true), &source, &sun, &[], date());

        assert!(matches!(result, Err(WorkerError::DataSource(_))));
        assert_eq!(sun.calls.get(), 0);
    }

    #[test]
    fn test_short_report_is_a_field_extraction_error() {
        let source = FakeSource { report: Some(forecast_report(2)) };
        let result = read_and_publish(&config(true), &source, &FixedSun::new(), &[], date());

        assert!(matches!(result, Err(WorkerError::FieldExtraction(_))));
    }

    #[tokio::test]
    async fn test_nothing_is_published_when_reading_fails() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let params = mock_endpoint("mock", &server);
        let result = tokio::task::spawn_blocking(move || {
            let mut report = forecast_report(9);
            report.time_steps[2].fields.remove("Temperature");
            let source = FakeSource { report: Some(report) };
            let endpoints = vec![Emoncms::new(&params).unwrap()];
            read_and_publish(&config(true), &source, &FixedSun::new(), &endpoints, date()).map(|s| s.metrics)
        }).await.unwrap();

        assert!(matches!(result, Err(WorkerError::FieldExtraction(e)) if e.contains("Temperature")));
    }

    #[tokio::test]
    async fn test_sun_failure_is_a_data_source_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let params = mock_endpoint("mock", &server);
        let result = tokio::task::spawn_blocking(move || {
            let source = FakeSource { report: Some(forecast_report(9)) };
            let endpoints = vec![Emoncms::new(&params).unwrap()];
            read_and_publish(&config(true), &source, &PolarSun, &endpoints, date()).map(|s| s.metrics)
        }).await.unwrap();

        assert!(matches!(result, Err(WorkerError::DataSource(_))));
    }

    #[tokio::test]
    async fn test_numeric_metrics_reach_every_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(15)
            .mount(&server)
            .await;

        let live = mock_endpoint("live", &server);
        let dead = endpoint("dead", "127.0.0.1", closed_port());
        let reports = tokio::task::spawn_blocking(move || {
            let source = FakeSource { report: Some(forecast_report(9)) };
            let endpoints = vec![Emoncms::new(&dead).unwrap(), Emoncms::new(&live).unwrap()];
            read_and_publish(&config(true), &source, &FixedSun::new(), &endpoints, date()).map(|s| s.reports)
        }).await.unwrap().unwrap();

        assert_eq!(reports[0], PublishReport { attempted: 15, succeeded: 0, failed: 15, skipped: 6 });
        assert_eq!(reports[1], PublishReport { attempted: 15, succeeded: 15, failed: 0, skipped: 6 });
    }
}
