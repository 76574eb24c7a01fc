pub mod errors;

use std::time::Duration;
use log::{debug, info, warn};
use reqwest::{StatusCode, Url};
use reqwest::blocking::Client;
use crate::config::EndpointParameters;
use crate::manager_emoncms::errors::EmoncmsError;
use crate::models::{ForecastSnapshot, MetricValue};

/// Struct for posting inputs to one emoncms server
pub struct Emoncms {
    client: Client,
    name: String,
    node_url: Url,
}

/// Outcome of publishing a snapshot to one endpoint
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Emoncms {
    /// Returns a new instance of the Emoncms struct.
    /// The client keeps one connection alive which is reused for all posts.
    ///
    /// # Arguments
    ///
    /// * 'config' - endpoint configuration
    pub fn new(config: &EndpointParameters) -> Result<Emoncms, EmoncmsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(1)
            .build()?;

        let node_url = format!("http://{}:{}{}{}&node={}", config.host, config.port, config.path_prefix, config.api_key, config.node_id);
        let node_url = Url::parse(&node_url)
            .map_err(|e| EmoncmsError::UrlError(format!("{}: {}", config.name, e)))?;

        Ok(Emoncms {
            client,
            name: config.name.clone(),
            node_url,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the url for posting one metric, i.e.
    /// `http://<host>:<port><path prefix><api key>&node=<node id>&json=<metric>:<value>`.
    /// Numbers are written as is, text is form encoded since commas separate inputs for emoncms.
    ///
    /// # Arguments
    ///
    /// * 'metric' - name of the input, must not contain whitespace
    /// * 'value' - the value to post
    pub fn request_url(&self, metric: &str, value: &MetricValue) -> Url {
        let mut url = self.node_url.clone();

        match value {
            MetricValue::Number(_) => {
                let json = format!("json={}:{}", metric, format_value(value));
                let query = match url.query() {
                    Some(q) if !q.is_empty() => format!("{}&{}", q, json),
                    _ => json,
                };
                url.set_query(Some(&query));
            },
            MetricValue::Text(_) => {
                url.query_pairs_mut().append_pair("json", &format!("{}:{}", metric, format_value(value)));
            },
        }

        url
    }

    /// Posts one metric and returns the response status.
    /// The response body is always read to the end so the connection can be reused.
    ///
    /// # Arguments
    ///
    /// * 'metric' - name of the input
    /// * 'value' - the value to post
    pub fn publish(&self, metric: &str, value: &MetricValue) -> Result<StatusCode, EmoncmsError> {
        let response = self.client.get(self.request_url(metric, value)).send()?;
        let status = response.status();
        let _ = response.bytes()?;

        if !status.is_success() {
            return Err(EmoncmsError::StatusError { metric: metric.to_string(), status });
        }

        Ok(status)
    }

    /// Posts every metric in the snapshot, one request each and in snapshot order.
    /// A failed post is logged and does not stop the remaining posts.
    ///
    /// # Arguments
    ///
    /// * 'snapshot' - the metrics to post
    /// * 'include_text' - whether to post text metrics as well as numbers
    pub fn publish_snapshot(&self, snapshot: &ForecastSnapshot, include_text: bool) -> PublishReport {
        let mut report = PublishReport::default();

        for m in snapshot.metrics() {
            if !include_text && matches!(m.value, MetricValue::Text(_)) {
                debug!("{}: skipping text metric {}", self.name, m.name);
                report.skipped += 1;
                continue;
            }

            report.attempted += 1;
            match self.publish(&m.name, &m.value) {
                Ok(status) => {
                    info!("{}: {} data post status and reason - {}", self.name, m.name, status);
                    report.succeeded += 1;
                },
                Err(e) => {
                    warn!("{}: {} data post failed: {}", self.name, m.name, e);
                    report.failed += 1;
                },
            }
        }

        report
    }
}

/// Publishes the snapshot to each endpoint independently of how the others fare
///
/// # Arguments
///
/// * 'endpoints' - the endpoints to publish to
/// * 'snapshot' - the metrics to post
/// * 'include_text' - whether to post text metrics as well as numbers
pub fn publish_all(endpoints: &[Emoncms], snapshot: &ForecastSnapshot, include_text: bool) -> Vec<PublishReport> {
    endpoints.iter()
        .map(|e| {
            let report = e.publish_snapshot(snapshot, include_text);
            info!("{}: posted {} of {} metrics, {} failed", e.name(), report.succeeded, report.attempted, report.failed);
            report
        })
        .collect()
}

/// Formats numbers with two decimals, text is passed as is
///
/// # Arguments
///
/// * 'value' - the value to format
pub fn format_value(value: &MetricValue) -> String {
    match value {
        MetricValue::Number(n) => format!("{:.2}", n),
        MetricValue::Text(t) => t.clone(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::net::TcpListener;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use crate::models::Metric;

    pub(crate) fn endpoint(name: &str, host: &str, port: u16) -> EndpointParameters {
        EndpointParameters {
            name: name.into(),
            enabled: true,
            host: host.into(),
            port,
            path_prefix: "/input/post?apikey=".into(),
            api_key: "write-key".into(),
            node_id: "MetOffice".into(),
        }
    }

    pub(crate) fn mock_endpoint(name: &str, server: &MockServer) -> EndpointParameters {
        let address = server.address();
        endpoint(name, &address.ip().to_string(), address.port())
    }

    /// Returns a port nobody listens on
    pub(crate) fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    fn three_metrics() -> ForecastSnapshot {
        ForecastSnapshot::new(vec![
            Metric::number("Temp", 12.345),
            Metric::number("Humidity", 80.0),
            Metric::number("DawnTime_24", 4.02),
        ]).unwrap()
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&MetricValue::Number(12.345)), "12.35");
        assert_eq!(format_value(&MetricValue::Number(6.3)), "6.30");
        assert_eq!(format_value(&MetricValue::Number(-0.5)), "-0.50");
        assert_eq!(format_value(&MetricValue::Number(1016.0)), "1016.00");
        assert_eq!(format_value(&MetricValue::Text("Light rain".into())), "Light rain");
    }

    #[test]
    fn test_request_url() {
        let emoncms = Emoncms::new(&endpoint("local", "localhost", 8080)).unwrap();
        let url = emoncms.request_url("Temp", &MetricValue::Number(12.345));

        assert_eq!(url.as_str(), "http://localhost:8080/input/post?apikey=write-key&node=MetOffice&json=Temp:12.35");
    }

    #[test]
    fn test_request_url_encodes_text() {
        let emoncms = Emoncms::new(&endpoint("local", "localhost", 8080)).unwrap();
        let url = emoncms.request_url("UVGuidance", &MetricValue::Text("High, cover up & use sunscreen".into()));

        assert_eq!(url.as_str(),
            "http://localhost:8080/input/post?apikey=write-key&node=MetOffice&json=UVGuidance%3AHigh%2C+cover+up+%26+use+sunscreen");
    }

    #[tokio::test]
    async fn test_publish_snapshot() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/input/post"))
            .and(query_param("apikey", "write-key"))
            .and(query_param("node", "MetOffice"))
            .and(query_param("json", "Temp:12.35"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/input/post"))
            .and(query_param("json", "Humidity:80.00"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/input/post"))
            .and(query_param("json", "DawnTime_24:4.02"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let params = mock_endpoint("mock", &server);
        let report = tokio::task::spawn_blocking(move || {
            Emoncms::new(&params).unwrap().publish_snapshot(&three_metrics(), false)
        }).await.unwrap();

        assert_eq!(report, PublishReport { attempted: 3, succeeded: 3, failed: 0, skipped: 0 });
    }

    #[tokio::test]
    async fn test_failed_metric_does_not_block_the_rest() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("json", "Temp:12.35"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(2)
            .mount(&server)
            .await;

        let params = mock_endpoint("mock", &server);
        let report = tokio::task::spawn_blocking(move || {
            Emoncms::new(&params).unwrap().publish_snapshot(&three_metrics(), false)
        }).await.unwrap();

        assert_eq!(report, PublishReport { attempted: 3, succeeded: 2, failed: 1, skipped: 0 });
    }

    #[test]
    fn test_connection_errors_are_counted_per_metric() {
        let emoncms = Emoncms::new(&endpoint("dead", "127.0.0.1", closed_port())).unwrap();

        let report = emoncms.publish_snapshot(&three_metrics(), false);
        assert_eq!(report, PublishReport { attempted: 3, succeeded: 0, failed: 3, skipped: 0 });

        assert!(matches!(emoncms.publish("Temp", &MetricValue::Number(1.0)), Err(EmoncmsError::NetworkError(_))));
    }

    #[tokio::test]
    async fn test_text_metrics_are_skipped_unless_included() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("json", "WeatherType:Light rain"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(query_param("json", "Temp:1.00"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let params = mock_endpoint("mock", &server);
        let (without, with) = tokio::task::spawn_blocking(move || {
            let snapshot = ForecastSnapshot::new(vec![
                Metric::number("Temp", 1.0),
                Metric::text("WeatherType", "Light rain"),
            ]).unwrap();
            let emoncms = Emoncms::new(&params).unwrap();
            (emoncms.publish_snapshot(&snapshot, false), emoncms.publish_snapshot(&snapshot, true))
        }).await.unwrap();

        assert_eq!(without, PublishReport { attempted: 1, succeeded: 1, failed: 0, skipped: 1 });
        assert_eq!(with, PublishReport { attempted: 2, succeeded: 2, failed: 0, skipped: 0 });
    }

    #[tokio::test]
    async fn test_text_with_separators_arrives_whole() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/input/post"))
            .and(query_param("node", "MetOffice"))
            .and(query_param("json", "StationName:Heathrow, Bracknell & Ascot"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let params = mock_endpoint("mock", &server);
        let report = tokio::task::spawn_blocking(move || {
            let snapshot = ForecastSnapshot::new(vec![Metric::text("StationName", "Heathrow, Bracknell & Ascot")]).unwrap();
            Emoncms::new(&params).unwrap().publish_snapshot(&snapshot, true)
        }).await.unwrap();

        assert_eq!(report, PublishReport { attempted: 1, succeeded: 1, failed: 0, skipped: 0 });
    }

    #[tokio::test]
    async fn test_publish_all_endpoints_independently() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/input/post"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(3)
            .mount(&server)
            .await;

        let live = mock_endpoint("live", &server);
        let dead = endpoint("dead", "127.0.0.1", closed_port());
        let reports = tokio::task::spawn_blocking(move || {
            let endpoints = vec![Emoncms::new(&dead).unwrap(), Emoncms::new(&live).unwrap()];
            publish_all(&endpoints, &three_metrics(), false)
        }).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports.iter().map(|r| r.attempted).sum::<usize>(), 6);
        assert_eq!(reports[0], PublishReport { attempted: 3, succeeded: 0, failed: 3, skipped: 0 });
        assert_eq!(reports[1], PublishReport { attempted: 3, succeeded: 3, failed: 0, skipped: 0 });
    }
}
