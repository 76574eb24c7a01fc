use std::fs;
use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;
use crate::models::{Location, ReportKind};

const DATAPOINT_BASE_URL: &str = "http://datapoint.metoffice.gov.uk/public/data";

#[derive(Deserialize)]
pub struct LocationParameters {
    pub name: String,
    pub lat: f64,
    pub long: f64,
}

#[derive(Deserialize)]
pub struct DataPointParameters {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub kind: ReportKind,
    /// Overrides the default time step selection (2 for forecasts, the latest for observations)
    #[serde(default)]
    pub time_step: Option<usize>,
}

#[derive(Deserialize)]
pub struct PublishParameters {
    pub enabled: bool,
    #[serde(default)]
    pub include_text: bool,
}

#[derive(Deserialize)]
pub struct EndpointParameters {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub path_prefix: String,
    pub api_key: String,
    pub node_id: String,
}

#[derive(Deserialize)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

#[derive(Deserialize)]
pub struct Config {
    pub general: General,
    pub location: LocationParameters,
    pub datapoint: DataPointParameters,
    pub publish: PublishParameters,
    #[serde(rename = "endpoint", default)]
    pub endpoints: Vec<EndpointParameters>,
}

impl Config {
    pub fn location(&self) -> Location {
        Location {
            name: self.location.name.clone(),
            lat: self.location.lat,
            long: self.location.long,
        }
    }
}

fn default_base_url() -> String {
    DATAPOINT_BASE_URL.to_string()
}

fn default_enabled() -> bool {
    true
}

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, LoadConfigurationError> {
    let toml = fs::read_to_string(config_path)?;

    parse_config(&toml)
}

/// Parses and validates configuration from a TOML string
///
/// # Arguments
///
/// * 'toml' - the configuration in TOML format
pub fn parse_config(toml: &str) -> Result<Config, LoadConfigurationError> {
    let config: Config = toml::from_str(toml)?;
    validate(&config)?;

    Ok(config)
}

/// Checks the configuration for values that would be rejected further down the line
///
/// # Arguments
///
/// * 'config' - the configuration to check
fn validate(config: &Config) -> Result<(), LoadConfigurationError> {
    let location = &config.location;
    if !(-90.0..=90.0).contains(&location.lat) || !(-180.0..=180.0).contains(&location.long) {
        return Err(LoadConfigurationError::ValidationError(
            format!("location {}, {} is out of range", location.lat, location.long)));
    }

    for e in config.endpoints.iter() {
        if e.node_id.is_empty() || e.node_id.chars().any(char::is_whitespace) {
            return Err(LoadConfigurationError::ValidationError(
                format!("node id '{}' of endpoint {} must be non empty without whitespace", e.node_id, e.name)));
        }
        if e.host.is_empty() {
            return Err(LoadConfigurationError::ValidationError(format!("endpoint {} has no host", e.name)));
        }
    }

    Ok(())
}

/// Error depicting errors that occur while loading the configuration
///
#[derive(Debug, Error)]
pub enum LoadConfigurationError {
    #[error("FileError: {0}")]
    FileError(#[from] std::io::Error),
    #[error("ParseError: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("ValidationError: {0}")]
    ValidationError(String),
}
