use std::env;
use log::info;
use thiserror::Error;
use crate::config::{load_config, Config, LoadConfigurationError};
use crate::logging::{setup_logger, LoggerError};
use crate::manager_datapoint::DataPoint;
use crate::manager_datapoint::errors::DataPointError;
use crate::manager_emoncms::Emoncms;
use crate::manager_emoncms::errors::EmoncmsError;
use crate::manager_sun::SunCalculator;

pub struct Mgr {
    pub datapoint: DataPoint,
    pub sun: SunCalculator,
    pub emoncms: Vec<Emoncms>,
}

/// Initializes and returns configuration and a Mgr struct holding various of initialized structs
///
pub fn init() -> Result<(Config, Mgr), InitializationError> {
    let args: Vec<String> = env::args().collect();
    let config_path = config_path(&args)?;

    // Load configuration
    let config = load_config(config_path)?;

    // Setup logging
    let _ = setup_logger(&config.general.log_path, config.general.log_level, config.general.log_to_stdout)?;

    // Print version
    info!("starting metoffice emoncms version: {}", env!("CARGO_PKG_VERSION"));

    // Instantiate structs
    let datapoint = DataPoint::new(&config.datapoint)?;
    let sun = SunCalculator::new();
    let emoncms = endpoints(&config)?;

    let mgr = Mgr {
        datapoint,
        sun,
        emoncms,
    };

    Ok((config, mgr))
}

/// Returns one emoncms client per enabled endpoint, in configuration order
///
/// # Arguments
///
/// * 'config' - configuration holding the endpoints
fn endpoints(config: &Config) -> Result<Vec<Emoncms>, EmoncmsError> {
    let mut emoncms: Vec<Emoncms> = Vec::new();
    for e in config.endpoints.iter() {
        if e.enabled {
            emoncms.push(Emoncms::new(e)?);
        } else {
            info!("endpoint {} is disabled", e.name);
        }
    }

    Ok(emoncms)
}

/// Returns the path given with the --config=<path> argument
///
/// # Arguments
///
/// * 'args' - command line arguments
fn config_path(args: &[String]) -> Result<&str, InitializationError> {
    args.iter()
        .find_map(|a| a.strip_prefix("--config="))
        .filter(|p| !p.is_empty())
        .ok_or_else(|| InitializationError::ArgumentError("usage: metoffice_emoncms --config=<path>".to_string()))
}

/// Error depicting errors that occur while initializing
///
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("ArgumentError: {0}")]
    ArgumentError(String),
    #[error("ConfigurationError: {0}")]
    ConfigurationError(#[from] LoadConfigurationError),
    #[error("SetupLoggerError: {0}")]
    SetupLoggerError(#[from] LoggerError),
    #[error("DataPointSetupError: {0}")]
    DataPointSetupError(#[from] DataPointError),
    #[error("EmoncmsSetupError: {0}")]
    EmoncmsSetupError(#[from] EmoncmsError),
}
