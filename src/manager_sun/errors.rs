use thiserror::Error;

#[derive(Debug, Error)]
pub enum SunError {
    #[error("CalculationError: {0}")]
    CalculationError(String),
    #[error("NoSunEventError: {0}")]
    NoSunEventError(String),
}
