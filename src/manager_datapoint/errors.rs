use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataPointError {
    #[error("NetworkError: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("ParseError: {0}")]
    ParseError(String),
    #[error("NoSitesError: no {0} sites returned")]
    NoSitesError(String),
    #[error("EmptyReportError: report for site {0} has no time steps")]
    EmptyReportError(String),
}
