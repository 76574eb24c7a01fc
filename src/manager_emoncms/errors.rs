use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmoncmsError {
    #[error("NetworkError: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("UrlError: {0}")]
    UrlError(String),
    #[error("StatusError: {metric} got {status}")]
    StatusError { metric: String, status: StatusCode },
}
