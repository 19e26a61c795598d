//! Application-wide error types.

use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    /// User input rejected before any API call (blank fields, bad index,
    /// command that needs a login). Displayed verbatim.
    #[error("{0}")]
    Invalid(String),

    #[error("session file error: {0}")]
    SessionFile(String),

    #[error("api error: {0}")]
    Api(#[from] ApiError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
