//! Failure taxonomy of a forecast lookup.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Missing latitude or longitude parameter")]
    MissingCoordinates,

    #[error("failed to create request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to make request: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to read response: {0}")]
    Body(#[source] reqwest::Error),

    /// Upstream answered outside of 2xx. The status is handed back to the
    /// caller unchanged.
    #[error("API request failed with status: {}", .0.as_u16())]
    UpstreamStatus(StatusCode),

    #[error("Failed to parse points response")]
    PointDecode(#[source] serde_json::Error),

    #[error("Failed to parse forecast response")]
    ForecastDecode(#[source] serde_json::Error),

    #[error("Forecast URL not found")]
    MissingForecastUrl,

    #[error("No forecast periods found")]
    NoPeriods,
}

impl ForecastError {
    /// HTTP status the service answers with for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCoordinates => StatusCode::BAD_REQUEST,
            Self::MissingForecastUrl | Self::NoPeriods => StatusCode::NOT_FOUND,
            Self::UpstreamStatus(status) => *status,
            Self::Request(_)
            | Self::Transport(_)
            | Self::Body(_)
            | Self::PointDecode(_)
            | Self::ForecastDecode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
