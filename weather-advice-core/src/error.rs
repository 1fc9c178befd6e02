use serde::Serialize;
use thiserror::Error;

/// Failures of the weather provider call.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The provider answered with a non-success status; `body` is its raw text.
    #[error("weather provider returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("weather provider returned an unreadable response: {0}")]
    Malformed(String),

    #[error("weather provider returned no days for the requested date")]
    NoDays,

    /// Built through `From<reqwest::Error>`, which drops the URL and its `key`.
    #[error("could not reach weather provider: {0}")]
    Transport(reqwest::Error),

    #[error("invalid weather provider URL: {0}")]
    InvalidBaseUrl(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Transport(err.without_url())
    }
}

/// Failures of the recommendation provider call. These never reach the caller.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("recommendation provider is not configured")]
    NotConfigured,

    #[error("recommendation provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("recommendation provider returned no text")]
    EmptyResponse,

    #[error("recommendation provider returned an unreadable response: {0}")]
    Malformed(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Error returned to the HTTP caller as `{"message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({status_code})")]
pub struct ApiError {
    pub message: String,
    pub status_code: u16,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub message: &'a str,
}

impl ApiError {
    pub const DEFAULT_STATUS: u16 = 400;

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(message, Self::DEFAULT_STATUS)
    }

    pub fn with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self { message: message.into(), status_code }
    }

    pub fn body(&self) -> ErrorBody<'_> {
        ErrorBody { message: &self.message }
    }
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        const BAD_GATEWAY: u16 = 502;
        const INTERNAL: u16 = 500;

        match err {
            WeatherError::Upstream { status, body } => {
                let status = if (400..=599).contains(&status) { status } else { BAD_GATEWAY };
                ApiError::with_status(body, status)
            }
            WeatherError::Transport(_) => {
                ApiError::with_status("could not reach weather provider", BAD_GATEWAY)
            }
            err @ WeatherError::InvalidBaseUrl(_) => {
                ApiError::with_status(err.to_string(), INTERNAL)
            }
            other => ApiError::with_status(other.to_string(), BAD_GATEWAY),
        }
    }
}
