use std::fmt;

use thiserror::Error;

/// Provider error code weatherapi.com uses for "No matching location found".
pub const CITY_NOT_FOUND_CODE: i64 = 1006;

/// Everything that can end a single weather lookup.
///
/// None of these are retried; [`LookupError::report`] turns each one into the
/// text shown in place of the temperature.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("weather API key is not configured")]
    MissingApiKey,

    #[error("city not found")]
    CityNotFound,

    #[error("provider error {code}: {message}")]
    Provider { code: i64, message: String },

    #[error("provider resolved '{resolved}' for query '{requested}'")]
    NameMismatch { requested: String, resolved: String },

    #[error("{source}")]
    Status {
        status: u16,
        #[source]
        source: reqwest::Error,
    },

    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("too many redirects: {0}")]
    TooManyRedirects(#[source] reqwest::Error),

    #[error("{0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to decode weather response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl LookupError {
    /// Classify a transport-level failure reported by the HTTP client.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return LookupError::Status { status: status.as_u16(), source: err };
        }
        if err.is_connect() {
            LookupError::Connect(err)
        } else if err.is_timeout() {
            LookupError::Timeout(err)
        } else if err.is_redirect() {
            LookupError::TooManyRedirects(err)
        } else {
            LookupError::Request(err)
        }
    }

    /// Map a provider-level error payload to a lookup error.
    pub fn from_provider(code: i64, message: impl Into<String>) -> Self {
        if code == CITY_NOT_FOUND_CODE {
            LookupError::CityNotFound
        } else {
            LookupError::Provider { code, message: message.into() }
        }
    }

    /// The category/detail pair the user sees for this failure.
    pub fn report(&self) -> ErrorReport {
        match self {
            LookupError::MissingApiKey => {
                ErrorReport::new("API key not found", "Check your .env file")
            }
            LookupError::CityNotFound | LookupError::NameMismatch { .. } => city_not_found(),
            LookupError::Provider { code, message } => {
                ErrorReport::new(format!("API Error {code}"), message.clone())
            }
            LookupError::Status { status, source } => status_report(*status, source),
            LookupError::Connect(_) => {
                ErrorReport::new("Connection Error", "Check your internet connection")
            }
            LookupError::Timeout(_) => ErrorReport::new("Timeout Error", "The request timed out"),
            LookupError::TooManyRedirects(_) => {
                ErrorReport::new("Too many Redirects", "Check the URL")
            }
            LookupError::Request(err) => ErrorReport::new("Request Error", err.to_string()),
            LookupError::Decode(err) => ErrorReport::new("Request Error", err.to_string()),
        }
    }
}

fn city_not_found() -> ErrorReport {
    ErrorReport::new("Not Found", "City not found")
}

fn status_report(status: u16, source: &dyn fmt::Display) -> ErrorReport {
    match status {
        400 => ErrorReport::new("Bad request", "Please check your input"),
        401 => ErrorReport::new("Unauthorized", "Invalid API key"),
        403 => ErrorReport::new("Forbidden", "Access is denied"),
        404 => city_not_found(),
        500 => ErrorReport::new("Internal Server Error", "Please try again later"),
        502 => ErrorReport::new("Bad Gateway", "Invalid response from the server"),
        503 => ErrorReport::new("Service Unavailable", "Server is down"),
        504 => ErrorReport::new("Gateway Timeout", "No response from the server"),
        _ => ErrorReport::new("HTTP error occurred", source.to_string()),
    }
}

/// Human-readable failure, synthesized locally and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub category: String,
    pub detail: String,
}

impl ErrorReport {
    pub fn new(category: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { category: category.into(), detail: detail.into() }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:\n{}", self.category, self.detail)
    }
}

/// Failure of the optional advice call. Rendered inline, never fatal.
#[derive(Debug, Error)]
pub enum AdviceError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response contained no text")]
    Empty,
}
