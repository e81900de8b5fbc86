use thiserror::Error;

/// Why a single collection fetch failed
///
/// The `Display` text is what ends up in the resource's error slot.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("No session id found, please sign in again")]
    NoSession,

    #[error("Endpoint not found: {endpoint} (404) {body}")]
    NotFound { endpoint: String, body: String },

    #[error("Server error on {endpoint} (500) {body}")]
    Server { endpoint: String, body: String },

    #[error("HTTP {status} on {endpoint}: {body}")]
    Http {
        status: u16,
        endpoint: String,
        body: String,
    },

    #[error("{0}")]
    Application(String),

    #[error("Network error on {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    #[error("Invalid response from {endpoint}: {message}")]
    InvalidPayload { endpoint: String, message: String },
}

impl FetchError {
    /// Classify a non-2xx answer
    pub fn from_status(status: u16, endpoint: &str, body: String) -> Self {
        let endpoint = endpoint.to_string();
        match status {
            404 => Self::NotFound { endpoint, body },
            500 => Self::Server { endpoint, body },
            _ => Self::Http {
                status,
                endpoint,
                body,
            },
        }
    }
}

/// User-facing wrapper for failures during a bulk refresh
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Unable to load {resource} data, this might be due to backend issues or missing data")]
pub struct BatchFetchError {
    pub resource: String,
    #[source]
    pub source: FetchError,
}
