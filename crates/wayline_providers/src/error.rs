use std::time::Duration;

use thiserror::Error;

/// Coarse classification of a [`RoutingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingErrorKind {
    /// DNS, connection or protocol failure.
    Transport,
    Timeout,
    /// The body is not JSON or does not match the expected envelope.
    Decode,
    /// The provider answered but returned no usable route.
    EmptyResult,
    /// The provider explicitly reported a non-success status.
    ProviderStatus,
}

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("{provider} returned an invalid {field}: {value}")]
    InvalidValue {
        provider: &'static str,
        field: &'static str,
        value: f64,
    },

    #[error("{provider} found no route between the points")]
    NoRoute { provider: &'static str },

    #[error("Failed to get distance from google map{}", format_status(.status, .message))]
    DistanceUnavailable {
        status: Option<String>,
        message: Option<String>,
    },

    #[error("{provider} reported status {code}{}", format_message(.message))]
    ProviderStatus {
        provider: &'static str,
        code: String,
        message: Option<String>,
    },
}

fn format_status(status: &Option<String>, message: &Option<String>) -> String {
    match (status, message) {
        (Some(status), Some(message)) => format!(": {status} ({message})"),
        (Some(status), None) => format!(": {status}"),
        (None, Some(message)) => format!(": {message}"),
        (None, None) => String::new(),
    }
}

fn format_message(message: &Option<String>) -> String {
    message
        .as_ref()
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

impl RoutingError {
    pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            RoutingError::Timeout(timeout)
        } else {
            RoutingError::Request(error)
        }
    }

    pub fn kind(&self) -> RoutingErrorKind {
        match self {
            RoutingError::Request(_) => RoutingErrorKind::Transport,
            RoutingError::Timeout(_) => RoutingErrorKind::Timeout,
            RoutingError::Api { .. } | RoutingError::ProviderStatus { .. } => {
                RoutingErrorKind::ProviderStatus
            }
            RoutingError::Deserialize(_) | RoutingError::InvalidValue { .. } => {
                RoutingErrorKind::Decode
            }
            RoutingError::NoRoute { .. } => RoutingErrorKind::EmptyResult,
            RoutingError::DistanceUnavailable { status, .. } => match status {
                Some(_) => RoutingErrorKind::ProviderStatus,
                None => RoutingErrorKind::EmptyResult,
            },
        }
    }

    /// Whether the same request may succeed if issued again later.
    /// Nothing in this crate retries; the decision is left to the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            RoutingError::Timeout(_) => true,
            RoutingError::Request(error) => error.is_connect(),
            RoutingError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
