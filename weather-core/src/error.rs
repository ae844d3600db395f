use thiserror::Error;

/// Failure classification for a single weather request.
///
/// The `Display` text is the generic description shown to the user when no
/// more specific message applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Connectivity problem, timeout or an unusable request URL.
    #[error("The weather service could not be reached. Check your internet connection and try again.")]
    NetworkError,

    /// Non-success status, unknown city or a payload that could not be decoded.
    #[error("The weather service returned an unexpected response.")]
    InvalidResponse,

    /// The transport gave up on the request. Never shown to the user.
    #[error("The request was cancelled.")]
    Cancelled,
}

impl RequestError {
    /// Whether this failure should stay invisible to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, RequestError::Cancelled)
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_builder() {
            RequestError::NetworkError
        } else if err.is_decode() || err.is_status() {
            RequestError::InvalidResponse
        } else {
            RequestError::Cancelled
        }
    }
}

/// Failures raised by a location provider. These are logged and swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location access was denied")]
    Denied,

    #[error("location is unavailable: {0}")]
    Unavailable(String),

    #[error("location updates were stopped before a fix arrived")]
    Stopped,
}
