//! Error types for NightGuard client operations

use thiserror::Error;

/// Result type alias for NightGuard client operations
pub type Result<T> = std::result::Result<T, NightguardError>;

/// Errors that can occur while talking to the connected-vehicle API
#[derive(Error, Debug)]
pub enum NightguardError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Service configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Token or API key cannot be sent as a header value
    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    /// VIN is not 17 alphanumeric characters
    #[error("Invalid VIN: {0}")]
    InvalidVin(String),

    /// No media type is configured for the endpoint, nothing was sent
    #[error("No media type configured for endpoint '{0}'")]
    UnmappedEndpoint(String),

    /// The API answered with a status other than 200 or 202
    #[error("API error {status}: {message}")]
    ApiStatus { status: u16, message: String },

    /// A previous call failed fatally; the session no longer issues requests
    #[error("Session terminated by an earlier fatal API response")]
    SessionTerminated,

    /// The account's vehicle does not match the requested VIN
    #[error("The given VIN ({expected}) does not match the API's VIN ({actual})")]
    VinMismatch { expected: String, actual: String },

    /// The account has no vehicles
    #[error("The API returned no vehicles for this account")]
    NoVehicles,

    /// A 202 response did not carry an operation id to follow up on
    #[error("Accepted response for '{0}' carried no operationId")]
    MissingOperationId(String),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl NightguardError {
    /// Create an API status error from status code and message
    pub fn api_status(status: u16, message: impl Into<String>) -> Self {
        Self::ApiStatus {
            status,
            message: message.into(),
        }
    }

    /// Whether the error ends the session.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ApiStatus { .. }
                | Self::SessionTerminated
                | Self::VinMismatch { .. }
                | Self::NoVehicles
        )
    }
}
