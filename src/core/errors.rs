use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    /// Connection, timeout or cancellation failure reported by the HTTP transport.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Response or event payload did not match the expected JSON shape.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The exchange rejected the request (HTTP status >= 400).
    #[error("API error: {code} - {message}")]
    ApiError { code: i64, message: String },

    #[error("Unrecognized user data event: {0}")]
    UnrecognizedEvent(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),
}

impl ExchangeError {
    /// True for failures raised below the exchange protocol (network, timeout, socket).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::HttpError(_) | Self::WebSocketError(_))
    }

    /// Exchange error code when the remote rejected the request.
    pub fn api_code(&self) -> Option<i64> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            _ => None,
        }
    }
}
