use thiserror::Error;

/// Errors surfaced by the HTTP API layer.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure: connect, TLS, timeout.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response, carrying the server-supplied error text.
    #[error("remote store rejected the request ({status}): {message}")]
    Remote { status: u16, message: String },

    /// The operation targeted a record the remote store no longer has.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The response body did not match the expected envelope.
    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The client could not be built from the given configuration.
    #[error("invalid API configuration: {0}")]
    InvalidConfig(String),
}
