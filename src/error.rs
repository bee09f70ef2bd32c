//! Client error type shared by the transport, API and config layers.
//!
//! ERROR HANDLING
//! ==============
//! Transport-level failures are values, never panics. The session manager and
//! the UI shell fold them into explicit outcome enums so a failed refresh or
//! revoke degrades to the anonymous view instead of aborting the page.

/// Errors produced while talking to the registry.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The configured base URL could not be parsed or joined.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced a response (connect, timeout, body read).
    #[error("request failed: {0}")]
    Transport(String),

    /// The registry answered with a non-success status.
    #[error("server returned status {status}")]
    Status { status: u16, body: String },

    /// The response body was not the JSON shape we expected.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// A success response lacked a field the caller depends on.
    #[error("missing expected field `{0}`")]
    MissingField(&'static str),

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status carried by the error, when the server produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
