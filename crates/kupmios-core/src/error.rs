use std::time::Duration;

/// Failure to reach a backend or to get a successful HTTP exchange from it.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP transport failure: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
}

/// A response body that does not match the shape we declared for it.
///
/// Kept apart from [`TransportError`] so callers can tell "the service is
/// down" from "the service changed its contract".
#[derive(Debug, thiserror::Error)]
#[error("{what} did not match the expected shape: {message}")]
pub struct DecodeError {
    pub what: String,
    pub message: String,
}

impl DecodeError {
    pub fn new(what: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self {
            what: what.into(),
            message: message.to_string(),
        }
    }
}

/// Stage-level failures raised by the transports, decoders and provider logic.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("operation did not complete within {}ms", budget.as_millis())]
    Timeout { budget: Duration },

    #[error("not found: {0}")]
    Absent(String),

    /// The remote service answered with a structured error object.
    #[error("remote service rejected the request: {0}")]
    Remote(serde_json::Value),

    #[error("unit {unit} is held by {count} UTxOs; it must be an NFT or held by a single UTxO")]
    AmbiguousUnit { unit: String, count: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        CoreError::Transport(TransportError::Http(err))
    }
}

// ==============================================================================
// Provider Error
// ==============================================================================

/// The single error type returned by every [`Provider`](crate::Provider)
/// method. Carries the name of the failing method and the underlying cause.
#[derive(Debug, thiserror::Error)]
#[error("kupmios {method} failed: {cause}")]
pub struct ProviderError {
    method: &'static str,
    #[source]
    cause: CoreError,
}

impl ProviderError {
    pub fn new(method: &'static str, cause: CoreError) -> Self {
        Self { method, cause }
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn cause(&self) -> &CoreError {
        &self.cause
    }

    pub fn into_cause(self) -> CoreError {
        self.cause
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.cause, CoreError::Timeout { .. })
    }

    /// The error object returned by the node bridge, verbatim, if that is
    /// what failed the call.
    pub fn remote_error(&self) -> Option<&serde_json::Value> {
        match &self.cause {
            CoreError::Remote(value) => Some(value),
            _ => None,
        }
    }
}
