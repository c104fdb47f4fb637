//! Error taxonomy shared by the token cache, the transport and the resources.

use thiserror::Error;

/// Every public operation of the crate fails with one of these kinds.
///
/// `Configuration`, `Timeout`, `Connection` and `Response` are produced by the
/// authenticated transport; the remaining kinds come from the resource layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SiigoError {
    /// Credentials needed for a token exchange are missing.
    #[error("{0}")]
    Configuration(String),

    /// Connection establishment exceeded the configured timeout.
    #[error("{0}")]
    Timeout(String),

    /// Any other transport-level failure (reset, refused, DNS, read error...).
    #[error("{0}")]
    Connection(String),

    /// A completed response with status >= 400, or a token payload without a token.
    #[error("{status}: {message}")]
    Response { status: u16, message: String },

    /// Caller input rejected before any network call.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    /// A success body could not be decoded into the expected record.
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

impl SiigoError {
    pub fn response(status: u16, message: impl Into<String>) -> Self {
        SiigoError::Response {
            status,
            message: message.into(),
        }
    }

    /// HTTP status carried by a `Response` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            SiigoError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<serde_json::Error> for SiigoError {
    fn from(err: serde_json::Error) -> Self {
        SiigoError::Decode(err.to_string())
    }
}

/// Failure of a single HTTP exchange, before it is surfaced as a [`SiigoError`].
///
/// Keeps the distinction the retry policy needs: connect and read failures are
/// transient, a connect timeout is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendFailure {
    ConnectTimeout(String),
    Connect(String),
    Read(String),
    Other(String),
}

impl SendFailure {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SendFailure::Connect(_) | SendFailure::Read(_))
    }
}

impl From<SendFailure> for SiigoError {
    fn from(failure: SendFailure) -> Self {
        match failure {
            SendFailure::ConnectTimeout(msg) => SiigoError::Timeout(msg),
            SendFailure::Connect(msg) | SendFailure::Read(msg) | SendFailure::Other(msg) => {
                SiigoError::Connection(msg)
            }
        }
    }
}

impl From<reqwest::Error> for SendFailure {
    fn from(err: reqwest::Error) -> Self {
        let msg = err.to_string();
        if err.is_timeout() && err.is_connect() {
            SendFailure::ConnectTimeout(msg)
        } else if err.is_timeout() {
            // read/write timeouts fail fast without retry
            SendFailure::Other(msg)
        } else if err.is_connect() {
            SendFailure::Connect(msg)
        } else if err.is_request() || err.is_body() {
            SendFailure::Read(msg)
        } else {
            SendFailure::Other(msg)
        }
    }
}
