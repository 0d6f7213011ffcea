use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForgeError>;

/// Failures of a single model-directory or generation call.
///
/// Every variant is terminal for the call that produced it; nothing retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForgeError {
    /// The query was empty after trimming. Never reaches the network.
    #[error("query cannot be empty")]
    EmptyQuery,

    /// Connection refused, DNS failure, timeout or a non-2xx status.
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The server answered 2xx but the body did not have the expected shape.
    #[error("unexpected response from server: {0}")]
    BadResponse(String),
}

impl ForgeError {
    pub fn unreachable(msg: impl Into<String>) -> Self {
        ForgeError::Unreachable(msg.into())
    }

    pub fn bad_response(msg: impl Into<String>) -> Self {
        ForgeError::BadResponse(msg.into())
    }
}

impl From<reqwest::Error> for ForgeError {
    fn from(err: reqwest::Error) -> Self {
        ForgeError::Unreachable(err.to_string())
    }
}
