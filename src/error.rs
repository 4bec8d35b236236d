use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("could not build request: {0}")]
    Request(String),

    #[error("network request failed: {0}")]
    Network(String),

    #[error("submission rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unreadable error response (HTTP {status}): {reason}")]
    MalformedBody { status: u16, reason: String },
}
