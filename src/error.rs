use thiserror::Error;

pub const NO_QUESTION: &str = "No question provided.";
pub const UNKNOWN_UPSTREAM_ERROR: &str = "Unknown error";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Missing or blank question, rejected before anything is recorded.
    #[error("{0}")]
    InvalidInput(String),

    /// The upstream answered, but with a failure status or an unexpected body.
    #[error("{0}")]
    Upstream(String),

    /// The upstream could not be reached or its body could not be read.
    #[error("Server error: {0}")]
    Server(String),
}

impl RelayError {
    pub fn no_question() -> Self {
        Self::InvalidInput(NO_QUESTION.to_string())
    }

    pub fn server(err: impl std::fmt::Display) -> Self {
        Self::Server(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
