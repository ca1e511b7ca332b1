use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Stream cancelled: {0}")]
    Cancelled(String),
}

impl StreamError {
    /// The byte source failed before end-of-stream
    pub fn is_transport(&self) -> bool {
        !matches!(self, StreamError::Cancelled(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamError::Cancelled(_))
    }
}

pub type Result<T> = std::result::Result<T, StreamError>;
