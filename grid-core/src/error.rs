use rayon::ThreadPoolBuildError;
use thiserror::Error;

/// Errors raised by configuration and the frame driver lifecycle.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("buffer '{buffer}' has length {actual}, expected {expected}")]
    BufferSizeMismatch {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("frame driver is not initialized")]
    NotInitialized,

    #[error("frame driver is already initialized")]
    AlreadyInitialized,

    #[error("failed to build thread pool")]
    ThreadPoolBuild(
        #[from]
        #[source]
        ThreadPoolBuildError,
    ),
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::InvalidConfiguration(err.to_string())
    }
}
