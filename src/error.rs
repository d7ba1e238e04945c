pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("missing input: no pixel data was supplied")]
    MissingInput,

    #[error("invalid dimensions: {width}x{height} (width and height must be positive)")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid dimensions: {width}x{height} overflows the addressable pixel range")]
    DimensionsOverflow { width: u32, height: u32 },

    #[error("buffer length mismatch: expected {expected} bytes (width * height * 4), got {actual}")]
    BufferLengthMismatch { expected: usize, actual: usize },

    #[error("worker unavailable: {0}")]
    WorkerUnavailable(String),

    #[error("worker failed: {0}")]
    WorkerFailed(String),
}

impl ConvertError {
    pub fn worker_unavailable(msg: impl Into<String>) -> Self {
        Self::WorkerUnavailable(msg.into())
    }

    pub fn worker_failed(msg: impl Into<String>) -> Self {
        Self::WorkerFailed(msg.into())
    }
}
