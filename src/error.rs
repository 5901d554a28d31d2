// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("pose landmark set too short: got {got}, need at least {needed}")]
    TooFewLandmarks { got: usize, needed: usize },

    #[error("landmark {index} has a non-finite coordinate")]
    NonFiniteLandmark { index: usize },

    #[error("frame dimensions must be non-zero (got {width}x{height})")]
    EmptyFrame { width: u32, height: u32 },

    #[error("sensor payload is not valid UTF-8")]
    PayloadEncoding(#[from] std::str::Utf8Error),

    #[error("sensor payload {0:?} is not a numeric reading")]
    PayloadValue(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("tracker pipeline is closed")]
    PipelineClosed,

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackingError>;
