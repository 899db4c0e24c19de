//! Spatial-subsystem error type.

use thiserror::Error;

use amr_core::SegmentId;

/// Errors produced by `amr-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("segment `{0}` already exists in the layout")]
    DuplicateSegment(String),

    #[error("segment `{0}` not found in layout")]
    UnknownSegment(String),

    #[error("segment {0} not found in layout")]
    SegmentNotFound(SegmentId),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
