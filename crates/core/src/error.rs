//! Error types for geopair

use thiserror::Error;

/// Main error type for geopair operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid GeoJSON: {reason}")]
    InvalidGeoJson { reason: String },

    #[error("Unsupported geometry at index {index}: {kind}")]
    UnsupportedGeometry { index: usize, kind: String },

    #[error("Invalid geometry at index {index}: {reason}")]
    InvalidGeometry { index: usize, reason: String },

    #[error("{op} failed for pair ({left}, {right}): {reason}")]
    BooleanOp {
        left: usize,
        right: usize,
        op: String,
        reason: String,
    },

    #[error("CRS mismatch: {0} vs {1}")]
    CrsMismatch(String, String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Index pair this error refers to, when it comes from a pairwise operation
    pub fn pair(&self) -> Option<(usize, usize)> {
        match self {
            Error::BooleanOp { left, right, .. } => Some((*left, *right)),
            _ => None,
        }
    }
}

/// Result type alias for geopair operations
pub type Result<T> = std::result::Result<T, Error>;
