//! # Error Types
//!
//! This module defines the error type shared by every pixgds stage.
//!
//! A scale factor that is absent or non-positive is not an error: it is
//! normalized to `1.0` by [`crate::render::load::normalize_scale`].

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for pixgds operations
#[derive(Debug, Error)]
pub enum Error {
    /// The source image (or a GDSII stream being inspected) could not be read
    #[error("Could not decode {source_name}: {reason}")]
    Decode { source_name: String, reason: String },

    /// The image (or its scaled size) has no pixels
    #[error("Image is empty (zero width or height)")]
    EmptyImage,

    /// A conversion parameter is out of range
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Reading or writing an artifact failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The preview bitmap or the GDSII stream could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),
}

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
