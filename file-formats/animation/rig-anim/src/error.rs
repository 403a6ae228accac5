use std::io;
use thiserror::Error;

use rig_data::error::RigDataError;

use crate::resource::ResourceId;

/// Error types for animation data loading and processing
#[derive(Error, Debug)]
pub enum AnimError {
    /// I/O Error during reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed or truncated binary data
    #[error("Data error: {0}")]
    Data(#[from] RigDataError),

    /// Envelope carries a schema version this build does not understand
    #[error("Unsupported schema version: {0}")]
    UnsupportedVersion(u8),

    /// Track tag other than translation or rotation
    #[error("Invalid track type: {0}")]
    InvalidTrackType(u8),

    /// A node, clip, state or trigger name is not valid UTF-8
    #[error("Invalid name at offset {offset}: not valid UTF-8")]
    InvalidName { offset: usize },

    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A name is already taken within its set
    #[error("Duplicate {kind} name: {name}")]
    DuplicateName { kind: &'static str, name: String },

    /// A named clip, state or transition does not exist
    #[error("Unknown {kind}: {name}")]
    NotFound { kind: &'static str, name: String },

    /// Skin binds more bones than the palette can hold
    #[error("Skin binds {count} bones, palette capacity is {max}")]
    BoneCountExceeded { count: usize, max: usize },

    /// A clip resource could not be obtained
    #[error("Resource not available: {0}")]
    ResourceNotFound(ResourceId),

    /// Error while importing from a foreign format
    #[error("Import error: {0}")]
    ImportError(String),
}

/// Result type using AnimError
pub type Result<T> = std::result::Result<T, AnimError>;
