//! Error types for gadget-types.

use thiserror::Error;

/// Errors that can occur when parsing activity kind names.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The name does not denote any known activity kind.
    #[error("Unknown activity kind: {0}")]
    UnknownKind(String),

    /// An empty kind list was given where at least one kind is required.
    #[error("Empty activity kind list")]
    EmptyKindList,
}

/// Result type alias using gadget-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
