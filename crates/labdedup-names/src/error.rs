//! Error types for name handling

use thiserror::Error;

/// Result type alias for name operations
pub type Result<T> = std::result::Result<T, NameError>;

/// Errors raised while parsing names
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The text matches none of the accepted name-list grammars
    #[error("Invalid format of the list of names: {0}")]
    InvalidFormat(String),
}
