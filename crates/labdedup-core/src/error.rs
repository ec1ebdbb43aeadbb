//! Error types for labdedup-core

use thiserror::Error;

use crate::domain::EntityId;

/// Result type alias for labdedup operations
pub type Result<T> = std::result::Result<T, DedupError>;

/// Main error type for labdedup operations
#[derive(Error, Debug)]
pub enum DedupError {
    /// Storage collaborator errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Merge errors
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Name parsing errors
    #[error("Name error: {0}")]
    Name(#[from] labdedup_names::NameError),

    /// A duplicate scan was stopped by its progress observer
    #[error("Duplicate scan cancelled: {0}")]
    Cancelled(String),
}

/// Errors from the storage collaborators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Entity not found: {0}")]
    NotFound(EntityId),

    /// The record cannot be removed while other live records depend on it
    #[error("Entity {id} cannot be removed: {reason}")]
    StructuralConflict { id: EntityId, reason: String },

    /// Several independent failures of one batch
    #[error("{} failures: {}", .0.len(), join_errors(.0))]
    Aggregate(Vec<StoreError>),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl StoreError {
    /// Every leaf failure, flattening nested aggregates.
    pub fn causes(&self) -> Vec<&StoreError> {
        match self {
            StoreError::Aggregate(errors) => errors.iter().flat_map(StoreError::causes).collect(),
            other => vec![other],
        }
    }
}

fn join_errors(errors: &[StoreError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Merge-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MergeError {
    #[error("Merge target not found with identifier: {0}")]
    TargetNotFound(EntityId),

    #[error("Merge sources not found with identifiers: {0:?}")]
    SourcesNotFound(Vec<EntityId>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors that can occur when loading the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
