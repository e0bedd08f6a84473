//! Domain error types

use thiserror::Error;

/// Domain-level errors raised by variable mutation and settings parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A mutation was attempted on a constant variable.
    #[error("cannot change constant variable '{0}'")]
    ImmutableVariable(String),

    /// A positional write or delete fell outside the value sequence.
    #[error("index {index} out of range for variable '{name}' holding {len} values")]
    IndexOutOfRange {
        /// Name of the variable being edited.
        name: String,
        /// The requested position.
        index: usize,
        /// Number of values the variable holds.
        len: usize,
    },

    /// Resolver settings could not be parsed.
    #[error("invalid resolver settings: {0}")]
    InvalidSettings(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
