//! Application error types

use confvar_domain::DomainError;
use thiserror::Error;

/// Application-level errors raised by the registry and resolver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplicationError {
    /// A domain error occurred, such as editing a constant variable.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// A constant was registered under a name that already exists.
    #[error("constant variable '{0}' already defined")]
    DuplicateConstant(String),

    /// A variable transitively references itself.
    #[error("circular reference while resolving '{name}': {}", .cycle.join(" -> "))]
    CircularReference {
        /// The name whose expansion closed the cycle.
        name: String,
        /// The reference path, starting and ending with `name`.
        cycle: Vec<String>,
    },

    /// Resolved values were read while the registry has unresolved edits.
    #[error("config variables were not resolved")]
    NotResolved,

    /// An unregistered name was referenced while strict references are on.
    #[error("reference to undefined variable '{name}'")]
    UnknownReference {
        /// The referenced name.
        name: String,
    },
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
