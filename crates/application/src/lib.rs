//! Confvar Application - Variable registry and reference resolution
//!
//! Stores named configuration variables and expands `$(name)` references
//! into final literal values, with memoization and cycle detection.

pub mod error;
pub mod registry;
pub mod shared;
pub mod variable_resolver;

pub use error::{ApplicationError, ApplicationResult};
pub use registry::{ResolvedEntry, VariableRegistry};
pub use shared::SharedVariableRegistry;
pub use variable_resolver::{VariableReference, VariableResolver};
