//! Variable resolution module
//!
//! Provides parsing and resolution of `$(variable)` references.
//!
//! # Usage
//!
//! ```
//! use confvar_application::VariableRegistry;
//!
//! let mut registry = VariableRegistry::new();
//! registry.get_or_create_variable("host").append("localhost").unwrap();
//! registry.get_or_create_variable("url").append("http://$(host)/api").unwrap();
//!
//! registry.resolve_all().unwrap();
//! assert_eq!(registry.get("url").unwrap(), &["http://localhost/api"]);
//! ```

pub mod engine;
pub mod parser;

pub use engine::{ResolvedStore, VariableResolver, VariableStore};
pub use parser::{
    VariableReference, extract_reference_names, has_references, parse_references,
    whole_value_reference,
};
