//! Confvar Domain - Core configuration variable types
//!
//! This crate defines the data model for named configuration variables
//! whose values are ordered string sequences.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod settings;
pub mod variable;

pub use error::{DomainError, DomainResult};
pub use settings::ResolverSettings;
pub use variable::{Mutability, Variable};
