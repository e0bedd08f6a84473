//! Resolver settings
//!
//! Tunables for how `$(name)` references are expanded.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Settings applied by the variable registry when resolving references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Join string used when an embedded reference is substituted into
    /// surrounding text.
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Treat references to unregistered names as errors instead of
    /// expanding them to nothing.
    #[serde(default)]
    pub strict_references: bool,
}

fn default_separator() -> String {
    " ".to_string()
}

impl ResolverSettings {
    /// Parses settings from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidSettings`] if the input is not valid JSON
    /// for this shape.
    pub fn from_json(input: &str) -> DomainResult<Self> {
        serde_json::from_str(input).map_err(|e| DomainError::InvalidSettings(e.to_string()))
    }

    /// Returns a copy with strict reference checking turned on or off.
    #[must_use]
    pub fn with_strict_references(mut self, strict: bool) -> Self {
        self.strict_references = strict;
        self
    }

    /// Returns a copy using `separator` for embedded substitutions.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            strict_references: false,
        }
    }
}
