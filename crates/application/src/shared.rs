//! Thread-safe registry handle
//!
//! A resolve pass reads the raw store throughout its traversal, so edits and
//! resolves must not interleave. [`SharedVariableRegistry`] puts every access
//! behind one lock.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::ApplicationResult;
use crate::registry::VariableRegistry;

/// A cloneable, lock-protected [`VariableRegistry`].
#[derive(Debug, Clone, Default)]
pub struct SharedVariableRegistry {
    inner: Arc<RwLock<VariableRegistry>>,
}

impl SharedVariableRegistry {
    /// Wraps an existing registry.
    #[must_use]
    pub fn new(registry: VariableRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// Runs `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&VariableRegistry) -> R) -> R {
        f(&*self.inner.read())
    }

    /// Runs `f` with exclusive access.
    pub fn write<R>(&self, f: impl FnOnce(&mut VariableRegistry) -> R) -> R {
        f(&mut *self.inner.write())
    }

    /// Resolves every variable under the write lock.
    ///
    /// # Errors
    /// See [`VariableRegistry::resolve_all`].
    pub fn resolve_all(&self) -> ApplicationResult<()> {
        self.inner.write().resolve_all()
    }

    /// Expands a template under the write lock.
    ///
    /// # Errors
    /// See [`VariableRegistry::resolve_string_with`].
    pub fn resolve_string(&self, text: &str, separator: &str) -> ApplicationResult<String> {
        self.inner.write().resolve_string_with(text, separator)
    }

    /// Returns an owned copy of the resolved values of `name`.
    ///
    /// # Errors
    /// See [`VariableRegistry::get`].
    pub fn get(&self, name: &str) -> ApplicationResult<Vec<String>> {
        self.inner.read().get(name).map(<[String]>::to_vec)
    }
}
