//! Configuration variable types
//!
//! A [`Variable`] holds the raw, unresolved values of one named setting.
//! Values may contain `$(name)` references; resolving them is the job of
//! the application layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Whether a variable accepts edits after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mutability {
    /// Values and description can change.
    #[default]
    Mutable,
    /// Every mutating call fails with [`DomainError::ImmutableVariable`].
    Constant,
}

/// A named, ordered sequence of raw string values.
///
/// Values are never absent: an empty sequence is a valid state and is
/// distinct from the variable not being registered at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    name: String,

    #[serde(default)]
    description: String,

    #[serde(default)]
    values: Vec<String>,

    #[serde(default)]
    mutability: Mutability,
}

impl Variable {
    /// Creates an empty mutable variable.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            values: Vec::new(),
            mutability: Mutability::Mutable,
        }
    }

    /// Creates a mutable variable with initial values.
    #[must_use]
    pub fn with_values<I, S>(
        name: impl Into<String>,
        description: impl Into<String>,
        values: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            values: values.into_iter().map(Into::into).collect(),
            mutability: Mutability::Mutable,
        }
    }

    /// Creates a constant variable. Its values and description are fixed.
    #[must_use]
    pub fn constant<I, S>(
        name: impl Into<String>,
        description: impl Into<String>,
        values: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mutability: Mutability::Constant,
            ..Self::with_values(name, description, values)
        }
    }

    /// Returns the variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description (provenance or documentation).
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the raw values in insertion order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns the mutability of this variable.
    #[must_use]
    pub const fn mutability(&self) -> Mutability {
        self.mutability
    }

    /// Returns true if this variable rejects edits.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.mutability == Mutability::Constant
    }

    /// Replaces the description.
    ///
    /// # Errors
    /// Returns [`DomainError::ImmutableVariable`] for constant variables.
    pub fn set_description(&mut self, description: impl Into<String>) -> DomainResult<()> {
        self.ensure_mutable()?;
        self.description = description.into();
        Ok(())
    }

    /// Adds a value at the end.
    ///
    /// # Errors
    /// Returns [`DomainError::ImmutableVariable`] for constant variables.
    pub fn append(&mut self, value: impl Into<String>) -> DomainResult<()> {
        self.ensure_mutable()?;
        self.values.push(value.into());
        Ok(())
    }

    /// Adds several values at the end, keeping their order.
    ///
    /// # Errors
    /// Returns [`DomainError::ImmutableVariable`] for constant variables.
    pub fn extend<I, S>(&mut self, values: I) -> DomainResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_mutable()?;
        self.values.extend(values.into_iter().map(Into::into));
        Ok(())
    }

    /// Returns the raw value at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Overwrites the raw value at `index`.
    ///
    /// # Errors
    /// Returns [`DomainError::ImmutableVariable`] for constant variables and
    /// [`DomainError::IndexOutOfRange`] when `index` is past the end.
    pub fn set(&mut self, index: usize, value: impl Into<String>) -> DomainResult<()> {
        self.ensure_mutable()?;
        let len = self.values.len();
        let slot = self.values.get_mut(index).ok_or_else(|| DomainError::IndexOutOfRange {
            name: self.name.clone(),
            index,
            len,
        })?;
        *slot = value.into();
        Ok(())
    }

    /// Removes and returns the raw value at `index`, shifting later values down.
    ///
    /// # Errors
    /// Returns [`DomainError::ImmutableVariable`] for constant variables and
    /// [`DomainError::IndexOutOfRange`] when `index` is past the end.
    pub fn remove(&mut self, index: usize) -> DomainResult<String> {
        self.ensure_mutable()?;
        if index >= self.values.len() {
            return Err(DomainError::IndexOutOfRange {
                name: self.name.clone(),
                index,
                len: self.values.len(),
            });
        }
        Ok(self.values.remove(index))
    }

    /// Iterates the raw values. Use `.rev()` for reverse order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.values.iter()
    }

    /// Returns the number of raw values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the variable holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn ensure_mutable(&self) -> DomainResult<()> {
        match self.mutability {
            Mutability::Mutable => Ok(()),
            Mutability::Constant => Err(DomainError::ImmutableVariable(self.name.clone())),
        }
    }
}

impl<'a> IntoIterator for &'a Variable {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.name)?;
        writeln!(f, "    description: {}", self.description)?;
        write!(f, "    values: {:?}", self.values)
    }
}
