//! Variable registry
//!
//! Owns the raw variables, the resolved cache derived from them, and the
//! dirty flag that keeps the two in step. Resolved values can only be read
//! after a successful [`VariableRegistry::resolve_all`] with no edits since.

use confvar_domain::{ResolverSettings, Variable};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ApplicationError, ApplicationResult};
use crate::variable_resolver::engine::{ResolvedStore, VariableResolver, VariableStore};
use crate::variable_resolver::parser::{has_references, parse_references};

/// One resolved variable, as handed to output formatters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    /// The variable name.
    pub name: String,
    /// Description from the raw variable.
    pub description: String,
    /// Fully expanded values.
    pub values: Vec<String>,
}

/// Named configuration variables with `$(name)` reference resolution.
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    variables: VariableStore,
    resolved: ResolvedStore,
    settings: ResolverSettings,
    /// True when `variables` changed since the last successful resolve.
    dirty: bool,
}

impl VariableRegistry {
    /// Creates an empty registry with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given settings.
    #[must_use]
    pub fn with_settings(settings: ResolverSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Returns the resolver settings.
    #[must_use]
    pub const fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Returns true if raw variables changed since the last resolve.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the variable named `name`, creating an empty one if needed.
    ///
    /// The registry is marked dirty, since the caller is assumed to edit it.
    pub fn get_or_create_variable(&mut self, name: impl Into<String>) -> &mut Variable {
        self.dirty = true;
        let name = name.into();
        self.variables
            .entry(name.clone())
            .or_insert_with(|| Variable::new(name))
    }

    /// Returns the raw variable named `name` without marking the registry dirty.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Returns the names of all raw variables in registration order.
    pub fn variable_names(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Returns the description of a raw variable.
    #[must_use]
    pub fn description(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(Variable::description)
    }

    /// Registers a constant variable.
    ///
    /// If the registry is clean, the values hold no references and no raw
    /// value refers to `name`, they are copied straight into the resolved
    /// cache and the registry stays clean.
    ///
    /// # Errors
    /// Returns [`ApplicationError::DuplicateConstant`] if `name` is already registered.
    pub fn add_constant<I, S>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        values: I,
    ) -> ApplicationResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if self.variables.contains_key(&name) {
            return Err(ApplicationError::DuplicateConstant(name));
        }

        let variable = Variable::constant(name.clone(), description, values);
        if !self.dirty {
            if variable.iter().any(|value| has_references(value)) || self.is_referenced(&name) {
                self.dirty = true;
            } else {
                self.resolved.insert(name.clone(), variable.values().to_vec());
            }
        }
        self.variables.insert(name, variable);
        Ok(())
    }

    /// Appends raw `(name, value)` pairs, tagging each touched variable with
    /// `description`. Pairs with an empty name are skipped.
    ///
    /// Returns the number of pairs imported.
    ///
    /// # Errors
    /// Returns [`ApplicationError::Domain`] if a pair targets a constant variable.
    pub fn import_pairs<I, K, V>(&mut self, pairs: I, description: &str) -> ApplicationResult<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut imported = 0;
        for (name, value) in pairs {
            let name = name.into();
            if name.is_empty() {
                continue;
            }
            let variable = self.get_or_create_variable(name);
            variable.set_description(description)?;
            variable.append(value)?;
            imported += 1;
        }
        debug!(imported, description, "imported raw variables");
        Ok(imported)
    }

    /// Removes a raw variable, returning it if it was registered.
    pub fn remove_variable(&mut self, name: &str) -> Option<Variable> {
        let removed = self.variables.shift_remove(name);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    /// Resolves every registered variable from scratch.
    ///
    /// # Errors
    /// Returns [`ApplicationError::CircularReference`] on a reference cycle, or
    /// [`ApplicationError::UnknownReference`] under strict references. On error
    /// the registry stays dirty.
    pub fn resolve_all(&mut self) -> ApplicationResult<()> {
        self.resolved.clear();
        self.dirty = true;

        let mut resolver =
            VariableResolver::new(&self.variables, &mut self.resolved, &self.settings);
        for name in self.variables.keys() {
            if let Err(err) = resolver.resolve_name(name) {
                warn!(variable = %name, error = %err, "failed to resolve variable");
                return Err(err);
            }
        }

        self.dirty = false;
        debug!(variables = self.resolved.len(), "resolved all variables");
        Ok(())
    }

    /// Expands `text` as an ad-hoc value and joins the result with a single space.
    ///
    /// # Errors
    /// Same as [`Self::resolve_string_with`].
    pub fn resolve_string(&mut self, text: &str) -> ApplicationResult<String> {
        self.resolve_string_with(text, " ")
    }

    /// Expands `text` as an ad-hoc value and joins the result with `separator`.
    ///
    /// A dirty registry is resolved first.
    ///
    /// # Errors
    /// Propagates resolution errors from [`Self::resolve_all`] and from the
    /// expansion of `text` itself.
    pub fn resolve_string_with(
        &mut self,
        text: &str,
        separator: &str,
    ) -> ApplicationResult<String> {
        if self.dirty {
            self.resolve_all()?;
        }

        let mut resolver =
            VariableResolver::new(&self.variables, &mut self.resolved, &self.settings);
        let values = resolver.expand(&[text.to_string()])?;
        Ok(values.join(separator))
    }

    /// Returns the resolved values of `name`, or an empty slice if it is not registered.
    ///
    /// # Errors
    /// Returns [`ApplicationError::NotResolved`] while the registry is dirty.
    pub fn get(&self, name: &str) -> ApplicationResult<&[String]> {
        Ok(self.lookup(name)?.unwrap_or_default())
    }

    /// Returns the resolved values of `name`, or `None` if it is not registered.
    ///
    /// # Errors
    /// Returns [`ApplicationError::NotResolved`] while the registry is dirty.
    pub fn lookup(&self, name: &str) -> ApplicationResult<Option<&[String]>> {
        self.ensure_resolved()?;
        Ok(self.resolved.get(name).map(Vec::as_slice))
    }

    /// Returns true if `name` has resolved values.
    ///
    /// # Errors
    /// Returns [`ApplicationError::NotResolved`] while the registry is dirty.
    pub fn contains(&self, name: &str) -> ApplicationResult<bool> {
        self.ensure_resolved()?;
        Ok(self.resolved.contains_key(name))
    }

    /// Returns the number of resolved variables.
    ///
    /// # Errors
    /// Returns [`ApplicationError::NotResolved`] while the registry is dirty.
    pub fn len(&self) -> ApplicationResult<usize> {
        self.ensure_resolved()?;
        Ok(self.resolved.len())
    }

    /// Returns true if there are no resolved variables.
    ///
    /// # Errors
    /// Returns [`ApplicationError::NotResolved`] while the registry is dirty.
    pub fn is_empty(&self) -> ApplicationResult<bool> {
        self.ensure_resolved()?;
        Ok(self.resolved.is_empty())
    }

    /// Iterates resolved variable names. Use `.rev()` for reverse order.
    ///
    /// # Errors
    /// Returns [`ApplicationError::NotResolved`] while the registry is dirty.
    pub fn names(&self) -> ApplicationResult<impl DoubleEndedIterator<Item = &str>> {
        self.ensure_resolved()?;
        Ok(self.resolved.keys().map(String::as_str))
    }

    /// Iterates resolved `(name, values)` pairs.
    ///
    /// # Errors
    /// Returns [`ApplicationError::NotResolved`] while the registry is dirty.
    pub fn iter(&self) -> ApplicationResult<impl DoubleEndedIterator<Item = (&str, &[String])>> {
        self.ensure_resolved()?;
        Ok(self
            .resolved
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice())))
    }

    /// Collects every resolved variable with its description, for output formatters.
    ///
    /// # Errors
    /// Returns [`ApplicationError::NotResolved`] while the registry is dirty.
    pub fn snapshot(&self) -> ApplicationResult<Vec<ResolvedEntry>> {
        Ok(self
            .iter()?
            .map(|(name, values)| ResolvedEntry {
                name: name.to_string(),
                description: self.description(name).unwrap_or_default().to_string(),
                values: values.to_vec(),
            })
            .collect())
    }

    /// Returns true if any raw value references `name`.
    fn is_referenced(&self, name: &str) -> bool {
        self.variables
            .values()
            .flat_map(Variable::iter)
            .any(|value| parse_references(value).iter().any(|r| r.name == name))
    }

    const fn ensure_resolved(&self) -> ApplicationResult<()> {
        if self.dirty {
            Err(ApplicationError::NotResolved)
        } else {
            Ok(())
        }
    }
}
