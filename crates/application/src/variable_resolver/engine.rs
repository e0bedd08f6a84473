//! Variable resolution engine
//!
//! Expands `$(name)` references over a store of raw variables. Each
//! resolved sequence is memoized in the resolved store, and a reference
//! back into the active expansion path is reported as a cycle.
//!
//! Traversal is depth-first over an explicit frame stack, so long
//! reference chains do not grow the call stack.

use std::collections::HashMap;

use confvar_domain::{ResolverSettings, Variable};
use indexmap::{IndexMap, IndexSet};
use tracing::trace;

use super::parser::{parse_references, whole_value_reference};
use crate::error::{ApplicationError, ApplicationResult};

/// Raw variables keyed by name, in registration order.
pub type VariableStore = IndexMap<String, Variable>;

/// Fully expanded value sequences keyed by variable name.
pub type ResolvedStore = IndexMap<String, Vec<String>>;

/// One variable (or ad-hoc value list) being expanded.
struct Frame {
    /// `None` for ad-hoc values that are not stored under a name.
    name: Option<String>,
    values: Vec<String>,
    /// Index of the raw value currently being expanded.
    cursor: usize,
    output: Vec<String>,
}

impl Frame {
    fn new(name: Option<String>, values: Vec<String>) -> Self {
        Self {
            name,
            values,
            cursor: 0,
            output: Vec::new(),
        }
    }
}

/// Outcome of expanding one raw value.
enum Step {
    /// The value expanded to these items.
    Expanded(Vec<String>),
    /// A registered name must be resolved first; the value is retried afterwards.
    Descend(String),
}

/// State of a referenced name.
enum Lookup<'r> {
    Ready(&'r [String]),
    Pending,
}

/// Resolves references against a variable store for one resolve pass.
///
/// The resolver writes every variable it finishes into the resolved store,
/// so later lookups in the same pass, and after it, are served from there.
pub struct VariableResolver<'a> {
    variables: &'a VariableStore,
    resolved: &'a mut ResolvedStore,
    settings: &'a ResolverSettings,
    frames: Vec<Frame>,
    /// Names currently being expanded, outermost first.
    active: IndexSet<String>,
}

impl<'a> VariableResolver<'a> {
    /// Creates a resolver over the given stores.
    #[must_use]
    pub fn new(
        variables: &'a VariableStore,
        resolved: &'a mut ResolvedStore,
        settings: &'a ResolverSettings,
    ) -> Self {
        Self {
            variables,
            resolved,
            settings,
            frames: Vec::new(),
            active: IndexSet::new(),
        }
    }

    /// Resolves a single variable, returning its expanded values.
    ///
    /// Already-resolved names are returned from the resolved store without
    /// recomputation. Unregistered names resolve to an empty sequence.
    ///
    /// # Errors
    /// Returns [`ApplicationError::CircularReference`] if the variable
    /// transitively references itself, or [`ApplicationError::UnknownReference`]
    /// for a missing name under strict references.
    pub fn resolve_name(&mut self, name: &str) -> ApplicationResult<&[String]> {
        if !self.resolved.contains_key(name) && self.variables.contains_key(name) {
            self.descend(name.to_string());
            self.run()?;
        }
        Ok(self.resolved.get(name).map_or(&[][..], Vec::as_slice))
    }

    /// Expands an ad-hoc list of raw values that is not stored under any name.
    ///
    /// Referenced names that are not yet resolved are resolved on demand.
    ///
    /// # Errors
    /// Same as [`Self::resolve_name`].
    pub fn expand(&mut self, values: &[String]) -> ApplicationResult<Vec<String>> {
        self.frames.push(Frame::new(None, values.to_vec()));
        self.run()
    }

    fn run(&mut self) -> ApplicationResult<Vec<String>> {
        let result = self.drive();
        if result.is_err() {
            self.frames.clear();
            self.active.clear();
        }
        result
    }

    fn drive(&mut self) -> ApplicationResult<Vec<String>> {
        loop {
            let step = match self.frames.last() {
                None => return Ok(Vec::new()),
                Some(frame) => match frame.values.get(frame.cursor) {
                    Some(raw) => Some(self.expand_value(raw)?),
                    None => None,
                },
            };

            match step {
                Some(Step::Expanded(items)) => {
                    if let Some(frame) = self.frames.last_mut() {
                        frame.output.extend(items);
                        frame.cursor += 1;
                    }
                }
                Some(Step::Descend(name)) => self.descend(name),
                None => {
                    if let Some(output) = self.complete_frame() {
                        return Ok(output);
                    }
                }
            }
        }
    }

    /// Pushes a frame for a registered, unresolved name.
    fn descend(&mut self, name: String) {
        let values = self
            .variables
            .get(&name)
            .map(|variable| variable.values().to_vec())
            .unwrap_or_default();
        trace!(variable = %name, depth = self.active.len(), "expanding variable");
        self.active.insert(name.clone());
        self.frames.push(Frame::new(Some(name), values));
    }

    /// Pops the finished top frame. Returns the output once the stack is empty.
    ///
    /// Named frames hand their output to the resolved store; a named root
    /// therefore yields an empty vector and is read back from the store.
    fn complete_frame(&mut self) -> Option<Vec<String>> {
        let Frame { name, output, .. } = self.frames.pop()?;
        let is_root = self.frames.is_empty();

        let Some(name) = name else {
            return Some(output);
        };

        self.active.pop();
        trace!(variable = %name, values = output.len(), "resolved variable");
        self.resolved.insert(name, output);
        is_root.then(Vec::new)
    }

    fn lookup(&self, name: &str) -> ApplicationResult<Lookup<'_>> {
        if let Some(values) = self.resolved.get(name) {
            return Ok(Lookup::Ready(values));
        }

        if let Some(start) = self.active.get_index_of(name) {
            let mut cycle: Vec<String> = self.active.iter().skip(start).cloned().collect();
            cycle.push(name.to_string());
            return Err(ApplicationError::CircularReference {
                name: name.to_string(),
                cycle,
            });
        }

        if !self.variables.contains_key(name) {
            if self.settings.strict_references {
                return Err(ApplicationError::UnknownReference {
                    name: name.to_string(),
                });
            }
            trace!(variable = %name, "reference to unregistered variable");
            return Ok(Lookup::Ready(&[]));
        }

        Ok(Lookup::Pending)
    }

    /// Expands one raw value.
    ///
    /// A value that is exactly one reference splices the referenced sequence.
    /// Otherwise each distinct reference is replaced by its sequence joined
    /// with the configured separator, producing a single item.
    fn expand_value(&self, raw: &str) -> ApplicationResult<Step> {
        if let Some(name) = whole_value_reference(raw) {
            return Ok(match self.lookup(name)? {
                Lookup::Ready(values) => Step::Expanded(values.to_vec()),
                Lookup::Pending => Step::Descend(name.to_string()),
            });
        }

        let references = parse_references(raw);
        if references.is_empty() {
            return Ok(Step::Expanded(vec![raw.to_string()]));
        }

        let mut replacements: HashMap<&str, String> = HashMap::new();
        for reference in &references {
            if replacements.contains_key(reference.name.as_str()) {
                continue;
            }
            match self.lookup(&reference.name)? {
                Lookup::Ready(values) => {
                    let joined = values.join(self.settings.separator.as_str());
                    replacements.insert(&reference.name, joined);
                }
                Lookup::Pending => return Ok(Step::Descend(reference.name.clone())),
            }
        }

        let mut text = String::with_capacity(raw.len());
        let mut last_end = 0;
        for reference in &references {
            text.push_str(&raw[last_end..reference.span.start]);
            if let Some(replacement) = replacements.get(reference.name.as_str()) {
                text.push_str(replacement);
            }
            last_end = reference.span.end;
        }
        text.push_str(&raw[last_end..]);

        Ok(Step::Expanded(vec![text]))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store(entries: Vec<(&str, Vec<&str>)>) -> VariableStore {
        entries
            .into_iter()
            .map(|(name, values)| (name.to_string(), Variable::with_values(name, "", values)))
            .collect()
    }

    fn resolve(variables: &VariableStore, name: &str) -> ApplicationResult<Vec<String>> {
        let settings = ResolverSettings::default();
        let mut resolved = ResolvedStore::new();
        let mut resolver = VariableResolver::new(variables, &mut resolved, &settings);
        resolver.resolve_name(name).map(<[String]>::to_vec)
    }

    #[test]
    fn test_literal_values_pass_through() {
        let variables = store(vec![("A", vec!["x", "y z"])]);
        assert_eq!(resolve(&variables, "A").unwrap(), vec!["x", "y z"]);
    }

    #[test]
    fn test_whole_value_splices() {
        let variables = store(vec![("A", vec!["$(B)"]), ("B", vec!["x", "y"])]);
        assert_eq!(resolve(&variables, "A").unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn test_partial_value_joins_with_separator() {
        let variables = store(vec![("A", vec!["pre-$(B)-post"]), ("B", vec!["x", "y"])]);
        assert_eq!(resolve(&variables, "A").unwrap(), vec!["pre-x y-post"]);
    }

    #[test]
    fn test_custom_separator() {
        let variables = store(vec![("A", vec!["[$(B)]"]), ("B", vec!["x", "y"])]);
        let settings = ResolverSettings::default().with_separator(",");
        let mut resolved = ResolvedStore::new();
        let mut resolver = VariableResolver::new(&variables, &mut resolved, &settings);
        assert_eq!(resolver.resolve_name("A").unwrap(), vec!["[x,y]"]);
    }

    #[test]
    fn test_repeated_token_replaced_everywhere() {
        let variables = store(vec![
            ("A", vec!["$(B)+$(B)=$(C)"]),
            ("B", vec!["1"]),
            ("C", vec!["2"]),
        ]);
        assert_eq!(resolve(&variables, "A").unwrap(), vec!["1+1=2"]);
    }

    #[test]
    fn test_whole_value_with_trailing_newline_splices() {
        let variables = store(vec![("A", vec!["$(B)\n"]), ("B", vec!["x", "y"])]);
        assert_eq!(resolve(&variables, "A").unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn test_unknown_reference_is_empty() {
        let variables = store(vec![("A", vec!["$(Z)"]), ("P", vec!["<$(Z)>"])]);
        assert!(resolve(&variables, "A").unwrap().is_empty());
        assert_eq!(resolve(&variables, "P").unwrap(), vec!["<>"]);
    }

    #[test]
    fn test_unregistered_root_is_empty() {
        let variables = store(vec![]);
        assert!(resolve(&variables, "nothing").unwrap().is_empty());
    }

    #[test]
    fn test_strict_unknown_reference() {
        let variables = store(vec![("A", vec!["$(Z)"])]);
        let settings = ResolverSettings::default().with_strict_references(true);
        let mut resolved = ResolvedStore::new();
        let mut resolver = VariableResolver::new(&variables, &mut resolved, &settings);

        let err = resolver.resolve_name("A").unwrap_err();
        assert_eq!(
            err,
            ApplicationError::UnknownReference {
                name: "Z".to_string()
            }
        );
    }

    #[test]
    fn test_multi_level_chain() {
        let variables = store(vec![("A", vec!["$(B)"]), ("B", vec!["$(C)"]), ("C", vec!["done"])]);
        assert_eq!(resolve(&variables, "A").unwrap(), vec!["done"]);
    }

    #[test]
    fn test_mixed_values_keep_order() {
        let variables = store(vec![
            ("itzik", vec!["$(shabat)", "$(shalom)", "$(U) $(mevorach)"]),
            ("shabat", vec!["saturday"]),
            ("shalom", vec!["$(salam) aleykum"]),
            ("salam", vec!["$(peace)"]),
            ("peace", vec!["no more war"]),
            ("mevorach", vec!["blessed"]),
            ("U", vec!["and"]),
        ]);
        assert_eq!(
            resolve(&variables, "itzik").unwrap(),
            vec!["saturday", "no more war aleykum", "and blessed"]
        );
    }

    #[test]
    fn test_memoizes_dependencies() {
        let variables = store(vec![
            ("A", vec!["$(B)-$(C)"]),
            ("B", vec!["$(C)"]),
            ("C", vec!["c"]),
        ]);
        let settings = ResolverSettings::default();
        let mut resolved = ResolvedStore::new();
        let mut resolver = VariableResolver::new(&variables, &mut resolved, &settings);

        resolver.resolve_name("A").unwrap();
        drop(resolver);

        let order: Vec<&str> = resolved.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["C", "B", "A"]);
        assert_eq!(resolved["A"], vec!["c-c"]);
    }

    #[test]
    fn test_two_node_cycle() {
        let variables = store(vec![("A", vec!["$(B)"]), ("B", vec!["$(A)"])]);
        let err = resolve(&variables, "A").unwrap_err();
        assert_eq!(
            err,
            ApplicationError::CircularReference {
                name: "A".to_string(),
                cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()],
            }
        );
    }

    #[test]
    fn test_self_reference_in_partial_value() {
        let variables = store(vec![("A", vec!["x $(A)"])]);
        let err = resolve(&variables, "A").unwrap_err();
        assert!(matches!(err, ApplicationError::CircularReference { ref name, .. } if name == "A"));
    }

    #[test]
    fn test_cycle_path_excludes_entry_prefix() {
        let variables = store(vec![
            ("top", vec!["$(A)"]),
            ("A", vec!["$(B)"]),
            ("B", vec!["x$(A)"]),
        ]);
        let err = resolve(&variables, "top").unwrap_err();
        match err {
            ApplicationError::CircularReference { cycle, .. } => {
                assert_eq!(cycle, vec!["A", "B", "A"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_substitution_is_not_rescanned() {
        let variables = store(vec![("A", vec!["$$(E)(B)"]), ("E", vec![]), ("B", vec!["nope"])]);
        assert_eq!(resolve(&variables, "A").unwrap(), vec!["$(B)"]);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let depth = 20_000;
        let mut variables = VariableStore::new();
        for i in 0..depth {
            let value = format!("$(v{})", i + 1);
            variables.insert(format!("v{i}"), Variable::with_values(format!("v{i}"), "", [value]));
        }
        variables.insert(
            format!("v{depth}"),
            Variable::with_values(format!("v{depth}"), "", ["bottom"]),
        );

        assert_eq!(resolve(&variables, "v0").unwrap(), vec!["bottom"]);
    }

    #[test]
    fn test_expand_ad_hoc_values() {
        let variables = store(vec![("greeting", vec!["hello"]), ("name", vec!["world"])]);
        let settings = ResolverSettings::default();
        let mut resolved = ResolvedStore::new();
        let mut resolver = VariableResolver::new(&variables, &mut resolved, &settings);

        let output = resolver
            .expand(&["$(greeting), $(name)!".to_string()])
            .unwrap();
        assert_eq!(output, vec!["hello, world!"]);
        assert!(resolved.contains_key("greeting"));
        assert!(resolved.contains_key("name"));
    }

    #[test]
    fn test_resolver_is_reusable_after_error() {
        let variables = store(vec![("A", vec!["$(B)"]), ("B", vec!["$(A)"]), ("C", vec!["ok"])]);
        let settings = ResolverSettings::default();
        let mut resolved = ResolvedStore::new();
        let mut resolver = VariableResolver::new(&variables, &mut resolved, &settings);

        assert!(resolver.resolve_name("A").is_err());
        assert_eq!(resolver.resolve_name("C").unwrap(), vec!["ok"]);
    }
}
