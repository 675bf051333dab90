//! The immutable runtime lookup table.
//!
//! # Lookup order
//! 1. exact name in the requested namespace
//! 2. that namespace's wildcard patterns
//! 3. that namespace's default action (exact map only)
//! 4. steps 1-3 against the empty namespace, if the request was not already
//!    there
//! 5. not found (a normal negative result)

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::error::ConfigWarning;
use crate::observability::metrics;
use crate::routing::ActionRouter;
use crate::runtime::model::ActionConfig;

/// How a lookup was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Exact,
    Wildcard,
    Default,
    /// Found in the empty namespace after the requested one missed.
    Global,
    Miss,
}

impl LookupOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            LookupOutcome::Exact => "exact",
            LookupOutcome::Wildcard => "wildcard",
            LookupOutcome::Default => "default",
            LookupOutcome::Global => "global",
            LookupOutcome::Miss => "miss",
        }
    }
}

/// Everything routable under one namespace.
#[derive(Debug, Clone, Default)]
pub struct NamespaceTable {
    pub(crate) actions: IndexMap<String, Arc<ActionConfig>>,
    pub(crate) router: ActionRouter,
    pub(crate) default_action: Option<Arc<ActionConfig>>,
}

impl NamespaceTable {
    pub fn actions(&self) -> &IndexMap<String, Arc<ActionConfig>> {
        &self.actions
    }

    pub fn router(&self) -> &ActionRouter {
        &self.router
    }

    pub fn default_action(&self) -> Option<&Arc<ActionConfig>> {
        self.default_action.as_ref()
    }

    fn find(&self, name: &str) -> Option<(Arc<ActionConfig>, LookupOutcome)> {
        if let Some(action) = self.actions.get(name) {
            return Some((Arc::clone(action), LookupOutcome::Exact));
        }
        if let Some(action) = self.router.match_action(name) {
            return Some((Arc::new(action), LookupOutcome::Wildcard));
        }
        self.default_action
            .as_ref()
            .map(|action| (Arc::clone(action), LookupOutcome::Default))
    }
}

/// One reload's worth of resolved configuration.
#[derive(Debug, Default)]
pub struct RuntimeConfiguration {
    pub(crate) namespaces: HashMap<String, NamespaceTable>,
    pub(crate) constants: IndexMap<String, String>,
    pub(crate) warnings: Vec<ConfigWarning>,
}

impl RuntimeConfiguration {
    /// A snapshot that resolves nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve `name` in `namespace`, falling back to the empty namespace.
    pub fn resolve(&self, namespace: &str, name: &str) -> Option<Arc<ActionConfig>> {
        let (found, outcome) = match self.lookup(namespace, name) {
            Some((action, outcome)) => (Some(action), outcome),
            None => (None, LookupOutcome::Miss),
        };
        metrics::record_lookup(outcome);
        tracing::trace!(namespace = %namespace, action = %name, outcome = outcome.as_str(), "Action lookup");
        found
    }

    /// Like `resolve`, also reporting how the action was found.
    pub fn lookup(&self, namespace: &str, name: &str) -> Option<(Arc<ActionConfig>, LookupOutcome)> {
        if let Some(found) = self.namespaces.get(namespace).and_then(|t| t.find(name)) {
            return Some(found);
        }
        if namespace.is_empty() {
            return None;
        }
        self.namespaces
            .get("")
            .and_then(|t| t.find(name))
            .map(|(action, _)| (action, LookupOutcome::Global))
    }

    /// Every exact action, by namespace then name.
    pub fn all_action_configs(&self) -> HashMap<String, IndexMap<String, Arc<ActionConfig>>> {
        self.namespaces
            .iter()
            .map(|(ns, table)| (ns.clone(), table.actions.clone()))
            .collect()
    }

    pub fn namespace(&self, namespace: &str) -> Option<&NamespaceTable> {
        self.namespaces.get(namespace)
    }

    /// Namespace names, sorted.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.namespaces.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn action_count(&self) -> usize {
        self.namespaces.values().map(|t| t.actions.len()).sum()
    }

    pub fn constants(&self) -> &IndexMap<String, String> {
        &self.constants
    }

    pub fn constant(&self, name: &str) -> Option<&str> {
        self.constants.get(name).map(String::as_str)
    }

    /// Warnings raised while this snapshot was built.
    pub fn diagnostics(&self) -> &[ConfigWarning] {
        &self.warnings
    }
}
