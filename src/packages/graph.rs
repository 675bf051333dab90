//! Package arena and inheritance resolution.
//!
//! # Responsibilities
//! - Reject inheritance cycles before anything is built
//! - Build packages in an order where parents always come first
//! - Defer packages whose parents are not built yet and retry them until a
//!   pass makes no progress (fixed point)
//! - Report parents that never appear and build without them

use std::collections::{HashMap, HashSet};

use crate::config::error::{ConfigError, ConfigWarning};
use crate::interceptor::ResolveContext;
use crate::packages::builder::build_package;
use crate::packages::config::{PackageConfig, PackageId};
use crate::packages::merger::PackageScope;
use crate::store::{DeclarationStore, StoredPackage};

/// All built packages, addressed by `PackageId`.
#[derive(Debug, Default)]
pub struct PackageGraph {
    packages: Vec<PackageConfig>,
    index: HashMap<String, PackageId>,
}

impl PackageGraph {
    /// Build every package in `store`.
    pub fn build(store: &DeclarationStore, ctx: &mut ResolveContext<'_>) -> Result<Self, ConfigError> {
        check_cycles(store)?;

        let mut graph = PackageGraph::default();
        let mut pending: Vec<&StoredPackage> = store.packages().collect();
        let mut dropped: HashMap<&str, HashSet<String>> = HashMap::new();
        let mut pass = 0usize;

        while !pending.is_empty() {
            pass += 1;
            let before = pending.len();
            let mut deferred = Vec::new();

            for stored in pending {
                let skip = dropped.get(stored.name());
                let parent_names: Vec<String> = stored
                    .decl
                    .parent_names()
                    .into_iter()
                    .filter(|name| skip.map_or(true, |s| !s.contains(name)))
                    .collect();

                let parents: Option<Vec<PackageId>> =
                    parent_names.iter().map(|name| graph.id_of(name)).collect();
                match parents {
                    Some(parents) => {
                        let mut package =
                            build_package(&stored.decl, &stored.location, parents, &graph, ctx)?;
                        package.needs_refresh = skip.is_some();
                        graph.insert(package);
                    }
                    None => {
                        tracing::debug!(package = %stored.name(), pass, "Parent not built yet, deferring package");
                        deferred.push(stored);
                    }
                }
            }

            if !deferred.is_empty() && deferred.len() == before {
                // No progress: drop parents that were never declared.
                let mut any_dropped = false;
                for stored in &deferred {
                    let missing: Vec<String> = stored
                        .decl
                        .parent_names()
                        .into_iter()
                        .filter(|name| !store.contains(name))
                        .collect();
                    if missing.is_empty() {
                        continue;
                    }
                    ctx.diagnostics.warn(ConfigWarning::UnresolvedParentChain {
                        package: stored.name().to_string(),
                        missing: missing.clone(),
                        location: stored.location.clone(),
                    });
                    dropped.entry(stored.name()).or_default().extend(missing);
                    any_dropped = true;
                }
                if !any_dropped {
                    // Unreachable once cycles are rejected; drop every
                    // unbuilt parent rather than loop forever.
                    for stored in &deferred {
                        let unbuilt = stored
                            .decl
                            .parent_names()
                            .into_iter()
                            .filter(|name| graph.id_of(name).is_none());
                        dropped.entry(stored.name()).or_default().extend(unbuilt);
                    }
                }
            }
            pending = deferred;
        }

        tracing::debug!(packages = graph.len(), passes = pass, "Package graph built");
        Ok(graph)
    }

    fn insert(&mut self, package: PackageConfig) -> PackageId {
        let id = PackageId(self.packages.len());
        self.index.insert(package.name.clone(), id);
        self.packages.push(package);
        id
    }

    pub fn id_of(&self, name: &str) -> Option<PackageId> {
        self.index.get(name).copied()
    }

    /// Panics if `id` did not come from this graph.
    pub fn get(&self, id: PackageId) -> &PackageConfig {
        &self.packages[id.0]
    }

    pub fn by_name(&self, name: &str) -> Option<&PackageConfig> {
        self.id_of(name).map(|id| self.get(id))
    }

    pub fn scope(&self, id: PackageId) -> PackageScope<'_> {
        PackageScope::new(self, self.get(id))
    }

    /// Packages in build order (parents before children).
    pub fn iter(&self) -> impl Iterator<Item = (PackageId, &PackageConfig)> {
        self.packages
            .iter()
            .enumerate()
            .map(|(i, p)| (PackageId(i), p))
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Fail on any inheritance cycle among declared packages.
fn check_cycles(store: &DeclarationStore) -> Result<(), ConfigError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit(
        store: &DeclarationStore,
        name: &str,
        marks: &mut HashMap<String, Mark>,
        path: &mut Vec<String>,
    ) -> Result<(), ConfigError> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = path.iter().position(|n| n == name).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(name.to_string());
                let location = store
                    .get(name)
                    .map(|p| p.location.clone())
                    .unwrap_or_else(crate::config::error::Location::unknown);
                return Err(ConfigError::CyclicInheritance { cycle, location });
            }
            None => {}
        }
        let Some(stored) = store.get(name) else {
            return Ok(());
        };
        marks.insert(name.to_string(), Mark::Visiting);
        path.push(name.to_string());
        for parent in stored.decl.parent_names() {
            if parent == name {
                tracing::error!(package = %name, location = %stored.location, "Package extends itself");
            }
            visit(store, &parent, marks, path)?;
        }
        path.pop();
        marks.insert(name.to_string(), Mark::Done);
        Ok(())
    }

    let mut marks = HashMap::new();
    let mut path = Vec::new();
    for stored in store.packages() {
        visit(store, stored.name(), &mut marks, &mut path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::{Diagnostics, Location};
    use crate::config::schema::{
        InterceptorDecl, InterceptorRefDecl, InterceptorStackDecl, PackageDecl, ResultDecl, ResultTypeDecl,
    };
    use crate::interceptor::{ClassRegistry, InstanceCache};
    use crate::runtime::model::Params;

    fn package(name: &str, extends: Option<&str>) -> PackageDecl {
        PackageDecl {
            name: name.into(),
            extends: extends.map(str::to_string),
            ..Default::default()
        }
    }

    fn result(name: &str) -> ResultDecl {
        ResultDecl {
            name: name.into(),
            result_type: None,
            body: Some(format!("/{name}.html")),
            params: Params::new(),
        }
    }

    fn store_of(decls: Vec<PackageDecl>) -> DeclarationStore {
        let mut store = DeclarationStore::new();
        for decl in decls {
            let location = Location::new("test.toml", format!("package[{}]", decl.name));
            store.add_package(decl, location).unwrap();
        }
        store
    }

    fn build(store: &DeclarationStore) -> (Result<PackageGraph, ConfigError>, Diagnostics) {
        let registry = ClassRegistry::permissive();
        let cache = InstanceCache::new();
        let mut diagnostics = Diagnostics::new();
        let result = {
            let mut ctx = ResolveContext::new(&registry, &cache, &mut diagnostics);
            PackageGraph::build(store, &mut ctx)
        };
        (result, diagnostics)
    }

    fn base() -> PackageDecl {
        let mut base = package("base", None);
        base.result_types.push(ResultTypeDecl {
            name: "dispatch".into(),
            class_name: "DispatchResult".into(),
            default_param: "location".into(),
            is_default: true,
            params: Params::new(),
        });
        base.global_results.push(result("error"));
        base
    }

    #[test]
    fn test_forward_reference_order_independent() {
        let mut child = package("child", Some("base"));
        child.global_results.push(result("error"));
        child.global_results.push(result("login"));

        let forward = store_of(vec![child.clone(), base()]);
        let backward = store_of(vec![base(), child]);
        for store in [forward, backward] {
            let (graph, diagnostics) = build(&store);
            let graph = graph.unwrap();
            assert!(diagnostics.warnings().is_empty());
            let id = graph.id_of("child").unwrap();
            let scope = graph.scope(id);
            let results = scope.all_global_results();
            assert_eq!(results.len(), 2);
            assert_eq!(results["error"].params["location"], "/error.html");
            assert_eq!(results["login"].class_name, "DispatchResult");
            assert!(!graph.get(id).needs_refresh);
        }
    }

    #[test]
    fn test_parents_built_first_and_registry_merged() {
        let mut parent = base();
        parent.interceptors.push(InterceptorDecl {
            name: "timer".into(),
            class_name: "TimerInterceptor".into(),
            params: Params::new(),
        });
        parent.interceptor_stacks.push(InterceptorStackDecl {
            name: "basic".into(),
            interceptor_refs: vec![InterceptorRefDecl {
                name: "timer".into(),
                params: Params::new(),
            }],
        });
        let child = package("child", Some("base"));

        let (graph, _) = build(&store_of(vec![child, parent]));
        let graph = graph.unwrap();
        let order: Vec<_> = graph.iter().map(|(_, p)| p.name.as_str()).collect();
        assert_eq!(order, vec!["base", "child"]);

        let registry = graph.scope(graph.id_of("child").unwrap()).all_interceptors();
        assert!(!registry["timer"].is_stack());
        assert!(registry["basic"].is_stack());
        assert_eq!(registry["basic"].name(), "basic");
    }

    #[test]
    fn test_child_global_result_overrides_parent() {
        let mut child = package("child", Some("base"));
        let mut error = result("error");
        error.body = Some("/child-error.html".into());
        child.global_results.push(error);
        let (graph, _) = build(&store_of(vec![base(), child]));
        let graph = graph.unwrap();
        let results = graph.scope(graph.id_of("child").unwrap()).all_global_results();
        assert_eq!(results["error"].params["location"], "/child-error.html");
    }

    #[test]
    fn test_missing_parent_reported_and_built() {
        let mut orphan = package("orphan", Some("base, ghost"));
        orphan.global_results.push(result("done"));
        let leaf = package("leaf", Some("orphan"));
        let (graph, diagnostics) = build(&store_of(vec![leaf, orphan, base()]));
        let graph = graph.unwrap();
        assert_eq!(graph.len(), 3);
        assert_eq!(
            diagnostics.warnings(),
            &[ConfigWarning::UnresolvedParentChain {
                package: "orphan".into(),
                missing: vec!["ghost".into()],
                location: Location::new("test.toml", "package[orphan]"),
            }]
        );
        let orphan = graph.by_name("orphan").unwrap();
        assert!(orphan.needs_refresh);
        assert_eq!(orphan.parents, vec![graph.id_of("base").unwrap()]);
        assert!(!graph.by_name("leaf").unwrap().needs_refresh);
    }

    #[test]
    fn test_self_extension_rejected() {
        let (graph, _) = build(&store_of(vec![package("loop", Some("loop"))]));
        match graph.unwrap_err() {
            ConfigError::CyclicInheritance { cycle, .. } => assert_eq!(cycle, vec!["loop", "loop"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_longer_cycle_rejected() {
        let store = store_of(vec![
            package("a", Some("c")),
            package("b", Some("a")),
            package("c", Some("b")),
        ]);
        let (graph, _) = build(&store);
        match graph.unwrap_err() {
            ConfigError::CyclicInheritance { cycle, .. } => {
                assert_eq!(cycle, vec!["a", "c", "b", "a"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_result_type() {
        let mut lonely = package("lonely", None);
        lonely.global_results.push(result("error"));
        let (graph, _) = build(&store_of(vec![lonely]));
        match graph.unwrap_err() {
            ConfigError::MissingResultType { result, package, .. } => {
                assert_eq!(result, "error");
                assert_eq!(package, "lonely");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_full_defaults_first_non_null() {
        let mut a = package("a", None);
        a.default_action_ref = Some("fromA".into());
        a.default_class_ref = Some("ClassA".into());
        let mut b = package("b", None);
        b.default_action_ref = Some("fromB".into());
        // Parents are consulted last-declared first.
        let c = package("c", Some("a, b"));
        let (graph, _) = build(&store_of(vec![a, b, c]));
        let graph = graph.unwrap();
        let scope = graph.scope(graph.id_of("c").unwrap());
        assert_eq!(scope.full_default_action_ref(), Some("fromB"));
        assert_eq!(scope.full_default_class_ref(), Some("ClassA"));
        assert_eq!(scope.full_default_interceptor_ref(), None);
    }
}
