//! Runtime snapshot builder.
//!
//! # Responsibilities
//! - Build the package graph for one reload
//! - Expand every routable action into a full `ActionConfig`
//! - Group actions by namespace and compile each namespace's patterns
//! - Resolve namespace default actions

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::error::{ConfigError, Diagnostics};
use crate::config::schema::EngineSettings;
use crate::interceptor::{construct_interceptor_reference, InstanceCache, ObjectFactory, ResolveContext};
use crate::packages::{PackageAction, PackageGraph, PackageScope};
use crate::routing::ActionRouter;
use crate::runtime::model::{ActionConfig, Params};
use crate::runtime::snapshot::{NamespaceTable, RuntimeConfiguration};
use crate::store::DeclarationStore;

#[derive(Default)]
struct PendingNamespace {
    actions: IndexMap<String, Arc<ActionConfig>>,
    default_action_ref: Option<String>,
}

/// Build a complete snapshot from the declarations in `store`.
pub fn build_snapshot(
    store: &DeclarationStore,
    factory: &dyn ObjectFactory,
    settings: &EngineSettings,
) -> Result<RuntimeConfiguration, ConfigError> {
    let cache = InstanceCache::new();
    let mut diagnostics = Diagnostics::new();
    let mut ctx = ResolveContext::new(factory, &cache, &mut diagnostics);

    let graph = PackageGraph::build(store, &mut ctx)?;
    let default_method: Arc<str> = Arc::from(settings.default_method.as_str());

    let mut pending: IndexMap<String, PendingNamespace> = IndexMap::new();
    for stored in store.packages() {
        let Some(id) = graph.id_of(stored.name()) else {
            continue;
        };
        let package = graph.get(id);
        if package.is_abstract {
            continue;
        }
        let scope = graph.scope(id);
        let namespace = pending.entry(package.namespace.clone()).or_default();

        for action in package.actions.values() {
            let config = build_full_action_config(&scope, action, settings, &default_method, &mut ctx)?;
            if namespace.actions.insert(action.name.clone(), Arc::new(config)).is_some() {
                tracing::debug!(namespace = %package.namespace, action = %action.name, package = %package.name, "Action overrides earlier declaration in namespace");
            }
        }
        if let Some(default_ref) = scope.full_default_action_ref() {
            namespace.default_action_ref = Some(default_ref.to_string());
        }
    }

    let mut namespaces = HashMap::with_capacity(pending.len());
    for (name, ns) in pending {
        let default_action = ns.default_action_ref.as_deref().and_then(|default_ref| {
            let found = ns.actions.get(default_ref).cloned();
            if found.is_none() {
                tracing::warn!(namespace = %name, default_action_ref = %default_ref, "Default action ref names no action in namespace");
            }
            found
        });
        let router = ActionRouter::new(&ns.actions, settings.loose_match);
        tracing::debug!(namespace = %name, actions = ns.actions.len(), patterns = router.len(), "Namespace compiled");
        namespaces.insert(
            name,
            NamespaceTable {
                actions: ns.actions,
                router,
                default_action,
            },
        );
    }

    drop(ctx);
    Ok(RuntimeConfiguration {
        namespaces,
        constants: store.constants().clone(),
        warnings: diagnostics.into_warnings(),
    })
}

/// Apply the package's inherited results, default interceptors, exception
/// mappings and default class to one action.
fn build_full_action_config(
    scope: &PackageScope<'_>,
    action: &PackageAction,
    settings: &EngineSettings,
    default_method: &Arc<str>,
    ctx: &mut ResolveContext<'_>,
) -> Result<ActionConfig, ConfigError> {
    let mut results = scope.all_global_results();
    for (name, result) in &action.results {
        results.insert(name.clone(), result.clone());
    }

    let mut interceptors = Arc::clone(&action.interceptors);
    if interceptors.is_empty() {
        if let Some(default_ref) = scope.full_default_interceptor_ref() {
            interceptors = construct_interceptor_reference(
                scope,
                default_ref,
                &Params::new(),
                &action.location,
                ctx,
            )?;
        }
    }

    let mut exception_mappings = action.exception_mappings.clone();
    exception_mappings.extend(scope.all_exception_mappings());

    let class_name = action
        .class_name
        .clone()
        .or_else(|| scope.full_default_class_ref().map(str::to_string))
        .unwrap_or_else(|| settings.default_action_class.clone());

    Ok(ActionConfig {
        name: action.name.clone(),
        package_name: scope.package().name.clone(),
        class_name,
        method: action.method.clone(),
        params: action.params.clone(),
        results,
        interceptors,
        exception_mappings,
        location: Arc::clone(&action.location),
        default_method: Arc::clone(default_method),
    })
}
