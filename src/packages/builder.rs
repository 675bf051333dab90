//! Resolves one package's local declarations.
//!
//! Order matters: result types and single interceptors first, then stacks
//! in declaration order (a stack may reference stacks declared before it),
//! then global results, exception mappings and actions.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::error::{ConfigError, Location};
use crate::config::schema::{
    ActionDecl, ExceptionMappingDecl, InterceptorRefDecl, PackageDecl, ResultDecl,
};
use crate::interceptor::{
    construct_interceptor_reference, InterceptorConfig, InterceptorEntry, InterceptorStackConfig,
    ResolveContext,
};
use crate::packages::config::{PackageAction, PackageConfig, PackageId};
use crate::packages::graph::PackageGraph;
use crate::packages::merger::PackageScope;
use crate::runtime::model::{
    ExceptionMappingConfig, InterceptorChain, Params, ResultConfig, ResultTypeConfig,
};

/// Build `decl` on top of already-built `parents`.
pub fn build_package(
    decl: &PackageDecl,
    location: &Location,
    parents: Vec<PackageId>,
    graph: &PackageGraph,
    ctx: &mut ResolveContext<'_>,
) -> Result<PackageConfig, ConfigError> {
    let mut package = PackageConfig::new(&decl.name, location.clone());
    package.namespace = decl.namespace.clone();
    package.is_abstract = decl.is_abstract;
    package.parents = parents;
    package.default_interceptor_ref = decl.default_interceptor_ref.clone();
    package.default_action_ref = decl.default_action_ref.clone();
    package.default_class_ref = decl.default_class_ref.clone();
    package.default_result_type = decl.default_result_type().map(str::to_string);

    for rt in &decl.result_types {
        package.result_types.insert(
            rt.name.clone(),
            ResultTypeConfig {
                name: rt.name.clone(),
                class_name: rt.class_name.clone(),
                default_param: rt.default_param.clone(),
                params: rt.params.clone(),
            },
        );
    }

    for interceptor in &decl.interceptors {
        package.interceptors.insert(
            interceptor.name.clone(),
            InterceptorEntry::Interceptor(InterceptorConfig {
                name: interceptor.name.clone(),
                class_name: interceptor.class_name.clone(),
                params: interceptor.params.clone(),
                location: location.child(format_args!("interceptor[{}]", interceptor.name)),
            }),
        );
    }

    for stack in &decl.interceptor_stacks {
        let stack_location = location.child(format_args!("interceptor-stack[{}]", stack.name));
        let chain = {
            let scope = PackageScope::new(graph, &package);
            resolve_refs(&scope, &stack.interceptor_refs, &stack_location, ctx)?
        };
        package.interceptors.insert(
            stack.name.clone(),
            InterceptorEntry::Stack(InterceptorStackConfig {
                name: stack.name.clone(),
                interceptors: chain,
                location: stack_location,
            }),
        );
    }

    let mut global_results = IndexMap::new();
    {
        let scope = PackageScope::new(graph, &package);
        for result in &decl.global_results {
            let result_location = location.child(format_args!("global-result[{}]", result.name));
            global_results.insert(
                result.name.clone(),
                build_result(&scope, result, &result_location)?,
            );
        }
    }
    package.global_results = global_results;

    package.exception_mappings = decl
        .global_exception_mappings
        .iter()
        .map(build_exception_mapping)
        .collect();

    let mut actions = IndexMap::new();
    {
        let scope = PackageScope::new(graph, &package);
        for action in &decl.actions {
            let action_location = location.child(format_args!("action[{}]", action.name));
            actions.insert(
                action.name.clone(),
                build_action(&scope, action, action_location, ctx)?,
            );
        }
    }
    package.actions = actions;

    tracing::debug!(
        package = %package.name,
        namespace = %package.namespace,
        actions = package.actions.len(),
        interceptors = package.interceptors.len(),
        "Package built"
    );
    Ok(package)
}

/// Resolve a list of refs into one chain. A single ref keeps its chain
/// shared.
pub(crate) fn resolve_refs(
    scope: &PackageScope<'_>,
    refs: &[InterceptorRefDecl],
    location: &Location,
    ctx: &mut ResolveContext<'_>,
) -> Result<InterceptorChain, ConfigError> {
    if let [single] = refs {
        return construct_interceptor_reference(scope, &single.name, &single.params, location, ctx);
    }
    let mut chain = Vec::new();
    for r in refs {
        let resolved = construct_interceptor_reference(scope, &r.name, &r.params, location, ctx)?;
        chain.extend(resolved.iter().cloned());
    }
    Ok(Arc::new(chain))
}

/// Resolve a result's class from its type (explicit or inherited default).
fn build_result(
    scope: &PackageScope<'_>,
    decl: &ResultDecl,
    location: &Location,
) -> Result<ResultConfig, ConfigError> {
    let type_name = match decl.result_type.as_deref() {
        Some(name) => name,
        None => scope
            .full_default_result_type()
            .ok_or_else(|| ConfigError::MissingResultType {
                result: decl.name.clone(),
                package: scope.package().name.clone(),
                location: location.clone(),
            })?,
    };
    let result_type = scope
        .result_type(type_name)
        .ok_or_else(|| ConfigError::UnknownResultType {
            result: decl.name.clone(),
            result_type: type_name.to_string(),
            location: location.clone(),
        })?;

    let mut result_params = decl.params.clone();
    if result_params.is_empty() {
        if let Some(body) = &decl.body {
            result_params.insert(result_type.default_param.clone(), body.clone());
        }
    }
    let mut params: Params = result_type.params.clone();
    params.extend(result_params);

    Ok(ResultConfig {
        name: decl.name.clone(),
        class_name: result_type.class_name.clone(),
        params,
    })
}

fn build_exception_mapping(decl: &ExceptionMappingDecl) -> ExceptionMappingConfig {
    ExceptionMappingConfig {
        name: decl.name.clone().unwrap_or_else(|| decl.result.clone()),
        exception_class: decl.exception.clone(),
        result: decl.result.clone(),
        params: decl.params.clone(),
    }
}

fn build_action(
    scope: &PackageScope<'_>,
    decl: &ActionDecl,
    location: Location,
    ctx: &mut ResolveContext<'_>,
) -> Result<PackageAction, ConfigError> {
    let mut results = IndexMap::new();
    for result in &decl.results {
        let result_location = location.child(format_args!("result[{}]", result.name));
        results.insert(result.name.clone(), build_result(scope, result, &result_location)?);
    }

    let interceptors = resolve_refs(scope, &decl.interceptor_refs, &location, ctx)?;

    Ok(PackageAction {
        name: decl.name.clone(),
        class_name: decl.class_name.clone(),
        method: decl.method.clone(),
        params: decl.params.clone(),
        results,
        interceptors,
        exception_mappings: decl.exception_mappings.iter().map(build_exception_mapping).collect(),
        location: Arc::new(location),
    })
}
