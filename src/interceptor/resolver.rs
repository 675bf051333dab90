//! Interceptor reference resolution.
//!
//! # Responsibilities
//! - Turn an interceptor-ref (name + params) into an ordered chain
//! - Instantiate single interceptors through the object factory
//! - Reconfigure individual members of a stack via `<name>.<param>` keys
//!
//! # Design Decisions
//! - A stack referenced without params is returned as its shared chain
//! - Overrides replace same-named members in place, otherwise append
//! - A reference that names nothing is fatal; a class that fails to build
//!   only drops that interceptor

use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::error::{ConfigError, ConfigWarning, Diagnostics, Location};
use crate::interceptor::factory::{FactoryError, InstanceCache, Interceptor, ObjectFactory};
use crate::interceptor::registry::{
    InterceptorConfig, InterceptorEntry, InterceptorLocator, InterceptorStackConfig,
};
use crate::runtime::model::{InterceptorChain, InterceptorMapping, Params};

/// Everything a reload threads through resolution.
pub struct ResolveContext<'a> {
    pub factory: &'a dyn ObjectFactory,
    pub cache: &'a InstanceCache,
    pub diagnostics: &'a mut Diagnostics,
}

impl<'a> ResolveContext<'a> {
    pub fn new(
        factory: &'a dyn ObjectFactory,
        cache: &'a InstanceCache,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            factory,
            cache,
            diagnostics,
        }
    }

    /// Build an instance of `config` with `overrides` laid over its own params.
    fn build(
        &self,
        config: &InterceptorConfig,
        overrides: &Params,
    ) -> Result<Arc<dyn Interceptor>, FactoryError> {
        let mut params = config.params.clone();
        params.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.cache.get_or_build(self.factory, &config.class_name, &params)
    }
}

/// Resolve `ref_name` against `locator`.
pub fn construct_interceptor_reference(
    locator: &dyn InterceptorLocator,
    ref_name: &str,
    ref_params: &Params,
    location: &Location,
    ctx: &mut ResolveContext<'_>,
) -> Result<InterceptorChain, ConfigError> {
    let Some(entry) = locator.interceptor_config(ref_name) else {
        return Err(ConfigError::UnresolvedInterceptorReference {
            name: ref_name.to_string(),
            location: location.clone(),
        });
    };

    match entry {
        InterceptorEntry::Interceptor(config) => match ctx.build(config, ref_params) {
            Ok(instance) => Ok(Arc::new(vec![InterceptorMapping::new(ref_name, instance)])),
            Err(err) => {
                ctx.diagnostics.warn(ConfigWarning::OptionalInterceptorLoadFailure {
                    name: ref_name.to_string(),
                    class_name: config.class_name.clone(),
                    error: err.to_string(),
                    location: location.clone(),
                });
                Ok(Arc::new(Vec::new()))
            }
        },
        InterceptorEntry::Stack(stack) if ref_params.is_empty() => Ok(stack.interceptors.clone()),
        InterceptorEntry::Stack(stack) => Ok(Arc::new(construct_parameterized_references(
            locator, stack, ref_params, location, ctx,
        )?)),
    }
}

/// Copy `stack`'s chain and reconfigure the members named in `ref_params`.
fn construct_parameterized_references(
    locator: &dyn InterceptorLocator,
    stack: &InterceptorStackConfig,
    ref_params: &Params,
    location: &Location,
    ctx: &mut ResolveContext<'_>,
) -> Result<Vec<InterceptorMapping>, ConfigError> {
    let mut groups: IndexMap<String, Params> = IndexMap::new();
    for (key, value) in ref_params {
        match key.split_once('.') {
            Some((name, param)) if !name.is_empty() && !param.is_empty() => {
                groups
                    .entry(name.to_string())
                    .or_default()
                    .insert(param.to_string(), value.clone());
            }
            _ => ctx.diagnostics.warn(ConfigWarning::MalformedOverrideKey {
                key: key.clone(),
                location: location.clone(),
            }),
        }
    }

    let mut result = stack.interceptors.as_ref().clone();
    for (name, params) in groups {
        match locator.interceptor_config(&name) {
            Some(InterceptorEntry::Interceptor(config)) => match ctx.build(config, &params) {
                Ok(instance) => replace_or_append(&mut result, InterceptorMapping::new(name, instance)),
                Err(err) => ctx.diagnostics.warn(ConfigWarning::OptionalInterceptorLoadFailure {
                    name: name.clone(),
                    class_name: config.class_name.clone(),
                    error: err.to_string(),
                    location: location.clone(),
                }),
            },
            Some(InterceptorEntry::Stack(nested)) => {
                let nested = construct_parameterized_references(locator, nested, &params, location, ctx)?;
                for mapping in nested {
                    replace_or_append(&mut result, mapping);
                }
            }
            None => ctx.diagnostics.warn(ConfigWarning::UnknownOverrideTarget {
                name,
                location: location.clone(),
            }),
        }
    }
    Ok(result)
}

fn replace_or_append(chain: &mut Vec<InterceptorMapping>, mapping: InterceptorMapping) {
    let mut replaced = false;
    for slot in chain.iter_mut().filter(|m| **m == mapping) {
        *slot = mapping.clone();
        replaced = true;
    }
    if !replaced {
        chain.push(mapping);
    }
}
