//! Built package records.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::error::Location;
use crate::interceptor::InterceptorEntry;
use crate::runtime::model::{ExceptionMappingConfig, InterceptorChain, Params, ResultConfig, ResultTypeConfig};

/// Handle into the package arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(pub(crate) usize);

/// An action as declared in its package, with its own results and
/// interceptors resolved but nothing inherited applied yet.
#[derive(Debug, Clone)]
pub struct PackageAction {
    pub name: String,
    pub class_name: Option<String>,
    pub method: Option<String>,
    pub params: Params,
    pub results: IndexMap<String, ResultConfig>,
    /// Empty when the action declared no interceptor refs.
    pub interceptors: InterceptorChain,
    pub exception_mappings: Vec<ExceptionMappingConfig>,
    pub location: Arc<Location>,
}

/// One package after its local declarations have been resolved.
///
/// Only local entries live here; inherited views are computed by
/// `PackageScope` walking `parents` through the arena.
#[derive(Debug, Clone)]
pub struct PackageConfig {
    pub name: String,
    pub namespace: String,
    pub is_abstract: bool,
    /// Last declared parent first.
    pub parents: Vec<PackageId>,
    /// Set while a named parent could not be found.
    pub needs_refresh: bool,

    pub actions: IndexMap<String, PackageAction>,
    pub global_results: IndexMap<String, ResultConfig>,
    pub exception_mappings: Vec<ExceptionMappingConfig>,
    pub interceptors: IndexMap<String, InterceptorEntry>,
    pub result_types: IndexMap<String, ResultTypeConfig>,

    pub default_interceptor_ref: Option<String>,
    pub default_action_ref: Option<String>,
    pub default_result_type: Option<String>,
    pub default_class_ref: Option<String>,

    pub location: Location,
}

impl PackageConfig {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
            is_abstract: false,
            parents: Vec::new(),
            needs_refresh: false,
            actions: IndexMap::new(),
            global_results: IndexMap::new(),
            exception_mappings: Vec::new(),
            interceptors: IndexMap::new(),
            result_types: IndexMap::new(),
            default_interceptor_ref: None,
            default_action_ref: None,
            default_result_type: None,
            default_class_ref: None,
            location,
        }
    }
}
