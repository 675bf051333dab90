//! Resolved configuration types.
//!
//! These are the values handed to callers. They are built once per reload
//! and never mutated afterwards; wildcard matches produce fresh copies.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::config::error::Location;
use crate::interceptor::Interceptor;

/// Insertion-ordered string parameters.
pub type Params = IndexMap<String, String>;

/// A resolved result (view) mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultConfig {
    pub name: String,
    pub class_name: String,
    pub params: Params,
}

/// A registered result type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultTypeConfig {
    pub name: String,
    pub class_name: String,
    /// Parameter that receives a result's inline body when the result
    /// declares no explicit params.
    pub default_param: String,
    pub params: Params,
}

/// Maps an exception class onto a result name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionMappingConfig {
    pub name: String,
    pub exception_class: String,
    pub result: String,
    pub params: Params,
}

/// A named interceptor instance inside a chain.
///
/// Equality compares names only, so a reconfigured instance can replace its
/// predecessor inside a stack.
#[derive(Clone)]
pub struct InterceptorMapping {
    name: String,
    interceptor: Arc<dyn Interceptor>,
}

impl InterceptorMapping {
    pub fn new(name: impl Into<String>, interceptor: Arc<dyn Interceptor>) -> Self {
        Self {
            name: name.into(),
            interceptor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interceptor(&self) -> &Arc<dyn Interceptor> {
        &self.interceptor
    }
}

impl PartialEq for InterceptorMapping {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for InterceptorMapping {}

impl fmt::Debug for InterceptorMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorMapping")
            .field("name", &self.name)
            .field("class_name", &self.interceptor.class_name())
            .finish()
    }
}

impl Serialize for InterceptorMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("InterceptorMapping", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("class_name", self.interceptor.class_name())?;
        state.serialize_field("params", self.interceptor.params())?;
        state.end()
    }
}

/// An ordered interceptor chain. Shared between actions and stacks.
pub type InterceptorChain = Arc<Vec<InterceptorMapping>>;

/// Fully merged execution metadata for one action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionConfig {
    pub name: String,
    pub package_name: String,
    pub class_name: String,
    /// `None` means the engine's default method.
    pub method: Option<String>,
    pub params: Params,
    pub results: IndexMap<String, ResultConfig>,
    pub interceptors: InterceptorChain,
    pub exception_mappings: Vec<ExceptionMappingConfig>,
    #[serde(skip)]
    pub location: Arc<Location>,
    #[serde(skip)]
    pub(crate) default_method: Arc<str>,
}

impl ActionConfig {
    /// The method to invoke, falling back to the configured default.
    pub fn method_or_default(&self) -> &str {
        self.method.as_deref().unwrap_or(&self.default_method)
    }

    pub fn result(&self, name: &str) -> Option<&ResultConfig> {
        self.results.get(name)
    }

    pub fn interceptor_names(&self) -> Vec<&str> {
        self.interceptors.iter().map(InterceptorMapping::name).collect()
    }
}
