//! Object instantiation boundary.
//!
//! # Responsibilities
//! - Turn a class name plus params into an interceptor instance
//! - Keep the only environment-dependent step behind one trait
//! - Cache instances (and failures) for the duration of one reload

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

use crate::runtime::model::Params;

/// A middleware unit instance.
pub trait Interceptor: Send + Sync + fmt::Debug {
    /// The class this instance was built from.
    fn class_name(&self) -> &str;

    /// The parameters it was configured with.
    fn params(&self) -> &Params;
}

/// Generic interceptor that only records its class and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredInterceptor {
    class_name: String,
    params: Params,
}

impl ConfiguredInterceptor {
    pub fn new(class_name: impl Into<String>, params: Params) -> Self {
        Self {
            class_name: class_name.into(),
            params,
        }
    }
}

impl Interceptor for ConfiguredInterceptor {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn params(&self) -> &Params {
        &self.params
    }
}

/// Errors raised while building an instance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FactoryError {
    #[error("class '{0}' is not registered")]
    UnknownClass(String),

    #[error("class '{class_name}' rejected its parameters: {reason}")]
    InvalidParams { class_name: String, reason: String },
}

/// Builds interceptor instances from declarations.
pub trait ObjectFactory: Send + Sync {
    fn build_interceptor(
        &self,
        class_name: &str,
        params: &Params,
    ) -> Result<Arc<dyn Interceptor>, FactoryError>;
}

type Constructor =
    Box<dyn Fn(&str, &Params) -> Result<Arc<dyn Interceptor>, FactoryError> + Send + Sync>;

/// Registry-backed factory.
///
/// Classes must be registered up front unless the registry is permissive,
/// in which case unknown classes become `ConfiguredInterceptor`s.
#[derive(Default)]
pub struct ClassRegistry {
    classes: HashMap<String, Constructor>,
    permissive: bool,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that builds any class it is asked for.
    pub fn permissive() -> Self {
        Self {
            classes: HashMap::new(),
            permissive: true,
        }
    }

    /// Register a constructor for `class_name`.
    pub fn register<F>(&mut self, class_name: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(&str, &Params) -> Result<Arc<dyn Interceptor>, FactoryError> + Send + Sync + 'static,
    {
        self.classes.insert(class_name.into(), Box::new(constructor));
        self
    }

    /// Register `class_name` as a plain `ConfiguredInterceptor`.
    pub fn register_configured(&mut self, class_name: impl Into<String>) -> &mut Self {
        self.register(class_name, |class, params| {
            Ok(Arc::new(ConfiguredInterceptor::new(class, params.clone())) as Arc<dyn Interceptor>)
        })
    }

    pub fn is_registered(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<_> = self.classes.keys().collect();
        classes.sort();
        f.debug_struct("ClassRegistry")
            .field("classes", &classes)
            .field("permissive", &self.permissive)
            .finish()
    }
}

impl ObjectFactory for ClassRegistry {
    fn build_interceptor(
        &self,
        class_name: &str,
        params: &Params,
    ) -> Result<Arc<dyn Interceptor>, FactoryError> {
        match self.classes.get(class_name) {
            Some(constructor) => constructor(class_name, params),
            None if self.permissive => Ok(Arc::new(ConfiguredInterceptor::new(
                class_name,
                params.clone(),
            ))),
            None => Err(FactoryError::UnknownClass(class_name.to_string())),
        }
    }
}

type CacheKey = (String, Vec<(String, String)>);

/// Per-reload instance cache.
///
/// Identical (class, params) requests share one instance; a failing class
/// is attempted once.
#[derive(Debug, Default)]
pub struct InstanceCache {
    entries: DashMap<CacheKey, Result<Arc<dyn Interceptor>, FactoryError>>,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &self,
        factory: &dyn ObjectFactory,
        class_name: &str,
        params: &Params,
    ) -> Result<Arc<dyn Interceptor>, FactoryError> {
        let key = (
            class_name.to_string(),
            params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Vec<_>>(),
        );
        self.entries
            .entry(key)
            .or_insert_with(|| factory.build_interceptor(class_name, params))
            .value()
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
