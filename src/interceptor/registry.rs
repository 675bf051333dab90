//! Interceptor registry entries.

use crate::config::error::Location;
use crate::runtime::model::{InterceptorChain, Params};

/// A single interceptor declaration, not yet instantiated.
#[derive(Debug, Clone)]
pub struct InterceptorConfig {
    pub name: String,
    pub class_name: String,
    pub params: Params,
    pub location: Location,
}

/// A named stack with its already-resolved chain.
#[derive(Debug, Clone)]
pub struct InterceptorStackConfig {
    pub name: String,
    pub interceptors: InterceptorChain,
    pub location: Location,
}

/// One entry of a package's interceptor registry.
#[derive(Debug, Clone)]
pub enum InterceptorEntry {
    Interceptor(InterceptorConfig),
    Stack(InterceptorStackConfig),
}

impl InterceptorEntry {
    pub fn name(&self) -> &str {
        match self {
            InterceptorEntry::Interceptor(config) => &config.name,
            InterceptorEntry::Stack(stack) => &stack.name,
        }
    }

    pub fn is_stack(&self) -> bool {
        matches!(self, InterceptorEntry::Stack(_))
    }
}

/// Looks up interceptor registry entries by name.
pub trait InterceptorLocator {
    fn interceptor_config(&self, name: &str) -> Option<&InterceptorEntry>;
}
