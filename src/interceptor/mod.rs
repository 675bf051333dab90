//! Interceptor subsystem.
//!
//! # Data Flow
//! ```text
//! interceptor-ref (name, params) from a stack or action
//!     → registry.rs (InterceptorLocator: merged package registry)
//!     → resolver.rs (single / stack / parameterized stack)
//!     → factory.rs (ObjectFactory via InstanceCache)
//!     → ordered Vec<InterceptorMapping>
//! ```
//!
//! # Design Decisions
//! - Instantiation is the only injectable, environment-dependent step
//! - The instance cache lives for one reload and is passed explicitly
//! - Chains are `Arc`-shared; overriding a stack copies it

pub mod factory;
pub mod registry;
pub mod resolver;

pub use factory::{ClassRegistry, ConfiguredInterceptor, FactoryError, InstanceCache, Interceptor, ObjectFactory};
pub use registry::{InterceptorConfig, InterceptorEntry, InterceptorLocator, InterceptorStackConfig};
pub use resolver::{construct_interceptor_reference, ResolveContext};
