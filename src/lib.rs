//! Action routing configuration engine.
//!
//! Resolves inheritable package/action declarations into an immutable
//! `(namespace, name) → ActionConfig` table.

pub mod config;
pub mod interceptor;
pub mod observability;
pub mod packages;
pub mod routing;
pub mod runtime;
pub mod store;

pub use config::{ConfigError, ConfigWarning, ConfigurationManager, EngineSettings};
pub use interceptor::{ClassRegistry, ObjectFactory};
pub use runtime::{ActionConfig, RuntimeConfiguration};
