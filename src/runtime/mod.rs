//! Runtime configuration subsystem.
//!
//! # Data Flow
//! ```text
//! DeclarationStore
//!     → builder.rs (PackageGraph, full ActionConfigs per namespace,
//!                   ActionRouter per namespace, default actions)
//!     → snapshot.rs (RuntimeConfiguration, immutable)
//!     → swapped in by config::manager
//!
//! resolve(namespace, name):
//!     exact → wildcard → default action → same against "" → not found
//! ```
//!
//! # Design Decisions
//! - Snapshot is never mutated after construction
//! - Only non-abstract packages route, and only their own actions
//! - "Not found" is `None`, not an error

pub mod builder;
pub mod model;
pub mod snapshot;

pub use builder::build_snapshot;
pub use model::{ActionConfig, ExceptionMappingConfig, InterceptorMapping, Params, ResultConfig, ResultTypeConfig};
pub use snapshot::{LookupOutcome, NamespaceTable, RuntimeConfiguration};
