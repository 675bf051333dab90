//! Package graph and merger.
//!
//! # Data Flow
//! ```text
//! DeclarationStore (raw PackageDecl, store order)
//!     → graph.rs (cycle check, fixed-point build order)
//!     → builder.rs (per package: result types, interceptors, stacks,
//!                   global results, exception mappings, actions)
//!     → PackageGraph (arena of PackageConfig, parents by PackageId)
//!     → merger.rs (PackageScope: inherited "all" views, full defaults)
//! ```
//!
//! # Design Decisions
//! - Parents are arena handles; merges never chase live references
//! - Cycles are rejected up front, so every recursive merge terminates
//! - Parent list front = most recently declared parent
//! - Missing parents are warnings; the package builds without them

pub mod builder;
pub mod config;
pub mod graph;
pub mod merger;

pub use config::{PackageAction, PackageConfig, PackageId};
pub use graph::PackageGraph;
pub use merger::PackageScope;
