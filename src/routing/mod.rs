//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Snapshot build (once per reload, per namespace):
//!     action names in declaration order
//!     → matcher.rs (compile names containing '*')
//!     → router.rs (ordered pattern list, plus loose shorthands)
//!
//! Lookup (after the exact-name map missed):
//!     request name
//!     → router.rs (first pattern that matches)
//!     → substitution.rs ({n} tokens → captured text)
//!     → fresh ActionConfig for the request
//! ```
//!
//! # Design Decisions
//! - Patterns compiled at reload, immutable at runtime
//! - Only the `*` / `**` wildcard grammar; no regex
//! - Deterministic: first match wins, in declaration order

pub mod matcher;
pub mod router;
pub mod substitution;

pub use matcher::{Captures, WildcardPattern};
pub use router::ActionRouter;
