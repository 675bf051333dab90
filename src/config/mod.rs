//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! declaration files (TOML) / in-memory batches
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks per batch)
//!     → store::DeclarationStore (raw, unmerged)
//!     → runtime::build_snapshot (merge, resolve, compile)
//!     → manager.rs (atomic swap of Arc<RuntimeConfiguration>)
//!
//! On reload signal:
//!     watcher.rs detects change
//!     → manager.rs checks loaders for staleness
//!     → full rebuild under the reload lock
//!     → swap on success, keep previous snapshot on failure
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable once built; changes require full reload
//! - Declaration fields default wherever a sensible default exists
//! - Validation separates syntactic (serde) from semantic checks
//! - Structural errors abort the reload; anomalies become warnings

pub mod error;
pub mod loader;
pub mod manager;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use error::{ConfigError, ConfigWarning, Location};
pub use loader::{DeclarationLoader, InMemoryLoader, TomlFileLoader};
pub use manager::ConfigurationManager;
pub use schema::{DeclarationFile, EngineSettings, PackageDecl};
pub use watcher::{ConfigWatcher, ReloadEvent};
