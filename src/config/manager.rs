//! Reload coordination and the live snapshot.
//!
//! # Design Decisions
//! - One writer at a time: reloads serialize on the store mutex
//! - Readers never take that mutex; they load the snapshot through
//!   `ArcSwap` and always see a complete one
//! - A failed reload leaves the previous snapshot in place

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use arc_swap::ArcSwap;
use indexmap::IndexMap;

use crate::config::error::ConfigError;
use crate::config::loader::DeclarationLoader;
use crate::config::schema::EngineSettings;
use crate::interceptor::ObjectFactory;
use crate::observability::metrics;
use crate::runtime::{build_snapshot, ActionConfig, RuntimeConfiguration};
use crate::store::DeclarationStore;

/// Owns the loaders and serves the current runtime snapshot.
pub struct ConfigurationManager {
    loaders: Vec<Box<dyn DeclarationLoader>>,
    factory: Arc<dyn ObjectFactory>,
    settings: EngineSettings,
    store: Mutex<DeclarationStore>,
    current: ArcSwap<RuntimeConfiguration>,
}

impl ConfigurationManager {
    /// A manager serving an empty snapshot until the first reload.
    pub fn new(
        loaders: Vec<Box<dyn DeclarationLoader>>,
        factory: Arc<dyn ObjectFactory>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            loaders,
            factory,
            settings,
            store: Mutex::new(DeclarationStore::new()),
            current: ArcSwap::from_pointee(RuntimeConfiguration::empty()),
        }
    }

    /// Create a manager and perform the initial load.
    pub fn load(
        loaders: Vec<Box<dyn DeclarationLoader>>,
        factory: Arc<dyn ObjectFactory>,
        settings: EngineSettings,
    ) -> Result<Self, ConfigError> {
        let manager = Self::new(loaders, factory, settings);
        manager.reload()?;
        Ok(manager)
    }

    /// Rebuild everything from the loaders and publish the result.
    pub fn reload(&self) -> Result<Arc<RuntimeConfiguration>, ConfigError> {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        let started = Instant::now();

        match self.rebuild(&mut store) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.current.store(Arc::clone(&snapshot));
                metrics::record_reload(true, started);
                metrics::record_snapshot_size(snapshot.action_count());
                tracing::info!(
                    packages = store.len(),
                    namespaces = snapshot.namespaces().len(),
                    actions = snapshot.action_count(),
                    warnings = snapshot.diagnostics().len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Configuration reloaded"
                );
                Ok(snapshot)
            }
            Err(err) => {
                metrics::record_reload(false, started);
                tracing::error!(error = %err, "Reload failed, keeping current configuration");
                Err(err)
            }
        }
    }

    fn rebuild(&self, store: &mut DeclarationStore) -> Result<RuntimeConfiguration, ConfigError> {
        store.clear();
        for loader in &self.loaders {
            tracing::debug!(source = %loader.source(), "Loading declarations");
            loader.load(store)?;
        }
        build_snapshot(store, self.factory.as_ref(), &self.settings)
    }

    /// True if any loader reports a change.
    pub fn needs_reload(&self) -> bool {
        self.loaders.iter().any(|loader| loader.needs_reload())
    }

    /// Reload only if a loader changed. Returns whether a reload ran.
    pub fn reload_if_needed(&self) -> Result<bool, ConfigError> {
        if !self.needs_reload() {
            return Ok(false);
        }
        self.reload()?;
        Ok(true)
    }

    /// The live snapshot.
    pub fn snapshot(&self) -> Arc<RuntimeConfiguration> {
        self.current.load_full()
    }

    pub fn resolve(&self, namespace: &str, name: &str) -> Option<Arc<ActionConfig>> {
        self.current.load().resolve(namespace, name)
    }

    pub fn all_action_configs(&self) -> HashMap<String, IndexMap<String, Arc<ActionConfig>>> {
        self.current.load().all_action_configs()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

impl std::fmt::Debug for ConfigurationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationManager")
            .field("loaders", &self.loaders)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
