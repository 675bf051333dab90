//! Declaration loading from disk or memory.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use crate::config::error::ConfigError;
use crate::config::schema::{DeclarationFile, EngineSettings};
use crate::config::validation::validate_declarations;
use crate::store::DeclarationStore;

/// A source of declarations.
pub trait DeclarationLoader: Send + Sync + fmt::Debug {
    /// Identifier used in locations and logs.
    fn source(&self) -> &str;

    /// Submit this source's declarations to `store`.
    fn load(&self, store: &mut DeclarationStore) -> Result<(), ConfigError>;

    /// True if the source changed since it was last loaded.
    fn needs_reload(&self) -> bool;
}

/// Read, parse and validate a declaration file.
pub fn load_declarations(path: &Path) -> Result<DeclarationFile, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file: DeclarationFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    validate_declarations(&file).map_err(ConfigError::Validation)?;

    Ok(file)
}

/// Read engine settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<EngineSettings, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Loads one TOML declaration file.
#[derive(Debug)]
pub struct TomlFileLoader {
    path: PathBuf,
    source: String,
    loaded_mtime: Mutex<Option<SystemTime>>,
}

impl TomlFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            source: path.display().to_string(),
            path,
            loaded_mtime: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }
}

impl DeclarationLoader for TomlFileLoader {
    fn source(&self) -> &str {
        &self.source
    }

    fn load(&self, store: &mut DeclarationStore) -> Result<(), ConfigError> {
        let mtime = self.modified();
        let file = load_declarations(&self.path)?;
        let packages = file.packages.len();
        store.add_batch(&self.source, file)?;
        *self
            .loaded_mtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = mtime;
        tracing::debug!(source = %self.source, packages, "Declarations loaded");
        Ok(())
    }

    fn needs_reload(&self) -> bool {
        let loaded = *self
            .loaded_mtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match (loaded, self.modified()) {
            (Some(loaded), Some(current)) => current != loaded,
            _ => true,
        }
    }
}

/// Serves a declaration batch held in memory.
#[derive(Debug)]
pub struct InMemoryLoader {
    source: String,
    file: Mutex<DeclarationFile>,
    dirty: AtomicBool,
}

impl InMemoryLoader {
    pub fn new(source: impl Into<String>, file: DeclarationFile) -> Self {
        Self {
            source: source.into(),
            file: Mutex::new(file),
            dirty: AtomicBool::new(true),
        }
    }

    /// Replace the held declarations and mark the loader stale.
    pub fn replace(&self, file: DeclarationFile) {
        *self.file.lock().unwrap_or_else(PoisonError::into_inner) = file;
        self.dirty.store(true, Ordering::Release);
    }
}

impl DeclarationLoader for InMemoryLoader {
    fn source(&self) -> &str {
        &self.source
    }

    fn load(&self, store: &mut DeclarationStore) -> Result<(), ConfigError> {
        let file = self
            .file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        validate_declarations(&file).map_err(ConfigError::Validation)?;
        store.add_batch(&self.source, file)?;
        self.dirty.store(false, Ordering::Release);
        Ok(())
    }

    fn needs_reload(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }
}
