//! Declaration store.
//!
//! # Data Flow
//! ```text
//! DeclarationLoader (one per source, in order)
//!     → add_batch(source, DeclarationFile)
//!     → duplicate check per package name
//!     → constants overlay (later batch wins)
//!     → packages() in first-declared order
//!     → consumed by packages::PackageGraph::build
//! ```
//!
//! # Design Decisions
//! - Holds raw declarations only; nothing is merged here
//! - Cleared wholesale at the start of every reload
//! - A package name may be declared once per reload, across all sources

use indexmap::IndexMap;

use crate::config::error::{ConfigError, Location};
use crate::config::schema::{DeclarationFile, PackageDecl};

/// A package declaration together with where it came from.
#[derive(Debug, Clone)]
pub struct StoredPackage {
    pub decl: PackageDecl,
    pub location: Location,
}

impl StoredPackage {
    pub fn name(&self) -> &str {
        &self.decl.name
    }
}

/// Raw declarations submitted by the loaders for one reload cycle.
#[derive(Debug, Default)]
pub struct DeclarationStore {
    packages: IndexMap<String, StoredPackage>,
    constants: IndexMap<String, String>,
}

impl DeclarationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything submitted so far.
    pub fn clear(&mut self) {
        self.packages.clear();
        self.constants.clear();
    }

    /// Accept one batch from `source`.
    pub fn add_batch(&mut self, source: &str, file: DeclarationFile) -> Result<(), ConfigError> {
        for (name, value) in file.constants {
            if let Some(previous) = self.constants.insert(name.clone(), value) {
                tracing::debug!(constant = %name, previous = %previous, source = %source, "Constant overridden");
            }
        }
        for (i, decl) in file.packages.into_iter().enumerate() {
            let location = Location::new(source, format!("packages[{i}]"))
                .child(format!("package[{}]", decl.name));
            self.add_package(decl, location)?;
        }
        Ok(())
    }

    /// Accept one package declaration. The name must not be taken yet.
    pub fn add_package(&mut self, decl: PackageDecl, location: Location) -> Result<(), ConfigError> {
        if let Some(existing) = self.packages.get(&decl.name) {
            return Err(ConfigError::DuplicatePackage {
                name: decl.name,
                location,
                existing: existing.location.clone(),
            });
        }
        self.packages
            .insert(decl.name.clone(), StoredPackage { decl, location });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&StoredPackage> {
        self.packages.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Packages in first-declared order.
    pub fn packages(&self) -> impl Iterator<Item = &StoredPackage> {
        self.packages.values()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn constants(&self) -> &IndexMap<String, String> {
        &self.constants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(name: &str) -> PackageDecl {
        PackageDecl {
            name: name.into(),
            ..Default::default()
        }
    }

    fn batch(names: &[&str]) -> DeclarationFile {
        DeclarationFile {
            packages: names.iter().map(|n| package(n)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_from_other_source() {
        let mut store = DeclarationStore::new();
        store.add_batch("a.toml", batch(&["web"])).unwrap();
        let err = store.add_batch("b.toml", batch(&["web"])).unwrap_err();
        match err {
            ConfigError::DuplicatePackage { name, existing, .. } => {
                assert_eq!(name, "web");
                assert_eq!(&*existing.source, "a.toml");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_within_one_source() {
        let mut store = DeclarationStore::new();
        let err = store
            .add_batch("a.toml", batch(&["web", "api", "web"]))
            .unwrap_err();
        match err {
            ConfigError::DuplicatePackage {
                name,
                location,
                existing,
            } => {
                assert_eq!(name, "web");
                assert_eq!(location.element, "packages[2]/package[web]");
                assert_eq!(existing.element, "packages[0]/package[web]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_constants_override() {
        let mut store = DeclarationStore::new();
        let mut first = DeclarationFile::default();
        first.constants.insert("mode".into(), "dev".into());
        first.constants.insert("theme".into(), "plain".into());
        let mut second = DeclarationFile::default();
        second.constants.insert("mode".into(), "prod".into());
        store.add_batch("a.toml", first).unwrap();
        store.add_batch("b.toml", second).unwrap();
        assert_eq!(store.constants()["mode"], "prod");
        assert_eq!(store.constants()["theme"], "plain");

        store.clear();
        assert!(store.is_empty());
        assert!(store.constants().is_empty());
    }
}
