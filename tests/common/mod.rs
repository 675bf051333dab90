//! Shared fixtures for integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use action_router::config::loader::DeclarationLoader;
use action_router::config::{DeclarationFile, InMemoryLoader};
use action_router::{ClassRegistry, ConfigurationManager, EngineSettings};

/// Abstract base package: a default result type, three interceptors and a
/// stack over them, plus one global result.
pub const BASE: &str = r#"
[[packages]]
name = "default"
abstract = true
default_interceptor_ref = "basic"

[[packages.result_types]]
name = "dispatch"
class = "DispatchResult"
default = true

[[packages.result_types]]
name = "redirect"
class = "RedirectResult"

[[packages.interceptors]]
name = "a"
class = "AInterceptor"

[[packages.interceptors]]
name = "b"
class = "BInterceptor"
params = { max = "1" }

[[packages.interceptors]]
name = "c"
class = "CInterceptor"

[[packages.interceptor_stacks]]
name = "basic"
interceptor_refs = [{ name = "a" }, { name = "b" }, { name = "c" }]

[[packages.global_results]]
name = "error"
body = "/error.html"
"#;

pub fn parse(src: &str) -> DeclarationFile {
    toml::from_str(src).expect("fixture should parse")
}

/// `BASE` followed by `extra`.
pub fn with_base(extra: &str) -> String {
    format!("{BASE}\n{extra}")
}

/// A manager over in-memory sources, loaded in the given order.
#[allow(dead_code)]
pub fn manager(sources: &[(&str, &str)]) -> ConfigurationManager {
    try_manager(sources).expect("fixture should load")
}

pub fn try_manager(
    sources: &[(&str, &str)],
) -> Result<ConfigurationManager, action_router::ConfigError> {
    let loaders: Vec<Box<dyn DeclarationLoader>> = sources
        .iter()
        .map(|(name, src)| Box::new(InMemoryLoader::new(*name, parse(src))) as Box<dyn DeclarationLoader>)
        .collect();
    ConfigurationManager::load(
        loaders,
        Arc::new(ClassRegistry::permissive()),
        EngineSettings::default(),
    )
}

/// Write a declaration file into `dir`.
#[allow(dead_code)]
pub fn write_declarations(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}
