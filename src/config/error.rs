//! Configuration errors and non-fatal diagnostics.
//!
//! # Design Decisions
//! - `ConfigError` aborts a reload; the previous snapshot stays live
//! - `ConfigWarning` is logged and collected, processing continues
//! - Both carry a `Location` so messages point at the declaration

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::config::validation::ValidationError;

/// Where a declaration came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    /// Source identifier (usually a file path).
    pub source: Arc<str>,
    /// Element path inside the source, e.g. `package[secure]/action[save]`.
    pub element: String,
}

impl Location {
    pub fn new(source: impl Into<Arc<str>>, element: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            element: element.into(),
        }
    }

    /// A location nested below this one.
    pub fn child(&self, element: impl fmt::Display) -> Self {
        Self {
            source: self.source.clone(),
            element: format!("{}/{}", self.element, element),
        }
    }

    pub fn unknown() -> Self {
        Self::new("<unknown>", "")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.element.is_empty() {
            write!(f, "{}", self.source)
        } else {
            write!(f, "{} ({})", self.element, self.source)
        }
    }
}

/// Fatal configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Package '{name}' at {location} is already declared at {existing}")]
    DuplicatePackage {
        name: String,
        location: Location,
        existing: Location,
    },

    #[error("Package inheritance cycle: {}", .cycle.join(" -> "))]
    CyclicInheritance { cycle: Vec<String>, location: Location },

    #[error("Unable to find interceptor or stack '{name}' referenced at {location}")]
    UnresolvedInterceptorReference { name: String, location: Location },

    #[error("No result type specified for result '{result}' in package '{package}' at {location}")]
    MissingResultType {
        result: String,
        package: String,
        location: Location,
    },

    #[error("Result '{result}' at {location} uses undefined result type '{result_type}'")]
    UnknownResultType {
        result: String,
        result_type: String,
        location: Location,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Anomalies that are reported but do not abort a reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigWarning {
    /// Parents that never appeared in the store; the package was built
    /// without them.
    UnresolvedParentChain {
        package: String,
        missing: Vec<String>,
        location: Location,
    },
    /// An interceptor class could not be built; the interceptor is omitted.
    OptionalInterceptorLoadFailure {
        name: String,
        class_name: String,
        error: String,
        location: Location,
    },
    /// A stack override key without an `<interceptor>.` prefix.
    MalformedOverrideKey { key: String, location: Location },
    /// A stack override addressed a name the registry does not know.
    UnknownOverrideTarget { name: String, location: Location },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::UnresolvedParentChain {
                package,
                missing,
                location,
            } => write!(
                f,
                "package '{}' at {} extends unknown package(s): {}",
                package,
                location,
                missing.join(", ")
            ),
            ConfigWarning::OptionalInterceptorLoadFailure {
                name,
                class_name,
                error,
                location,
            } => write!(
                f,
                "unable to load class '{}' for interceptor '{}' at {}: {}",
                class_name, name, location, error
            ),
            ConfigWarning::MalformedOverrideKey { key, location } => {
                write!(f, "override key '{}' at {} has no interceptor prefix", key, location)
            }
            ConfigWarning::UnknownOverrideTarget { name, location } => {
                write!(f, "override at {} targets unknown interceptor '{}'", location, name)
            }
        }
    }
}

/// Collects warnings during one reload and mirrors them to the log.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<ConfigWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, warning: ConfigWarning) {
        tracing::warn!(warning = %warning, "Configuration warning");
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<ConfigWarning> {
        self.warnings
    }
}
