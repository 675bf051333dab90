//! Declaration schema definitions.
//!
//! This module defines the raw, unmerged declarations a loader submits to
//! the store, plus the engine settings. All types derive Serde traits for
//! deserialization from TOML declaration files.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::runtime::model::Params;

/// One declaration batch, as read from a single source.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DeclarationFile {
    /// Named constants; later batches override earlier ones.
    pub constants: IndexMap<String, String>,

    /// Package declarations in source order.
    pub packages: Vec<PackageDecl>,
}

/// A package declaration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PackageDecl {
    /// Unique package name.
    pub name: String,

    /// Routing namespace (empty = global).
    pub namespace: String,

    /// Abstract packages contribute inheritance only, never routes.
    #[serde(rename = "abstract")]
    pub is_abstract: bool,

    /// Comma/space separated parent package names.
    pub extends: Option<String>,

    pub default_interceptor_ref: Option<String>,
    pub default_action_ref: Option<String>,
    pub default_class_ref: Option<String>,

    pub result_types: Vec<ResultTypeDecl>,
    pub interceptors: Vec<InterceptorDecl>,
    pub interceptor_stacks: Vec<InterceptorStackDecl>,
    pub global_results: Vec<ResultDecl>,
    pub global_exception_mappings: Vec<ExceptionMappingDecl>,
    pub actions: Vec<ActionDecl>,
}

impl PackageDecl {
    /// Parent names, last declared first.
    pub fn parent_names(&self) -> Vec<String> {
        let Some(extends) = &self.extends else {
            return Vec::new();
        };
        let mut names: Vec<String> = extends
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        names.reverse();
        names
    }

    /// The result type flagged `default = true`, if any. The last one wins.
    pub fn default_result_type(&self) -> Option<&str> {
        self.result_types
            .iter()
            .rev()
            .find(|rt| rt.is_default)
            .map(|rt| rt.name.as_str())
    }
}

/// A result type registration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResultTypeDecl {
    pub name: String,

    #[serde(rename = "class")]
    pub class_name: String,

    /// Parameter receiving an inline result body.
    #[serde(default = "default_result_param")]
    pub default_param: String,

    /// Marks this as the package's default result type.
    #[serde(default, rename = "default")]
    pub is_default: bool,

    #[serde(default)]
    pub params: Params,
}

fn default_result_param() -> String {
    "location".to_string()
}

/// A single interceptor declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterceptorDecl {
    pub name: String,

    #[serde(rename = "class")]
    pub class_name: String,

    #[serde(default)]
    pub params: Params,
}

/// A named, ordered group of interceptor references.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterceptorStackDecl {
    pub name: String,

    #[serde(default)]
    pub interceptor_refs: Vec<InterceptorRefDecl>,
}

/// A reference to an interceptor or a stack, with optional overrides.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterceptorRefDecl {
    pub name: String,

    /// For stacks, keys take the form `<interceptor>.<param>`.
    #[serde(default)]
    pub params: Params,
}

/// A result declaration (global or action-level).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResultDecl {
    #[serde(default = "default_result_name")]
    pub name: String,

    /// Result type name; `None` uses the package's default result type.
    #[serde(default, rename = "type")]
    pub result_type: Option<String>,

    /// Inline body, stored under the result type's default param when no
    /// explicit params are given.
    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub params: Params,
}

fn default_result_name() -> String {
    "success".to_string()
}

/// An exception-to-result mapping.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExceptionMappingDecl {
    /// Defaults to the result name.
    #[serde(default)]
    pub name: Option<String>,

    pub exception: String,

    pub result: String,

    #[serde(default)]
    pub params: Params,
}

/// An action declaration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ActionDecl {
    /// Action name; may contain `*` wildcards.
    pub name: String,

    /// Handler class; `None` falls back to the package default class.
    #[serde(rename = "class")]
    pub class_name: Option<String>,

    /// Handler method; `None` invokes the default method.
    pub method: Option<String>,

    pub params: Params,
    pub results: Vec<ResultDecl>,
    pub interceptor_refs: Vec<InterceptorRefDecl>,
    pub exception_mappings: Vec<ExceptionMappingDecl>,
}

/// Engine-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Handler class used when neither the action nor any package names one.
    pub default_action_class: String,

    /// Method invoked when an action declares none.
    pub default_method: String,

    /// Also register the legacy shorthand for trailing-wildcard patterns.
    pub loose_match: bool,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_action_class: "ActionSupport".to_string(),
            default_method: "execute".to_string(),
            loose_match: true,
            log_level: "info".to_string(),
        }
    }
}
