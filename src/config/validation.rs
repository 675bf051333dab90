//! Declaration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject empty names and classes
//! - Detect names declared twice inside one package
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DeclarationFile → Result<(), Vec<ValidationError>>
//! - Runs before a batch is accepted into the store
//! - Cross-package checks (parents, references) belong to the graph build

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::{DeclarationFile, InterceptorRefDecl, PackageDecl, ResultDecl};

/// A single semantic problem in a declaration batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Element path, e.g. `package[web]/action[save]`.
    pub path: String,
    pub message: String,
}

impl ValidationError {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validate one declaration batch.
pub fn validate_declarations(file: &DeclarationFile) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    for (index, package) in file.packages.iter().enumerate() {
        validate_package(index, package, &mut errors);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_package(index: usize, package: &PackageDecl, errors: &mut Vec<ValidationError>) {
    let path = if package.name.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("packages[{}]", index),
            "package name is empty",
        ));
        format!("packages[{}]", index)
    } else {
        format!("package[{}]", package.name)
    };

    let mut result_types = HashSet::new();
    for rt in &package.result_types {
        let rt_path = format!("{}/result-type[{}]", path, rt.name);
        if rt.name.trim().is_empty() {
            errors.push(ValidationError::new(&rt_path, "result type name is empty"));
        } else if !result_types.insert(rt.name.as_str()) {
            errors.push(ValidationError::new(&rt_path, "result type declared twice"));
        }
        if rt.class_name.trim().is_empty() {
            errors.push(ValidationError::new(&rt_path, "result type class is empty"));
        }
    }

    // Interceptors and stacks share one registry.
    let mut registry = HashSet::new();
    for interceptor in &package.interceptors {
        let i_path = format!("{}/interceptor[{}]", path, interceptor.name);
        if interceptor.name.trim().is_empty() {
            errors.push(ValidationError::new(&i_path, "interceptor name is empty"));
        } else if !registry.insert(interceptor.name.as_str()) {
            errors.push(ValidationError::new(&i_path, "interceptor name declared twice"));
        }
        if interceptor.class_name.trim().is_empty() {
            errors.push(ValidationError::new(&i_path, "interceptor class is empty"));
        }
    }
    for stack in &package.interceptor_stacks {
        let s_path = format!("{}/interceptor-stack[{}]", path, stack.name);
        if stack.name.trim().is_empty() {
            errors.push(ValidationError::new(&s_path, "interceptor stack name is empty"));
        } else if !registry.insert(stack.name.as_str()) {
            errors.push(ValidationError::new(&s_path, "interceptor name declared twice"));
        }
        validate_refs(&s_path, &stack.interceptor_refs, errors);
    }

    validate_results(&path, &package.global_results, errors);

    let mut actions = HashSet::new();
    for action in &package.actions {
        let a_path = format!("{}/action[{}]", path, action.name);
        if action.name.trim().is_empty() {
            errors.push(ValidationError::new(&a_path, "action name is empty"));
        } else if !actions.insert(action.name.as_str()) {
            errors.push(ValidationError::new(&a_path, "action declared twice"));
        }
        validate_results(&a_path, &action.results, errors);
        validate_refs(&a_path, &action.interceptor_refs, errors);
    }
}

fn validate_results(path: &str, results: &[ResultDecl], errors: &mut Vec<ValidationError>) {
    for result in results {
        if result.name.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("{}/result", path),
                "result name is empty",
            ));
        }
    }
}

fn validate_refs(path: &str, refs: &[InterceptorRefDecl], errors: &mut Vec<ValidationError>) {
    for r in refs {
        if r.name.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("{}/interceptor-ref", path),
                "interceptor-ref name is empty",
            ));
        }
    }
}
