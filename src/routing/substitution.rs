//! `{n}` token substitution into matched actions.

use std::sync::Arc;

use crate::routing::matcher::Captures;
use crate::runtime::model::{ActionConfig, ExceptionMappingConfig, Params, ResultConfig};

/// Replace every `{<digit>}` token in `value` with its capture.
///
/// Tokens whose digit was not captured render as the empty string; any
/// other text is copied unchanged.
pub fn substitute(value: &str, captures: &Captures) -> String {
    if !value.contains('{') {
        return value.to_string();
    }
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '{' && i + 2 < chars.len() && chars[i + 2] == '}' && chars[i + 1].is_ascii_digit() {
            if let Some(captured) = captures.get(chars[i + 1]) {
                out.push_str(captured);
            }
            i += 3;
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

/// Substitute parameter values; keys are left as declared.
pub fn substitute_params(params: &Params, captures: &Captures) -> Params {
    params
        .iter()
        .map(|(k, v)| (k.clone(), substitute(v, captures)))
        .collect()
}

/// A fresh action for request `name`, built from `template`.
///
/// The interceptor chain and location are shared with the template.
pub fn substitute_action(name: &str, template: &ActionConfig, captures: &Captures) -> ActionConfig {
    let results = template
        .results
        .values()
        .map(|result| {
            let result = ResultConfig {
                name: substitute(&result.name, captures),
                class_name: substitute(&result.class_name, captures),
                params: substitute_params(&result.params, captures),
            };
            (result.name.clone(), result)
        })
        .collect();

    let exception_mappings = template
        .exception_mappings
        .iter()
        .map(|mapping| ExceptionMappingConfig {
            name: substitute(&mapping.name, captures),
            exception_class: substitute(&mapping.exception_class, captures),
            result: substitute(&mapping.result, captures),
            params: substitute_params(&mapping.params, captures),
        })
        .collect();

    ActionConfig {
        name: name.to_string(),
        package_name: substitute(&template.package_name, captures),
        class_name: substitute(&template.class_name, captures),
        method: template.method.as_deref().map(|m| substitute(m, captures)),
        params: substitute_params(&template.params, captures),
        results,
        interceptors: Arc::clone(&template.interceptors),
        exception_mappings,
        location: Arc::clone(&template.location),
        default_method: Arc::clone(&template.default_method),
    }
}
