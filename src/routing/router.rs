//! Wildcard action lookup for one namespace.
//!
//! # Responsibilities
//! - Compile wildcard action names in declaration order
//! - Register the legacy shorthand right after its trailing-wildcard pattern
//! - Return the first matching action, substituted for the request
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan, first match wins; no best-match ranking
//! - No memoization: each lookup rescans

use std::sync::Arc;

use crate::routing::matcher::{is_wildcard, WildcardPattern};
use crate::routing::substitution::substitute_action;
use crate::runtime::model::ActionConfig;

#[derive(Debug, Clone)]
struct PatternMapping {
    pattern: WildcardPattern,
    target: Arc<ActionConfig>,
}

/// Ordered wildcard patterns of one namespace.
#[derive(Debug, Clone, Default)]
pub struct ActionRouter {
    mappings: Vec<PatternMapping>,
}

impl ActionRouter {
    /// Compile every wildcard name in `actions`, in iteration order.
    pub fn new<'a, I>(actions: I, loose_match: bool) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a Arc<ActionConfig>)>,
    {
        let mut router = Self::default();
        for (name, action) in actions {
            router.add_pattern(name, Arc::clone(action), loose_match);
        }
        router
    }

    /// Register `name` if it contains a wildcard.
    pub fn add_pattern(&mut self, name: &str, target: Arc<ActionConfig>, loose_match: bool) {
        if !is_wildcard(name) {
            return;
        }
        let name = name.strip_prefix('/').unwrap_or(name);
        self.mappings.push(PatternMapping {
            pattern: WildcardPattern::compile(name),
            target: Arc::clone(&target),
        });

        if loose_match {
            if let Some(shorthand) = loose_form(name) {
                tracing::trace!(pattern = %name, shorthand = %shorthand, "Registering loose pattern");
                self.mappings.push(PatternMapping {
                    pattern: WildcardPattern::compile(&shorthand),
                    target,
                });
            }
        }
    }

    /// First pattern matching `name`, as a fresh substituted action.
    pub fn match_action(&self, name: &str) -> Option<ActionConfig> {
        if self.mappings.is_empty() {
            return None;
        }
        self.mappings.iter().find_map(|mapping| {
            let captures = mapping.pattern.matches(name)?;
            tracing::debug!(name = %name, pattern = %mapping.pattern, "Wildcard pattern matched");
            Some(substitute_action(name, &mapping.target, &captures))
        })
    }

    /// Compiled patterns, in match order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.mappings.iter().map(|m| m.pattern.as_str())
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// The pattern minus its last two characters, for a name whose only
/// trailing wildcard follows a literal character.
fn loose_form(name: &str) -> Option<String> {
    let chars: Vec<char> = name.chars().collect();
    let last_star = chars.iter().rposition(|&c| c == '*')?;
    if last_star > 1 && last_star == chars.len() - 1 && chars[last_star - 1] != '*' {
        Some(chars[..chars.len() - 2].iter().collect())
    } else {
        None
    }
}
