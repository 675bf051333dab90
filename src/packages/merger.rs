//! Inherited views over the package arena.
//!
//! # Responsibilities
//! - "All" views: parents merged in list order, then local entries on top
//! - "Full default" lookups: own value, else first non-null from parents
//!
//! # Design Decisions
//! - Views walk `PackageId`s, never live object references
//! - A scope can wrap a package that is still being built and is not in
//!   the arena yet

use indexmap::IndexMap;

use crate::interceptor::{InterceptorEntry, InterceptorLocator};
use crate::packages::config::{PackageAction, PackageConfig};
use crate::packages::graph::PackageGraph;
use crate::runtime::model::{ExceptionMappingConfig, ResultConfig, ResultTypeConfig};

/// A package seen together with its ancestry.
#[derive(Clone, Copy)]
pub struct PackageScope<'a> {
    graph: &'a PackageGraph,
    package: &'a PackageConfig,
}

impl<'a> PackageScope<'a> {
    pub fn new(graph: &'a PackageGraph, package: &'a PackageConfig) -> Self {
        Self { graph, package }
    }

    pub fn package(&self) -> &'a PackageConfig {
        self.package
    }

    fn parents(&self) -> impl Iterator<Item = PackageScope<'a>> + 'a {
        let graph = self.graph;
        self.package
            .parents
            .iter()
            .map(move |id| PackageScope::new(graph, graph.get(*id)))
    }

    fn merge_maps<V: Clone>(
        &self,
        pick: fn(&PackageConfig) -> &IndexMap<String, V>,
        out: &mut IndexMap<String, V>,
    ) {
        for parent in self.parents() {
            parent.merge_maps(pick, out);
        }
        for (name, value) in pick(self.package) {
            out.insert(name.clone(), value.clone());
        }
    }

    fn find<V>(&self, pick: fn(&'a PackageConfig) -> &'a IndexMap<String, V>, name: &str) -> Option<&'a V> {
        if let Some(value) = pick(self.package).get(name) {
            return Some(value);
        }
        // Later parents in the list overlay earlier ones in the merged view.
        let parents: Vec<_> = self.parents().collect();
        parents.iter().rev().find_map(|parent| parent.find(pick, name))
    }

    fn first_non_null(&self, pick: fn(&'a PackageConfig) -> &'a Option<String>) -> Option<&'a str> {
        if let Some(value) = pick(self.package) {
            return Some(value.as_str());
        }
        self.parents().find_map(|parent| parent.first_non_null(pick))
    }

    pub fn all_actions(&self) -> IndexMap<String, PackageAction> {
        let mut out = IndexMap::new();
        self.merge_maps(|p| &p.actions, &mut out);
        out
    }

    pub fn all_global_results(&self) -> IndexMap<String, ResultConfig> {
        let mut out = IndexMap::new();
        self.merge_maps(|p| &p.global_results, &mut out);
        out
    }

    pub fn all_interceptors(&self) -> IndexMap<String, InterceptorEntry> {
        let mut out = IndexMap::new();
        self.merge_maps(|p| &p.interceptors, &mut out);
        out
    }

    pub fn all_result_types(&self) -> IndexMap<String, ResultTypeConfig> {
        let mut out = IndexMap::new();
        self.merge_maps(|p| &p.result_types, &mut out);
        out
    }

    /// Parents' mappings first, then the package's own.
    pub fn all_exception_mappings(&self) -> Vec<ExceptionMappingConfig> {
        let mut out = Vec::new();
        for parent in self.parents() {
            out.extend(parent.all_exception_mappings());
        }
        out.extend(self.package.exception_mappings.iter().cloned());
        out
    }

    pub fn result_type(&self, name: &str) -> Option<&'a ResultTypeConfig> {
        self.find(|p| &p.result_types, name)
    }

    pub fn full_default_interceptor_ref(&self) -> Option<&'a str> {
        self.first_non_null(|p| &p.default_interceptor_ref)
    }

    pub fn full_default_action_ref(&self) -> Option<&'a str> {
        self.first_non_null(|p| &p.default_action_ref)
    }

    pub fn full_default_result_type(&self) -> Option<&'a str> {
        self.first_non_null(|p| &p.default_result_type)
    }

    pub fn full_default_class_ref(&self) -> Option<&'a str> {
        self.first_non_null(|p| &p.default_class_ref)
    }
}

impl InterceptorLocator for PackageScope<'_> {
    fn interceptor_config(&self, name: &str) -> Option<&InterceptorEntry> {
        self.find(|p| &p.interceptors, name)
    }
}
