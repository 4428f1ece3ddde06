// src/dependencies/graph.rs

//! In-memory dependency graph

use indexmap::IndexMap;
use std::collections::HashSet;

/// How two packages' direct dependency sets relate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageRelation {
    Equal,
    LeftSupersetOfRight,
    RightSupersetOfLeft,
}

/// Package name -> dependency names, in insertion order
///
/// Duplicate edges are kept; the graph is a log of what was recorded, not a set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: IndexMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `dependency` to `package`'s list, creating the list if needed
    pub fn add_edge(&mut self, package: &str, dependency: &str) {
        self.edges
            .entry(package.to_string())
            .or_default()
            .push(dependency.to_string());
    }

    /// Replace the whole record for `package`
    pub(crate) fn set_deps(&mut self, package: String, deps: Vec<String>) {
        self.edges.insert(package, deps);
    }

    /// Dependencies of `package`, empty if it has no record
    pub fn deps(&self, package: &str) -> &[String] {
        self.edges.get(package).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, package: &str) -> bool {
        self.edges.contains_key(package)
    }

    /// Records in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.edges
            .iter()
            .map(|(package, deps)| (package.as_str(), deps.as_slice()))
    }

    /// Number of packages with a record
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Compare the direct dependency sets of `left` and `right`
    ///
    /// Only direct edges count and duplicates are ignored. Returns `None`
    /// when neither package has a record or neither set contains the other.
    pub fn relation(&self, left: &str, right: &str) -> Option<PackageRelation> {
        if !self.contains(left) && !self.contains(right) {
            return None;
        }

        let left_set: HashSet<&str> = self.deps(left).iter().map(String::as_str).collect();
        let right_set: HashSet<&str> = self.deps(right).iter().map(String::as_str).collect();

        if left_set == right_set {
            Some(PackageRelation::Equal)
        } else if left_set.is_superset(&right_set) {
            Some(PackageRelation::LeftSupersetOfRight)
        } else if right_set.is_superset(&left_set) {
            Some(PackageRelation::RightSupersetOfLeft)
        } else {
            None
        }
    }
}
