// src/dependencies/mod.rs

//! Package dependency tracking
//!
//! Dependencies are directed edges `package -> depends-on`, kept as an
//! append log per package and persisted in `treepack.deps`:
//!
//! ```text
//! legacy
//!  0
//! app-core
//!  0
//!  legacy
//! ```
//!
//! # Example
//!
//! ```ignore
//! use treepack::dependencies::{self, DependencyGraph};
//!
//! let mut graph = dependencies::load(&repo)?;
//! graph.add_edge("legacy", "0");
//! dependencies::persist(&repo, &graph)?;
//! ```

mod graph;
mod store;

pub use graph::{DependencyGraph, PackageRelation};
pub use store::{load, parse, persist, render};
