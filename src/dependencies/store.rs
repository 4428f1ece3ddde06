// src/dependencies/store.rs

//! Loading and persisting `treepack.deps`

use super::DependencyGraph;
use crate::error::{Error, Result};
use crate::repo::Repo;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load the repo's dependency graph; a missing file is an empty graph
pub fn load(repo: &Repo) -> Result<DependencyGraph> {
    let path = repo.deps_path();
    if !path.exists() {
        debug!("No dependency file at {}, starting empty", path.display());
        return Ok(DependencyGraph::new());
    }
    let content = fs::read_to_string(&path)?;
    parse(&path, &content)
}

/// Parse dependency file text; `path` is only used for error messages
///
/// A non-indented line names a package and starts its record. Each
/// following line indented by one space is one of its dependencies.
pub fn parse(path: &Path, content: &str) -> Result<DependencyGraph> {
    let mut graph = DependencyGraph::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        if let Some(dep) = line.strip_prefix(' ') {
            match current.as_mut() {
                Some((_, deps)) => deps.push(dep.to_string()),
                None => {
                    return Err(Error::syntax(
                        path,
                        line_number,
                        "found package dep (begins with space ' ') without a package",
                    ));
                }
            }
        } else {
            if let Some((package, deps)) = current.take() {
                graph.set_deps(package, deps);
            }
            current = Some((line.to_string(), Vec::new()));
        }
    }

    if let Some((package, deps)) = current {
        graph.set_deps(package, deps);
    }
    Ok(graph)
}

/// Render the graph in dependency file format
pub fn render(graph: &DependencyGraph) -> String {
    let mut out = String::new();
    for (package, deps) in graph.iter() {
        out.push_str(package);
        out.push('\n');
        for dep in deps {
            out.push(' ');
            out.push_str(dep);
            out.push('\n');
        }
    }
    out
}

/// Rewrite the repo's dependency file from `graph`
///
/// Written to a temporary file first and renamed into place.
pub fn persist(repo: &Repo, graph: &DependencyGraph) -> Result<()> {
    let path = repo.deps_path();
    let temp_path = path.with_extension("deps-tmp");
    fs::write(&temp_path, render(graph))?;
    fs::rename(&temp_path, &path)?;
    debug!("Wrote {} package records to {}", graph.len(), path.display());
    Ok(())
}
