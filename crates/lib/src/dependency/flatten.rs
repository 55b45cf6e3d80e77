//! Dependency flattening.
//!
//! Reduces a tree of libraries to one priority-ordered list in which each
//! library appears once. Earlier entries override later ones when two libraries
//! provide a colliding resource.
//!
//! # Algorithm
//!
//! Direct dependencies are visited last-to-first. Each node's children are
//! flattened before the node itself, then the node is placed at the front of the
//! output unless it is already present. A library required by two higher-level
//! libraries therefore lands after both of them.
//!
//! The nodes on the current recursion path are tracked; meeting one of them
//! again is a cycle and aborts flattening.

use std::path::Path;
use std::sync::Arc;

use tracing::trace;

use super::{DependencyError, DependencyNode};

/// Flatten `direct` and its transitive dependencies into priority order.
pub fn flatten(direct: &[Arc<DependencyNode>]) -> Result<Vec<Arc<DependencyNode>>, DependencyError> {
  // Built back to front: pushing here is inserting at the front of the result.
  let mut reversed = Vec::new();
  let mut path = Vec::new();
  visit(direct, &mut reversed, &mut path)?;
  reversed.reverse();
  Ok(reversed)
}

fn visit<'a>(
  nodes: &'a [Arc<DependencyNode>],
  out: &mut Vec<Arc<DependencyNode>>,
  path: &mut Vec<&'a DependencyNode>,
) -> Result<(), DependencyError> {
  for node in nodes.iter().rev() {
    if path.iter().any(|p| p.root() == node.root()) {
      return Err(cycle_error(path, node));
    }

    // Children of an already placed node were placed before it.
    if contains(out, node.root()) {
      trace!(library = %node.name(), "already flattened");
      continue;
    }

    path.push(node.as_ref());
    visit(node.dependencies(), out, path)?;
    path.pop();

    out.push(Arc::clone(node));
  }
  Ok(())
}

fn contains(out: &[Arc<DependencyNode>], root: &Path) -> bool {
  out.iter().any(|n| n.root() == root)
}

fn cycle_error(path: &[&DependencyNode], repeated: &DependencyNode) -> DependencyError {
  let start = path.iter().position(|p| p.root() == repeated.root()).unwrap_or(0);
  let mut chain: Vec<&str> = path[start..].iter().map(|n| n.name()).collect();
  chain.push(repeated.name());
  DependencyError::Cycle {
    chain: chain.join(" -> "),
  }
}
