//! Copying store objects between local stores.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::info;

use super::{Store, StoreError, StorePath};

/// Copy `paths` from `src` into `dst`, references before referrers.
///
/// Paths already valid in `dst` are skipped. References of copied paths that
/// are neither in `paths` nor valid in `dst` make the import fail, so callers
/// usually pass a closure. Returns the paths actually copied, in copy order.
pub fn copy_paths(src: &dyn Store, dst: &dyn Store, paths: &[StorePath]) -> Result<Vec<StorePath>, StoreError> {
  let src_local = src.as_local_fs().ok_or_else(|| StoreError::NotLocal(src.uri()))?;
  let dst_local = dst.as_local_fs().ok_or_else(|| StoreError::NotLocal(dst.uri()))?;

  let mut graph: DiGraph<StorePath, ()> = DiGraph::new();
  let mut nodes: HashMap<StorePath, NodeIndex> = HashMap::new();
  let mut infos = HashMap::new();

  let wanted: BTreeSet<&StorePath> = paths.iter().collect();
  for path in wanted {
    if dst.is_valid_path(path)? {
      continue;
    }
    let info = src.query_path_info(path)?;
    nodes.insert(path.clone(), graph.add_node(path.clone()));
    infos.insert(path.clone(), info);
  }

  for (path, info) in &infos {
    for reference in info.references.iter().filter(|r| *r != path) {
      if let Some(&from) = nodes.get(reference) {
        graph.add_edge(from, nodes[path], ());
      }
    }
  }

  let order = toposort(&graph, None)
    .map_err(|cycle| StoreError::ReferenceCycle(graph[cycle.node_id()].to_string()))?;

  let mut copied = Vec::with_capacity(order.len());
  for index in order {
    let path = &graph[index];
    dst_local.import_path(&infos[path], &src_local.real_path(path))?;
    copied.push(path.clone());
  }

  info!(copied = copied.len(), from = %src.uri(), to = %dst.uri(), "copied paths");
  Ok(copied)
}
