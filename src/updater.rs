use crate::{
    dag::{DepGraph, NodeId},
    element::VH,
    error::Error,
    hierarchy::Hierarchy,
};

/// Incremental recomputation of a region of a subdivision hierarchy.
///
/// On creation the target vertices are traced back through their stencil
/// supports, capturing one vertex region per level down to the control mesh.
/// Each region becomes a node in a [`DepGraph`], chained coarse to fine, so
/// updates recompute exactly the captured regions in dependency order and
/// each at most once, no matter how often the chain was invalidated in
/// between.
pub struct RegionUpdater {
    /// One region per level, index matching the level. The control region is
    /// a pure source; finer regions are recomputed from the level below.
    regions: Vec<Vec<VH>>,
    nodes: Vec<NodeId>,
}

impl RegionUpdater {
    /// Capture the regions feeding `verts` at `level` and register the chain
    /// with the graph. Returns `None` when there is nothing to track: an
    /// empty vertex set, or the control level itself.
    pub fn create(
        hierarchy: &Hierarchy,
        graph: &mut DepGraph,
        level: usize,
        verts: &[VH],
    ) -> Result<Option<Self>, Error> {
        if level == 0 || verts.is_empty() {
            return Ok(None);
        }
        if level >= hierarchy.num_levels() {
            return Err(Error::LevelNotBuilt(level));
        }
        let mut regions = vec![Vec::new(); level + 1];
        let mut region: Vec<VH> = verts.to_vec();
        region.sort_unstable();
        region.dedup();
        regions[level] = region;
        for k in (1..=level).rev() {
            regions[k - 1] = hierarchy.get_subdiv_inputs(k, &regions[k])?;
        }
        if regions[0].is_empty() {
            return Ok(None);
        }
        let nodes: Vec<NodeId> = regions.iter().map(|_| graph.add_node()).collect();
        for pair in nodes.windows(2) {
            graph.add_dependency(pair[0], pair[1])?;
        }
        Ok(Some(RegionUpdater { regions, nodes }))
    }

    /// The finest level this updater recomputes.
    pub fn level(&self) -> usize {
        self.regions.len() - 1
    }

    /// The captured vertex region at the given level.
    pub fn region(&self, level: usize) -> Option<&[VH]> {
        self.regions.get(level).map(|r| r.as_slice())
    }

    /// The graph node representing the given level's region.
    pub fn node(&self, level: usize) -> Option<NodeId> {
        self.nodes.get(level).copied()
    }

    /// Mark the whole chain stale, typically after an edit to the control
    /// region.
    pub fn invalidate(&self, graph: &mut DepGraph) -> Result<(), Error> {
        graph.invalidate(self.nodes[0])
    }

    /// Bring the finest region current, recomputing stale regions coarse to
    /// fine. Work is proportional to the captured region sizes.
    pub fn recompute(
        &self,
        hierarchy: &mut Hierarchy,
        graph: &mut DepGraph,
    ) -> Result<(), Error> {
        let finest = *self.nodes.last().ok_or(Error::InvalidNode)?;
        graph.update(finest, &mut |id| {
            match self.nodes.iter().position(|n| *n == id) {
                // The control region is a source; nodes from other chains
                // are not ours to recompute.
                Some(0) | None => Ok(()),
                Some(k) => hierarchy.recompute_verts(k, &self.regions[k]),
            }
        })
    }
}
