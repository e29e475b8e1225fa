use std::fmt::{Debug, Display};

use crate::error::Error;

/// Handle of a node in a [`DepGraph`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    idx: u32,
}

impl NodeId {
    pub fn index(self) -> u32 {
        self.idx
    }
}

impl From<u32> for NodeId {
    fn from(idx: u32) -> Self {
        NodeId { idx }
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.idx)
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.idx)
    }
}

struct Node {
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    dirty: bool,
    stamp: u64,
}

/// Dependency graph driving incremental recomputation.
///
/// Nodes live in an arena and edges always point from an input to the node
/// that consumes it. The graph is kept acyclic by rejecting edges at
/// insertion time. Invalidation floods downstream through outputs and
/// short-circuits on nodes that are already dirty; updates walk upstream
/// through inputs and recompute dirty nodes in dependency order. A
/// generation counter stamps nodes as they are brought current, so a node
/// reachable along multiple paths is recomputed at most once per update.
pub struct DepGraph {
    nodes: Vec<Node>,
    generation: u64,
}

impl Default for DepGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DepGraph {
    pub fn new() -> Self {
        DepGraph {
            nodes: Vec::new(),
            generation: 0,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_valid_node(&self, n: NodeId) -> bool {
        (n.index() as usize) < self.nodes.len()
    }

    /// Create a node. New nodes start out dirty; a node with no inputs
    /// becomes current after its first update and stays current until it is
    /// invalidated directly.
    pub fn add_node(&mut self) -> NodeId {
        let id: NodeId = (self.nodes.len() as u32).into();
        self.nodes.push(Node {
            inputs: Vec::new(),
            outputs: Vec::new(),
            dirty: true,
            stamp: 0,
        });
        id
    }

    fn node(&self, n: NodeId) -> Result<&Node, Error> {
        self.nodes.get(n.index() as usize).ok_or(Error::InvalidNode)
    }

    fn node_mut(&mut self, n: NodeId) -> Result<&mut Node, Error> {
        self.nodes
            .get_mut(n.index() as usize)
            .ok_or(Error::InvalidNode)
    }

    pub fn inputs(&self, n: NodeId) -> Result<&[NodeId], Error> {
        Ok(&self.node(n)?.inputs)
    }

    pub fn outputs(&self, n: NodeId) -> Result<&[NodeId], Error> {
        Ok(&self.node(n)?.outputs)
    }

    pub fn is_current(&self, n: NodeId) -> Result<bool, Error> {
        Ok(!self.node(n)?.dirty)
    }

    /// Whether `to` is reachable from `from` by following output edges.
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![from];
        while let Some(n) = stack.pop() {
            if n == to {
                return true;
            }
            if std::mem::replace(&mut visited[n.index() as usize], true) {
                continue;
            }
            stack.extend(self.nodes[n.index() as usize].outputs.iter().copied());
        }
        false
    }

    /// Register `input` as a dependency of `output`.
    ///
    /// The edge is rejected with [`Error::DependencyCycle`] if `output`
    /// already reaches `input`, which keeps the graph a DAG. Duplicate edges
    /// are ignored.
    pub fn add_dependency(&mut self, input: NodeId, output: NodeId) -> Result<(), Error> {
        if !self.is_valid_node(input) || !self.is_valid_node(output) {
            return Err(Error::InvalidNode);
        }
        if self.node(output)?.inputs.contains(&input) {
            return Ok(());
        }
        if input == output || self.reaches(output, input) {
            return Err(Error::DependencyCycle);
        }
        self.node_mut(output)?.inputs.push(input);
        self.node_mut(input)?.outputs.push(output);
        Ok(())
    }

    /// Mark a node and everything downstream of it dirty.
    ///
    /// An already dirty node is skipped along with its outputs; they were
    /// flooded when it first became dirty.
    pub fn invalidate(&mut self, n: NodeId) -> Result<(), Error> {
        if !self.is_valid_node(n) {
            return Err(Error::InvalidNode);
        }
        let mut stack = vec![n];
        while let Some(n) = stack.pop() {
            let node = &mut self.nodes[n.index() as usize];
            if node.dirty {
                continue;
            }
            node.dirty = true;
            stack.extend(node.outputs.iter().copied());
        }
        // The node itself is marked even if it was already dirty.
        self.nodes[n.index() as usize].dirty = true;
        Ok(())
    }

    /// The transitive inputs of `n` (including `n`), inputs before the nodes
    /// that consume them.
    pub fn topological_order(&self, n: NodeId) -> Result<Vec<NodeId>, Error> {
        if !self.is_valid_node(n) {
            return Err(Error::InvalidNode);
        }
        let mut order = Vec::new();
        let mut visited = vec![false; self.nodes.len()];
        // (node, inputs consumed so far)
        let mut stack: Vec<(NodeId, usize)> = vec![(n, 0)];
        while let Some((n, i)) = stack.pop() {
            let node = &self.nodes[n.index() as usize];
            if i == 0 && visited[n.index() as usize] {
                continue;
            }
            visited[n.index() as usize] = true;
            match node.inputs.get(i) {
                Some(input) => {
                    stack.push((n, i + 1));
                    if !visited[input.index() as usize] {
                        stack.push((*input, 0));
                    }
                }
                None => order.push(n),
            }
        }
        Ok(order)
    }

    /// Bring `n` current: recompute every dirty node among its transitive
    /// inputs in dependency order, calling `recompute` once per node.
    pub fn update(
        &mut self,
        n: NodeId,
        recompute: &mut dyn FnMut(NodeId) -> Result<(), Error>,
    ) -> Result<(), Error> {
        self.generation += 1;
        let generation = self.generation;
        for id in self.topological_order(n)? {
            let node = &mut self.nodes[id.index() as usize];
            if node.stamp == generation || !node.dirty {
                continue;
            }
            node.stamp = generation;
            recompute(id)?;
            self.nodes[id.index() as usize].dirty = false;
        }
        Ok(())
    }
}
