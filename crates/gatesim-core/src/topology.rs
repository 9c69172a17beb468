//! Topology diagnostics over the relation graph.
//!
//! Propagation assumes feed-forward wiring. These queries build a
//! `petgraph` view of the live relations to find feedback loops, which the
//! propagator can not settle once they oscillate. The per-connect loop check
//! walks fan-out lists directly instead.

use std::collections::HashSet;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use crate::id::{NodeKind, NodeRef, RelId};
use crate::scene::Scene;

impl Scene {
    /// Directed graph of live nodes with one edge per relation.
    pub fn signal_graph(&self) -> DiGraphMap<NodeRef, RelId> {
        let mut graph = DiGraphMap::new();
        for rel in self.rels.iter() {
            graph.add_edge(rel.from.node, rel.to.node, rel.id);
        }
        graph
    }

    /// Groups of nodes wired into feedback loops: strongly connected sets of
    /// more than one node, and nodes feeding themselves. Each group is sorted.
    pub fn feedback_loops(&self) -> Vec<Vec<NodeRef>> {
        let graph = self.signal_graph();
        let mut loops: Vec<Vec<NodeRef>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|group| match group.as_slice() {
                [single] => graph.contains_edge(*single, *single),
                _ => true,
            })
            .map(|mut group| {
                group.sort();
                group
            })
            .collect();
        loops.sort();
        loops
    }

    /// Returns `true` if a relation `from -> to` would close a loop.
    ///
    /// Only the nodes downstream of `to` are visited.
    pub fn closes_loop(&self, from: NodeRef, to: NodeRef) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![to];
        while let Some(node) = stack.pop() {
            if node == from {
                return true;
            }
            if !seen.insert(node) {
                continue;
            }
            for id in self.outgoing(node) {
                if let Some(rel) = self.rels.get(*id) {
                    stack.push(rel.to.node);
                }
            }
        }
        false
    }

    /// Relations leaving any output socket of `node`.
    fn outgoing(&self, node: NodeRef) -> impl Iterator<Item = &RelId> + '_ {
        let single = match node.kind {
            NodeKind::Gate => self.gates.get(node.index).map(|g| &g.outputs),
            NodeKind::Input => self.inputs.get(node.index).map(|i| &i.outputs),
            NodeKind::ComponentInputBoundary => self
                .context
                .as_ref()
                .and_then(|c| c.inputs.get(node.slot()))
                .map(|i| &i.outputs),
            _ => None,
        };
        let component = match node.kind {
            NodeKind::Component => self.components.get(node.index),
            _ => None,
        };
        single
            .into_iter()
            .flatten()
            .chain(component.into_iter().flat_map(|c| c.outputs.iter().flatten()))
    }
}
