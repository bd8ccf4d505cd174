//! # episim-engine::graph
//!
//! The read-only graph contract consumed by every engine, its implementation
//! for `petgraph` undirected graphs, and a builder that materializes the
//! declarative topology specifications used by scenarios.
//!
//! Node and edge weights expose named numeric attributes through the
//! `Attributes` trait so that per-edge transmission weights and per-node
//! recovery weights can be looked up by the rate functions. Unweighted graphs
//! use `()` as the weight type.

use episim_types::topology::TopologySpec;
use fxhash::FxHashMap;
use petgraph::graph::{Graph, NodeIndex, UnGraph};
use petgraph::Undirected;
use rand::Rng;
use std::fmt::Debug;
use std::hash::Hash;

/// Named numeric attribute lookup on a node or edge payload.
pub trait Attributes {
    fn get(&self, name: &str) -> Option<f64>;
}

/// No attributes.
impl Attributes for () {
    fn get(&self, _name: &str) -> Option<f64> {
        None
    }
}

/// A small bag of named weights for attributed graphs.
#[derive(Debug, Clone, Default)]
pub struct Attrs(FxHashMap<String, f64>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion: `Attrs::new().with("weight", 2.0)`.
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.0.insert(name.to_string(), value);
        self
    }
}

impl Attributes for Attrs {
    fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }
}

/// The contract a contact network must satisfy. The graph is read-only for
/// the whole run; engines own all mutable state themselves.
pub trait ContactGraph {
    type NodeId: Copy + Eq + Hash + Debug;

    /// Every node of the graph, in a deterministic order.
    fn nodes(&self) -> Vec<Self::NodeId>;

    /// All nodes adjacent to `u`, in a deterministic order.
    fn neighbors(&self, u: Self::NodeId) -> Vec<Self::NodeId>;

    /// Number of nodes.
    fn order(&self) -> usize;

    fn has_node(&self, u: Self::NodeId) -> bool;

    /// Named attribute of the edge (u, v), if the edge and attribute exist.
    fn edge_attr(&self, u: Self::NodeId, v: Self::NodeId, name: &str) -> Option<f64>;

    /// Named attribute of node `u`, if present.
    fn node_attr(&self, u: Self::NodeId, name: &str) -> Option<f64>;
}

impl<NW: Attributes, EW: Attributes> ContactGraph for Graph<NW, EW, Undirected> {
    type NodeId = NodeIndex;

    fn nodes(&self) -> Vec<NodeIndex> {
        self.node_indices().collect()
    }

    fn neighbors(&self, u: NodeIndex) -> Vec<NodeIndex> {
        Graph::neighbors(self, u).collect()
    }

    fn order(&self) -> usize {
        self.node_count()
    }

    fn has_node(&self, u: NodeIndex) -> bool {
        self.node_weight(u).is_some()
    }

    fn edge_attr(&self, u: NodeIndex, v: NodeIndex, name: &str) -> Option<f64> {
        self.find_edge(u, v)
            .and_then(|e| self.edge_weight(e))
            .and_then(|w| w.get(name))
    }

    fn node_attr(&self, u: NodeIndex, name: &str) -> Option<f64> {
        self.node_weight(u).and_then(|w| w.get(name))
    }
}

/// Materializes a declarative topology over `n` nodes.
pub fn from_topology<R: Rng>(spec: &TopologySpec, n: usize, rng: &mut R) -> UnGraph<(), ()> {
    let mut g = Graph::new_undirected();
    let nodes: Vec<NodeIndex> = (0..n).map(|_| g.add_node(())).collect();
    match spec {
        TopologySpec::FullMesh => {
            for i in 0..n {
                for j in (i + 1)..n {
                    g.add_edge(nodes[i], nodes[j], ());
                }
            }
        }
        TopologySpec::Ring => {
            if n == 2 {
                g.add_edge(nodes[0], nodes[1], ());
            } else if n > 2 {
                for i in 0..n {
                    g.add_edge(nodes[i], nodes[(i + 1) % n], ());
                }
            }
        }
        TopologySpec::Path => {
            for i in 1..n {
                g.add_edge(nodes[i - 1], nodes[i], ());
            }
        }
        TopologySpec::Star { hub } => {
            let hub = nodes[*hub as usize];
            for &v in &nodes {
                if v != hub {
                    g.add_edge(hub, v, ());
                }
            }
        }
        TopologySpec::ErdosRenyi { p } => {
            for i in 0..n {
                for j in (i + 1)..n {
                    if rng.gen::<f64>() < *p {
                        g.add_edge(nodes[i], nodes[j], ());
                    }
                }
            }
        }
        TopologySpec::FromEdges { edges } => {
            for &(u, v) in edges {
                g.add_edge(nodes[u as usize], nodes[v as usize], ());
            }
        }
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn topology_shapes_have_expected_sizes() {
        let mut rng = seeded(Some(3));
        let mesh = from_topology(&TopologySpec::FullMesh, 5, &mut rng);
        assert_eq!(mesh.edge_count(), 10);
        let ring = from_topology(&TopologySpec::Ring, 5, &mut rng);
        assert_eq!(ring.edge_count(), 5);
        let path = from_topology(&TopologySpec::Path, 5, &mut rng);
        assert_eq!(path.edge_count(), 4);
        let star = from_topology(&TopologySpec::Star { hub: 0 }, 5, &mut rng);
        assert_eq!(star.edge_count(), 4);
        let empty = from_topology(&TopologySpec::ErdosRenyi { p: 0.0 }, 5, &mut rng);
        assert_eq!(empty.edge_count(), 0);
        let full = from_topology(&TopologySpec::ErdosRenyi { p: 1.0 }, 5, &mut rng);
        assert_eq!(full.edge_count(), 10);
    }

    #[test]
    fn contract_exposes_structure_and_attributes() {
        let mut g: Graph<Attrs, Attrs, Undirected> = Graph::new_undirected();
        let a = g.add_node(Attrs::new().with("frailty", 2.0));
        let b = g.add_node(Attrs::new());
        g.add_edge(a, b, Attrs::new().with("contact", 0.5));

        assert_eq!(g.order(), 2);
        assert!(g.has_node(a));
        assert_eq!(ContactGraph::neighbors(&g, a), vec![b]);
        assert_eq!(g.edge_attr(a, b, "contact"), Some(0.5));
        assert_eq!(g.edge_attr(a, b, "missing"), None);
        assert_eq!(g.node_attr(a, "frailty"), Some(2.0));
        assert_eq!(g.node_attr(b, "frailty"), None);
    }
}
