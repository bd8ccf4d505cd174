//! # episim-types::topology
//!
//! Declarative specifications for contact-network topologies.
//! The engine uses these specifications to construct the graph a scenario
//! runs on; library users who already hold a graph never touch them.

use serde::{Deserialize, Serialize};

/// Identifier for a node in a generated topology (0..n).
pub type NodeId = u32;

/// An enum representing different ways to specify the contact graph.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub enum TopologySpec {
    /// Every node is connected to every other node.
    FullMesh,
    /// Nodes are connected in a ring: 0-1, 1-2, ..., (N-1)-0.
    Ring,
    /// Nodes are connected in a path: 0-1, 1-2, ..., (N-2)-(N-1).
    Path,
    /// All nodes connect to a central hub node.
    Star { hub: NodeId },
    /// A random graph where each possible edge is created with probability `p`.
    ErdosRenyi { p: f64 },
    /// A graph defined by an explicit list of undirected edges.
    FromEdges { edges: Vec<(NodeId, NodeId)> },
}
