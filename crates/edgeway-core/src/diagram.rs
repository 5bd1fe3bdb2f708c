//! Diagram content: nodes and edges keyed by stable identifiers.

use std::collections::HashMap;
use std::fmt;

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

use crate::error::{DiagramError, DiagramResult};
use crate::geometry::NodeGeometry;
use crate::path::EdgePath;

/// Identifier of a node, assigned by the owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

/// Identifier of an edge, assigned by the owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(NodeId);
string_id!(EdgeId);

/// A node as the owner describes it when adding content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub identifier: NodeId,
    /// Position used when the node is added; ignored afterwards.
    pub initial_position: Point,
    #[serde(default)]
    pub label: String,
}

/// An edge as the owner describes it when adding content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub identifier: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub initial_waypoints: Vec<Point>,
}

/// A node on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Top-left corner in canvas space.
    pub position: Point,
    /// Size measured by the rendering widget, if known.
    pub measured: Option<Size>,
    pub label: String,
}

impl Node {
    pub fn geometry(&self) -> NodeGeometry {
        NodeGeometry::new(self.id.clone(), self.position, self.measured)
    }
}

impl From<NodeSpec> for Node {
    fn from(spec: NodeSpec) -> Self {
        Self {
            id: spec.identifier,
            position: spec.initial_position,
            measured: None,
            label: spec.label,
        }
    }
}

/// An edge with its user-placed interior waypoints.
///
/// The endpoint anchors are derived from node geometry and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Interior points, in traversal order from source to target.
    pub waypoints: Vec<Point>,
}

impl From<EdgeSpec> for Edge {
    fn from(spec: EdgeSpec) -> Self {
        Self {
            id: spec.identifier,
            source: spec.source,
            target: spec.target,
            waypoints: spec.initial_waypoints,
        }
    }
}

/// All nodes and edges of a diagram.
///
/// Iteration follows insertion order, so anything derived from it
/// (alignment tie-breaks, render order) is deterministic.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    nodes: HashMap<NodeId, Node>,
    node_order: Vec<NodeId>,
    edges: HashMap<EdgeId, Edge>,
    edge_order: Vec<EdgeId>,
}

impl Diagram {
    /// Create an empty diagram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole content.
    pub fn set_content(&mut self, nodes: Vec<NodeSpec>, edges: Vec<EdgeSpec>) -> DiagramResult<()> {
        let mut fresh = Diagram::new();
        fresh.add_nodes(nodes)?;
        fresh.add_edges(edges)?;
        *self = fresh;
        Ok(())
    }

    /// Add nodes. Nothing is added if any identifier is already taken.
    pub fn add_nodes(&mut self, nodes: Vec<NodeSpec>) -> DiagramResult<()> {
        let mut seen = std::collections::HashSet::new();
        for spec in &nodes {
            if self.nodes.contains_key(&spec.identifier) || !seen.insert(&spec.identifier) {
                return Err(DiagramError::DuplicateNode(spec.identifier.clone()));
            }
        }
        for spec in nodes {
            let node = Node::from(spec);
            self.node_order.push(node.id.clone());
            self.nodes.insert(node.id.clone(), node);
        }
        Ok(())
    }

    /// Remove nodes and every edge attached to them.
    /// Returns the identifiers of the removed edges.
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> Vec<EdgeId> {
        for id in ids {
            self.nodes.remove(id);
        }
        self.node_order.retain(|id| !ids.contains(id));

        let dangling: Vec<EdgeId> = self
            .edges_ordered()
            .filter(|edge| ids.contains(&edge.source) || ids.contains(&edge.target))
            .map(|edge| edge.id.clone())
            .collect();
        self.remove_edges(&dangling);
        dangling
    }

    /// Move nodes to new positions.
    pub fn update_nodes_position(&mut self, positions: &[(NodeId, Point)]) -> DiagramResult<()> {
        if let Some((id, _)) = positions.iter().find(|(id, _)| !self.nodes.contains_key(id)) {
            return Err(DiagramError::UnknownNode(id.clone()));
        }
        for (id, position) in positions {
            if let Some(node) = self.nodes.get_mut(id) {
                node.position = *position;
            }
        }
        Ok(())
    }

    /// Record the size measured by the rendering widget.
    pub fn set_node_measured(&mut self, id: &NodeId, size: Size) -> DiagramResult<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| DiagramError::UnknownNode(id.clone()))?;
        node.measured = Some(size);
        Ok(())
    }

    /// Add edges. Endpoints are not checked here; an edge whose nodes
    /// are missing is skipped at render time.
    pub fn add_edges(&mut self, edges: Vec<EdgeSpec>) -> DiagramResult<()> {
        let mut seen = std::collections::HashSet::new();
        for spec in &edges {
            if self.edges.contains_key(&spec.identifier) || !seen.insert(&spec.identifier) {
                return Err(DiagramError::DuplicateEdge(spec.identifier.clone()));
            }
        }
        for spec in edges {
            let edge = Edge::from(spec);
            self.edge_order.push(edge.id.clone());
            self.edges.insert(edge.id.clone(), edge);
        }
        Ok(())
    }

    /// Remove edges by identifier. Unknown identifiers are ignored.
    pub fn remove_edges(&mut self, ids: &[EdgeId]) {
        for id in ids {
            self.edges.remove(id);
        }
        self.edge_order.retain(|id| !ids.contains(id));
    }

    /// Replace the waypoints of several edges at once.
    pub fn set_edges_waypoints(
        &mut self,
        waypoints: Vec<(EdgeId, Vec<Point>)>,
    ) -> DiagramResult<()> {
        if let Some((id, _)) = waypoints.iter().find(|(id, _)| !self.edges.contains_key(id)) {
            return Err(DiagramError::UnknownEdge(id.clone()));
        }
        for (id, points) in waypoints {
            if let Some(edge) = self.edges.get_mut(&id) {
                edge.waypoints = points;
            }
        }
        Ok(())
    }

    /// Derive a new waypoint list from the current one and store it.
    pub fn update_edge_waypoints<F>(&mut self, id: &EdgeId, update: F) -> DiagramResult<()>
    where
        F: FnOnce(&[Point]) -> Vec<Point>,
    {
        let edge = self
            .edges
            .get_mut(id)
            .ok_or_else(|| DiagramError::UnknownEdge(id.clone()))?;
        edge.waypoints = update(&edge.waypoints);
        Ok(())
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Nodes in insertion order.
    pub fn nodes_ordered(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Edges in insertion order.
    pub fn edges_ordered(&self) -> impl Iterator<Item = &Edge> {
        self.edge_order.iter().filter_map(|id| self.edges.get(id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Current path of an edge. Fails when the edge or either of its
    /// nodes is missing.
    pub fn edge_path(&self, id: &EdgeId) -> DiagramResult<EdgePath> {
        let edge = self
            .edge(id)
            .ok_or_else(|| DiagramError::UnknownEdge(id.clone()))?;
        let source = self
            .node(&edge.source)
            .ok_or_else(|| DiagramError::UnknownNode(edge.source.clone()))?;
        let target = self
            .node(&edge.target)
            .ok_or_else(|| DiagramError::UnknownNode(edge.target.clone()))?;
        Ok(EdgePath::build(&source.geometry(), &target.geometry(), &edge.waypoints))
    }

    /// Geometry of every node, in insertion order, for one tick.
    pub fn snapshot(&self) -> Vec<NodeGeometry> {
        self.nodes_ordered().map(Node::geometry).collect()
    }
}
