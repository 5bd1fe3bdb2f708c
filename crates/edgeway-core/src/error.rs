//! Error types.

use thiserror::Error;

use crate::diagram::{EdgeId, NodeId};

/// Errors from diagram arena operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagramError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("Unknown edge: {0}")]
    UnknownEdge(EdgeId),
    #[error("Node already exists: {0}")]
    DuplicateNode(NodeId),
    #[error("Edge already exists: {0}")]
    DuplicateEdge(EdgeId),
    #[error("Waypoint {index} out of range for edge {edge} with {len} waypoints")]
    WaypointOutOfRange { edge: EdgeId, index: usize, len: usize },
}

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Result type for diagram operations.
pub type DiagramResult<T> = Result<T, DiagramError>;
