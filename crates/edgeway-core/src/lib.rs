//! Edgeway Core Library
//!
//! Edge waypoint geometry and node alignment for an entity-relationship
//! diagram editor. The rendering widget reports node geometry and pointer
//! events; this crate derives edge paths, edits waypoints and computes
//! alignment guides.

pub mod camera;
pub mod config;
pub mod controller;
pub mod diagram;
pub mod error;
pub mod geometry;
pub mod input;
pub mod path;
pub mod snap;
pub mod waypoint;

pub use camera::{Camera, ScreenToCanvas, ViewportDimensions};
pub use config::Configuration;
pub use controller::{DiagramController, DiagramOwner, RenderedEdge};
pub use diagram::{Diagram, Edge, EdgeId, EdgeSpec, Node, NodeId, NodeSpec};
pub use error::{ConfigError, DiagramError, DiagramResult};
pub use geometry::{NodeGeometry, find_line_center, find_node_center};
pub use input::{MouseButton, PointerEvent};
pub use path::{Candidate, EdgePath, WaypointHandle};
pub use snap::{
    AlignmentEngine, AlignmentGuide, AlignmentGuides, GUIDE_LENGTH, GuideAxis, NodePositionChange,
    SnapMode, snap_to_grid,
};
pub use waypoint::{ContextMenuRequest, PointerCapture, PointerCaptureGuard, WaypointEditor};
