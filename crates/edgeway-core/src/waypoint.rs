//! Waypoint editing: dragging existing waypoints and inserting new ones.
//!
//! A drag starts with a pointer-down on a waypoint handle and ends with
//! exactly one pointer-up or pointer-leave. While it is alive the canvas
//! surface routes pointer events to the editor; [`PointerCaptureGuard`]
//! ties that routing to the session so it is released on every exit path.

use std::fmt;
use std::rc::Rc;

use kurbo::Point;

use crate::camera::ScreenToCanvas;
use crate::diagram::{Diagram, EdgeId};
use crate::error::{DiagramError, DiagramResult};
use crate::geometry::{insert_at, replace_at};
use crate::path::{CANDIDATE_HANDLE_RADIUS, EdgePath, WAYPOINT_HANDLE_RADIUS};

/// The canvas surface that delivers pointer events during a drag.
///
/// Implementations register move/up/leave listeners in `capture` and
/// remove them in `release`.
pub trait PointerCapture {
    fn capture(&self, edge: &EdgeId);
    fn release(&self, edge: &EdgeId);
}

/// Holds a pointer capture for one drag session; releases it on drop.
pub struct PointerCaptureGuard {
    surface: Rc<dyn PointerCapture>,
    edge: EdgeId,
}

impl PointerCaptureGuard {
    pub fn acquire(surface: Rc<dyn PointerCapture>, edge: EdgeId) -> Self {
        surface.capture(&edge);
        Self { surface, edge }
    }
}

impl Drop for PointerCaptureGuard {
    fn drop(&mut self) {
        self.surface.release(&self.edge);
    }
}

impl fmt::Debug for PointerCaptureGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerCaptureGuard")
            .field("edge", &self.edge)
            .finish_non_exhaustive()
    }
}

/// An in-progress waypoint drag.
#[derive(Debug)]
pub struct DragSession {
    pub edge_id: EdgeId,
    /// Index into the edge's stored waypoints.
    pub waypoint_index: usize,
    /// Waypoint position before the drag.
    pub origin: Point,
    /// Whether any pointer-move arrived.
    pub moved: bool,
    _capture: PointerCaptureGuard,
}

#[derive(Debug, Default)]
enum EditorState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Request for the owner to open the edge context menu.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenuRequest {
    pub edge_id: EdgeId,
    /// The clicked waypoint; `None` for a click on the edge line itself.
    pub waypoint_index: Option<usize>,
    /// Canvas position to open the menu at.
    pub position: Point,
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleHit {
    /// An existing waypoint (stored index).
    Waypoint(usize),
    /// A candidate midpoint (insertion index).
    Candidate(usize),
}

/// Find the handle under a canvas point. Waypoints take precedence over
/// candidates. Radii are in screen pixels, hence the zoom.
pub fn hit_test_handles(path: &EdgePath, point: Point, zoom: f64) -> Option<HandleHit> {
    hit_test_waypoints(path, point, zoom)
        .map(HandleHit::Waypoint)
        .or_else(|| hit_test_candidates(path, point, zoom).map(HandleHit::Candidate))
}

/// Stored index of the waypoint handle under a canvas point.
pub fn hit_test_waypoints(path: &EdgePath, point: Point, zoom: f64) -> Option<usize> {
    path.waypoint_handles()
        .into_iter()
        .find(|handle| within(handle.position, point, WAYPOINT_HANDLE_RADIUS / zoom))
        .map(|handle| handle.index)
}

/// Insertion index of the candidate under a canvas point.
pub fn hit_test_candidates(path: &EdgePath, point: Point, zoom: f64) -> Option<usize> {
    path.candidates()
        .into_iter()
        .find(|candidate| within(candidate.position, point, CANDIDATE_HANDLE_RADIUS / zoom))
        .map(|candidate| candidate.index)
}

fn within(center: Point, point: Point, radius: f64) -> bool {
    (center - point).hypot2() <= radius * radius
}

/// State machine for waypoint interaction: idle or dragging one waypoint.
pub struct WaypointEditor {
    surface: Rc<dyn PointerCapture>,
    state: EditorState,
}

impl WaypointEditor {
    pub fn new(surface: Rc<dyn PointerCapture>) -> Self {
        Self {
            surface,
            state: EditorState::Idle,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, EditorState::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            EditorState::Dragging(session) => Some(session),
            EditorState::Idle => None,
        }
    }

    /// Start dragging waypoint `index` of an edge.
    pub fn pointer_down_on_waypoint(
        &mut self,
        diagram: &Diagram,
        edge_id: &EdgeId,
        index: usize,
    ) -> DiagramResult<()> {
        let edge = diagram
            .edge(edge_id)
            .ok_or_else(|| DiagramError::UnknownEdge(edge_id.clone()))?;
        let origin = *edge
            .waypoints
            .get(index)
            .ok_or_else(|| DiagramError::WaypointOutOfRange {
                edge: edge_id.clone(),
                index,
                len: edge.waypoints.len(),
            })?;

        // Release any stale capture before taking a new one
        self.state = EditorState::Idle;
        log::debug!("Waypoint drag start on {} #{}", edge_id, index);
        self.state = EditorState::Dragging(DragSession {
            edge_id: edge_id.clone(),
            waypoint_index: index,
            origin,
            moved: false,
            _capture: PointerCaptureGuard::acquire(Rc::clone(&self.surface), edge_id.clone()),
        });
        Ok(())
    }

    /// Insert a waypoint at candidate `index`. No drag session starts.
    pub fn pointer_down_on_candidate(
        &mut self,
        diagram: &mut Diagram,
        edge_id: &EdgeId,
        index: usize,
    ) -> DiagramResult<()> {
        self.state = EditorState::Idle;

        let path = diagram.edge_path(edge_id)?;
        let candidates = path.candidates();
        let candidate = candidates
            .get(index)
            .ok_or_else(|| DiagramError::WaypointOutOfRange {
                edge: edge_id.clone(),
                index,
                len: candidates.len(),
            })?;

        log::debug!("Waypoint inserted on {} at #{}", edge_id, index);
        diagram.update_edge_waypoints(edge_id, |waypoints| {
            insert_at(waypoints, index, candidate.position)
        })
    }

    /// Move the dragged waypoint under the pointer.
    /// Returns false when there is no drag to apply it to.
    pub fn pointer_move(
        &mut self,
        diagram: &mut Diagram,
        screen_point: Point,
        transform: &dyn ScreenToCanvas,
    ) -> DiagramResult<bool> {
        let EditorState::Dragging(session) = &mut self.state else {
            return Ok(false);
        };
        session.moved = true;

        let position = transform.screen_to_canvas(screen_point);
        let index = session.waypoint_index;
        let result = diagram.update_edge_waypoints(&session.edge_id, |waypoints| {
            replace_at(waypoints, index, position)
        });
        if result.is_err() {
            // The edge is gone; nothing left to drag
            self.state = EditorState::Idle;
        }
        result.map(|()| true)
    }

    /// End the drag. A drag without movement is a click and asks for the
    /// context menu at the waypoint's original position.
    pub fn pointer_up(&mut self) -> Option<ContextMenuRequest> {
        let EditorState::Dragging(session) = std::mem::take(&mut self.state) else {
            return None;
        };
        log::debug!("Waypoint drag end on {} (moved: {})", session.edge_id, session.moved);
        if session.moved {
            return None;
        }
        Some(ContextMenuRequest {
            edge_id: session.edge_id.clone(),
            waypoint_index: Some(session.waypoint_index),
            position: session.origin,
        })
    }

    /// The pointer left the canvas; abandon the drag.
    pub fn pointer_leave(&mut self) {
        if let EditorState::Dragging(session) = std::mem::take(&mut self.state) {
            log::debug!("Waypoint drag on {} left the canvas", session.edge_id);
        }
    }

    /// Drop any session, e.g. when content is replaced.
    pub fn cancel(&mut self) {
        self.state = EditorState::Idle;
    }
}

impl fmt::Debug for WaypointEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaypointEditor")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
