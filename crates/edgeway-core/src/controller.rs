//! Diagram controller: routes widget notifications and owner actions to
//! the diagram, the alignment engine and the waypoint editor.

use std::collections::HashSet;
use std::rc::Rc;

use kurbo::{Point, Size};

use crate::camera::{Camera, FOCUS_ZOOM, ScreenToCanvas, ViewportDimensions};
use crate::config::Configuration;
use crate::diagram::{Diagram, EdgeId, EdgeSpec, NodeId, NodeSpec};
use crate::error::DiagramResult;
use crate::geometry::find_node_center;
use crate::input::PointerEvent;
use crate::path::{Candidate, EdgePath, WaypointHandle};
use crate::snap::{AlignmentEngine, AlignmentGuides, NodePositionChange};
use crate::waypoint::{
    ContextMenuRequest, HandleHit, PointerCapture, WaypointEditor, hit_test_candidates,
    hit_test_waypoints,
};

/// Callbacks into the application that embeds the diagram.
pub trait DiagramOwner {
    /// The user clicked an edge or one of its waypoints.
    /// `waypoint_index` is `None` for a click on the edge line.
    fn on_open_edge_context_menu(
        &mut self,
        edge_id: &EdgeId,
        waypoint_index: Option<usize>,
        x: f64,
        y: f64,
    );
}

/// Everything needed to draw one edge for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEdge {
    pub id: EdgeId,
    pub path: EdgePath,
    /// SVG path data for the polyline.
    pub svg_path: String,
    pub label_position: Point,
    pub selected: bool,
    /// Draggable waypoints; only for selected edges.
    pub handles: Vec<WaypointHandle>,
    /// Insertion affordances; only for selected edges.
    pub candidates: Vec<Candidate>,
}

/// Owns the diagram state and drives every interaction on it.
pub struct DiagramController<O: DiagramOwner> {
    owner: O,
    config: Configuration,
    diagram: Diagram,
    alignment: AlignmentEngine,
    editor: WaypointEditor,
    camera: Camera,
    selected_edges: HashSet<EdgeId>,
}

impl<O: DiagramOwner> DiagramController<O> {
    pub fn new(owner: O, config: Configuration, surface: Rc<dyn PointerCapture>) -> Self {
        if let Err(err) = config.validate() {
            log::warn!("Invalid configuration, affected snapping is disabled: {}", err);
        }
        Self {
            owner,
            alignment: AlignmentEngine::new(&config),
            config,
            diagram: Diagram::new(),
            editor: WaypointEditor::new(surface),
            camera: Camera::new(),
            selected_edges: HashSet::new(),
        }
    }

    pub fn owner(&self) -> &O {
        &self.owner
    }

    pub fn owner_mut(&mut self) -> &mut O {
        &mut self.owner
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn alignment(&self) -> &AlignmentEngine {
        &self.alignment
    }

    pub fn alignment_mut(&mut self) -> &mut AlignmentEngine {
        &mut self.alignment
    }

    pub fn editor(&self) -> &WaypointEditor {
        &self.editor
    }

    // Owner actions

    /// Replace the diagram content. Drops any drag in progress.
    pub fn set_content(&mut self, nodes: Vec<NodeSpec>, edges: Vec<EdgeSpec>) {
        self.editor.cancel();
        self.alignment.reset();
        self.selected_edges.clear();
        log::info!("Setting content: {} nodes, {} edges", nodes.len(), edges.len());
        absorb("set content", self.diagram.set_content(nodes, edges));
    }

    pub fn add_nodes(&mut self, nodes: Vec<NodeSpec>) {
        absorb("add nodes", self.diagram.add_nodes(nodes));
    }

    pub fn remove_nodes(&mut self, ids: &[NodeId]) {
        for edge in self.diagram.remove_nodes(ids) {
            self.selected_edges.remove(&edge);
        }
    }

    pub fn update_nodes_position(&mut self, positions: &[(NodeId, Point)]) {
        absorb("update node positions", self.diagram.update_nodes_position(positions));
    }

    /// The rendering widget measured a node.
    pub fn set_node_measured(&mut self, id: &NodeId, size: Size) {
        absorb("set node size", self.diagram.set_node_measured(id, size));
    }

    pub fn add_edges(&mut self, edges: Vec<EdgeSpec>) {
        absorb("add edges", self.diagram.add_edges(edges));
    }

    pub fn remove_edges(&mut self, ids: &[EdgeId]) {
        self.diagram.remove_edges(ids);
        for id in ids {
            self.selected_edges.remove(id);
        }
    }

    pub fn set_edges_waypoints(&mut self, waypoints: Vec<(EdgeId, Vec<Point>)>) {
        absorb("set edge waypoints", self.diagram.set_edges_waypoints(waypoints));
    }

    pub fn select_edge(&mut self, id: &EdgeId) {
        if self.diagram.edge(id).is_some() {
            self.selected_edges.insert(id.clone());
        } else {
            log::warn!("Cannot select unknown edge {}", id);
        }
    }

    pub fn deselect_edge(&mut self, id: &EdgeId) {
        self.selected_edges.remove(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected_edges.clear();
    }

    pub fn is_edge_selected(&self, id: &EdgeId) -> bool {
        self.selected_edges.contains(id)
    }

    /// Center the view on a node, zooming in.
    pub fn center_viewport_to_node(&mut self, id: &NodeId, viewport: Size) {
        match self.diagram.node(id) {
            Some(node) => {
                let center = find_node_center(&node.geometry());
                self.camera.center_on(center, FOCUS_ZOOM, viewport);
            }
            None => log::warn!("Cannot center on unknown node {}", id),
        }
    }

    pub fn set_viewport_to_position(&mut self, position: Point, viewport: Size) {
        self.camera.center_on(position, self.camera.zoom, viewport);
    }

    /// Visible canvas area for a viewport of the given screen size.
    pub fn viewport(&self, viewport: Size) -> ViewportDimensions {
        self.camera.viewport(viewport)
    }

    // Widget notifications

    pub fn on_node_drag_start(&mut self, id: &NodeId) {
        match self.diagram.node(id) {
            Some(node) => self.alignment.on_drag_start(&node.geometry()),
            None => log::warn!("Drag start on unknown node {}", id),
        }
    }

    /// Apply one batch of position changes from the widget.
    /// Returns the corrected positions that were stored.
    pub fn on_nodes_change(
        &mut self,
        mut changes: Vec<NodePositionChange>,
    ) -> Vec<NodePositionChange> {
        let snapshot = self.diagram.snapshot();
        self.alignment.on_nodes_change(&mut changes, &snapshot);

        let positions: Vec<(NodeId, Point)> = changes
            .iter()
            .map(|change| (change.id.clone(), change.position))
            .collect();
        absorb("apply node changes", self.diagram.update_nodes_position(&positions));
        changes
    }

    pub fn on_node_drag_stop(&mut self, id: &NodeId) {
        self.alignment.on_drag_stop(id);
    }

    /// A click on the edge line itself.
    pub fn on_edge_path_click(&mut self, id: &EdgeId, screen_point: Point) {
        if self.diagram.edge(id).is_none() {
            log::warn!("Click on unknown edge {}", id);
            return;
        }
        let position = self.camera.screen_to_canvas(screen_point);
        self.open_context_menu(ContextMenuRequest {
            edge_id: id.clone(),
            waypoint_index: None,
            position,
        });
    }

    /// Route a pointer event from the canvas surface.
    /// Returns true when the event was consumed by waypoint editing.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down { position, .. } if event.is_primary_down() => {
                self.pointer_down(position)
            }
            PointerEvent::Down { .. } => false,
            PointerEvent::Move { position } => {
                match self.editor.pointer_move(&mut self.diagram, position, &self.camera) {
                    Ok(consumed) => consumed,
                    Err(err) => {
                        log::warn!("Waypoint drag aborted: {}", err);
                        true
                    }
                }
            }
            PointerEvent::Up { .. } => {
                let dragging = self.editor.is_dragging();
                if let Some(request) = self.editor.pointer_up() {
                    self.open_context_menu(request);
                }
                dragging
            }
            PointerEvent::Leave => {
                let dragging = self.editor.is_dragging();
                self.editor.pointer_leave();
                dragging
            }
        }
    }

    /// Waypoint handles of every selected edge are tested before any
    /// candidate. Later edges are drawn on top and tested first.
    fn pointer_down(&mut self, screen_point: Point) -> bool {
        let point = self.camera.screen_to_canvas(screen_point);
        let zoom = self.camera.zoom;
        let paths: Vec<(EdgeId, EdgePath)> = self
            .diagram
            .edges_ordered()
            .filter(|edge| self.selected_edges.contains(&edge.id))
            .filter_map(|edge| Some((edge.id.clone(), self.diagram.edge_path(&edge.id).ok()?)))
            .collect();

        let hit = paths
            .iter()
            .rev()
            .find_map(|(id, path)| {
                hit_test_waypoints(path, point, zoom)
                    .map(|index| (id.clone(), HandleHit::Waypoint(index)))
            })
            .or_else(|| {
                paths.iter().rev().find_map(|(id, path)| {
                    hit_test_candidates(path, point, zoom)
                        .map(|index| (id.clone(), HandleHit::Candidate(index)))
                })
            });

        let Some((edge_id, hit)) = hit else {
            return false;
        };
        let result = match hit {
            HandleHit::Waypoint(index) => {
                self.editor
                    .pointer_down_on_waypoint(&self.diagram, &edge_id, index)
            }
            HandleHit::Candidate(index) => {
                self.editor
                    .pointer_down_on_candidate(&mut self.diagram, &edge_id, index)
            }
        };
        absorb("waypoint pointer down", result);
        true
    }

    fn open_context_menu(&mut self, request: ContextMenuRequest) {
        self.owner.on_open_edge_context_menu(
            &request.edge_id,
            request.waypoint_index,
            request.position.x,
            request.position.y,
        );
    }

    // Render

    /// Paths for every drawable edge. Edges whose nodes cannot be
    /// resolved are logged and left out of this frame.
    pub fn render_edges(&self) -> Vec<RenderedEdge> {
        self.diagram
            .edges_ordered()
            .filter_map(|edge| match self.diagram.edge_path(&edge.id) {
                Ok(path) => Some(self.render_edge(&edge.id, path)),
                Err(err) => {
                    log::error!("Missing source or target for edge {}: {}", edge.id, err);
                    None
                }
            })
            .collect()
    }

    fn render_edge(&self, id: &EdgeId, path: EdgePath) -> RenderedEdge {
        let selected = self.selected_edges.contains(id);
        let (handles, candidates) = if selected {
            (path.waypoint_handles(), path.candidates())
        } else {
            (Vec::new(), Vec::new())
        };
        RenderedEdge {
            id: id.clone(),
            svg_path: path.svg_path_data(),
            label_position: path.label_position(),
            selected,
            handles,
            candidates,
            path,
        }
    }

    /// Guides to draw over the canvas.
    pub fn alignment_guides(&self) -> AlignmentGuides {
        self.alignment.guides()
    }
}

fn absorb(action: &str, result: DiagramResult<()>) {
    if let Err(err) = result {
        log::warn!("Failed to {}: {}", action, err);
    }
}
