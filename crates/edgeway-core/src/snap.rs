//! Grid snapping and alignment guides for dragged nodes.

use kurbo::{Line, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::diagram::NodeId;
use crate::geometry::NodeGeometry;

/// Length of a drawn guide line.
pub const GUIDE_LENGTH: f64 = 20000.0;

/// Snap mode for dragged nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapMode {
    /// No position correction. Guides are still reported.
    None,
    /// Round positions to the grid.
    Grid,
    /// Move the node onto a detected guide.
    Guides,
    /// Grid first, then guides.
    #[default]
    All,
}

impl SnapMode {
    /// Cycle to the next snap mode.
    pub fn next(self) -> Self {
        match self {
            SnapMode::None => SnapMode::Grid,
            SnapMode::Grid => SnapMode::Guides,
            SnapMode::Guides => SnapMode::All,
            SnapMode::All => SnapMode::None,
        }
    }

    /// Check if grid snapping is enabled.
    pub fn snaps_to_grid(self) -> bool {
        matches!(self, SnapMode::Grid | SnapMode::All)
    }

    /// Check if guide snapping is enabled.
    pub fn snaps_to_guides(self) -> bool {
        matches!(self, SnapMode::Guides | SnapMode::All)
    }
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate changed.
    pub snapped_x: bool,
    /// Whether the Y coordinate changed.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Round each axis to the nearest multiple of the grid spacing.
///
/// An axis whose spacing is not positive and finite is left as is.
pub fn snap_to_grid(point: Point, grid: Vec2) -> SnapResult {
    let x = snap_axis(point.x, grid.x);
    let y = snap_axis(point.y, grid.y);
    SnapResult {
        point: Point::new(x, y),
        snapped_x: x != point.x,
        snapped_y: y != point.y,
    }
}

fn snap_axis(value: f64, spacing: f64) -> f64 {
    if spacing > 0.0 && spacing.is_finite() {
        (value / spacing).round() * spacing
    } else {
        value
    }
}

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuideAxis {
    /// Fixed `y`, spans the canvas width.
    Horizontal,
    /// Fixed `x`, spans the canvas height.
    Vertical,
}

/// A guide line shown while a node is dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentGuide {
    pub axis: GuideAxis,
    /// Start of the line in canvas space.
    pub position: Point,
}

impl AlignmentGuide {
    pub fn horizontal(y: f64) -> Self {
        Self {
            axis: GuideAxis::Horizontal,
            position: Point::new(-GUIDE_LENGTH / 2.0, y),
        }
    }

    pub fn vertical(x: f64) -> Self {
        Self {
            axis: GuideAxis::Vertical,
            position: Point::new(x, -GUIDE_LENGTH / 2.0),
        }
    }

    /// The fixed coordinate: `y` for horizontal guides, `x` for vertical ones.
    pub fn coordinate(&self) -> f64 {
        match self.axis {
            GuideAxis::Horizontal => self.position.y,
            GuideAxis::Vertical => self.position.x,
        }
    }

    /// Line to draw.
    pub fn line(&self) -> Line {
        let end = match self.axis {
            GuideAxis::Horizontal => self.position + Vec2::new(GUIDE_LENGTH, 0.0),
            GuideAxis::Vertical => self.position + Vec2::new(0.0, GUIDE_LENGTH),
        };
        Line::new(self.position, end)
    }
}

/// Current guides; at most one per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AlignmentGuides {
    pub horizontal: Option<AlignmentGuide>,
    pub vertical: Option<AlignmentGuide>,
}

impl AlignmentGuides {
    pub fn is_empty(&self) -> bool {
        self.horizontal.is_none() && self.vertical.is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlignmentGuide> {
        self.horizontal.iter().chain(self.vertical.iter())
    }
}

/// A match on one axis between the dragged node and another node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMatch {
    /// The other node's coordinate the guide is drawn at.
    pub coordinate: f64,
    /// Shift that puts the dragged node exactly on the guide.
    pub offset: f64,
}

/// Matches found for a dragged node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Alignment {
    /// Match on `y`.
    pub horizontal: Option<AxisMatch>,
    /// Match on `x`.
    pub vertical: Option<AxisMatch>,
}

/// Center, start and end of an interval, in match priority order.
fn features(start: f64, extent: f64) -> [f64; 3] {
    [start + extent / 2.0, start, start + extent]
}

fn match_axis(
    dragged: [f64; 3],
    others: impl Iterator<Item = [f64; 3]>,
    tolerance: f64,
) -> Option<AxisMatch> {
    for other in others {
        for (own, theirs) in dragged.iter().zip(other.iter()) {
            if (own - theirs).abs() <= tolerance {
                return Some(AxisMatch {
                    coordinate: *theirs,
                    offset: theirs - own,
                });
            }
        }
    }
    None
}

/// Compare the dragged node against every other node.
///
/// Centers are compared with centers, leading edges with leading edges and
/// trailing edges with trailing edges. The first match in node order wins.
pub fn find_alignment(
    dragged: &NodeGeometry,
    nodes: &[NodeGeometry],
    tolerance: Vec2,
) -> Alignment {
    let bounds = dragged.bounds();

    Alignment {
        horizontal: match_axis(
            features(bounds.y0, bounds.height()),
            other_bounds(&dragged.id, nodes).map(|b| features(b.y0, b.height())),
            tolerance.y,
        ),
        vertical: match_axis(
            features(bounds.x0, bounds.width()),
            other_bounds(&dragged.id, nodes).map(|b| features(b.x0, b.width())),
            tolerance.x,
        ),
    }
}

fn other_bounds<'a>(
    dragged: &'a NodeId,
    nodes: &'a [NodeGeometry],
) -> impl Iterator<Item = Rect> + 'a {
    nodes
        .iter()
        .filter(move |node| &node.id != dragged)
        .map(NodeGeometry::bounds)
}

/// A position reported by the rendering widget for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePositionChange {
    pub id: NodeId,
    pub position: Point,
}

impl NodePositionChange {
    pub fn new(id: impl Into<NodeId>, position: Point) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

/// Tracks one node drag and derives guides and corrected positions.
#[derive(Debug, Clone)]
pub struct AlignmentEngine {
    grid: Vec2,
    tolerance: Vec2,
    mode: SnapMode,
    drag_origin: Option<Point>,
    dragged: Option<NodeId>,
    guides: AlignmentGuides,
}

impl AlignmentEngine {
    pub fn new(config: &Configuration) -> Self {
        Self {
            grid: config.grid(),
            tolerance: config.alignment_tolerance(),
            mode: config.snap_mode,
            drag_origin: None,
            dragged: None,
            guides: AlignmentGuides::default(),
        }
    }

    /// Position of the dragged node when the drag started.
    pub fn drag_origin(&self) -> Option<Point> {
        self.drag_origin
    }

    /// Node currently being dragged.
    pub fn dragged(&self) -> Option<&NodeId> {
        self.dragged.as_ref()
    }

    pub fn guides(&self) -> AlignmentGuides {
        self.guides
    }

    pub fn mode(&self) -> SnapMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SnapMode) {
        self.mode = mode;
    }

    pub fn on_drag_start(&mut self, node: &NodeGeometry) {
        log::debug!("Alignment drag start for {} at {:?}", node.id, node.position);
        self.drag_origin = Some(node.position);
        self.dragged = Some(node.id.clone());
        self.guides = AlignmentGuides::default();
    }

    /// Correct a batch of position changes in place and refresh the guides.
    ///
    /// `nodes` is the geometry before the batch is applied; it supplies the
    /// dragged node's size and the positions of everything else.
    pub fn on_nodes_change(&mut self, changes: &mut [NodePositionChange], nodes: &[NodeGeometry]) {
        for change in changes.iter_mut() {
            if self.mode.snaps_to_grid() {
                change.position = snap_to_grid(change.position, self.grid).point;
            }

            if self.dragged.as_ref() != Some(&change.id) {
                continue;
            }

            let measured = nodes.iter().find(|n| n.id == change.id).and_then(|n| n.measured);
            let dragged = NodeGeometry::new(change.id.clone(), change.position, measured);
            let alignment = find_alignment(&dragged, nodes, self.tolerance);

            self.guides.horizontal = alignment
                .horizontal
                .map(|m| AlignmentGuide::horizontal(m.coordinate));
            self.guides.vertical = alignment
                .vertical
                .map(|m| AlignmentGuide::vertical(m.coordinate));

            if self.mode.snaps_to_guides() {
                let offset = Vec2::new(
                    alignment.vertical.map_or(0.0, |m| m.offset),
                    alignment.horizontal.map_or(0.0, |m| m.offset),
                );
                change.position += offset;
            }
        }
    }

    pub fn on_drag_stop(&mut self, node: &NodeId) {
        if self.dragged.as_ref() != Some(node) {
            log::warn!("Drag stop for {} while dragging {:?}", node, self.dragged);
        }
        self.clear();
    }

    /// Forget any drag; used when the diagram content is replaced.
    pub fn reset(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.drag_origin = None;
        self.dragged = None;
        self.guides = AlignmentGuides::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;

    fn node(id: &str, x: f64, y: f64, w: f64, h: f64) -> NodeGeometry {
        NodeGeometry::new(id, Point::new(x, y), Some(Size::new(w, h)))
    }

    fn engine(mode: SnapMode, tolerance: f64) -> AlignmentEngine {
        AlignmentEngine::new(&Configuration {
            alignment_x_tolerance: tolerance,
            alignment_y_tolerance: tolerance,
            snap_mode: mode,
            ..Configuration::default()
        })
    }

    #[test]
    fn test_snap_to_grid() {
        let result = snap_to_grid(Point::new(117.0, 124.0), Vec2::new(10.0, 10.0));
        assert_eq!(result.point, Point::new(120.0, 120.0));
        assert!(result.snapped_x);
        assert!(result.snapped_y);
    }

    #[test]
    fn test_snap_to_grid_exact() {
        let result = snap_to_grid(Point::new(40.0, 60.0), Vec2::new(20.0, 20.0));
        assert_eq!(result.point, Point::new(40.0, 60.0));
        assert!(!result.is_snapped());
    }

    #[test]
    fn test_snap_to_grid_per_axis() {
        let result = snap_to_grid(Point::new(14.0, 14.0), Vec2::new(10.0, 25.0));
        assert_eq!(result.point, Point::new(10.0, 0.0));
    }

    #[test]
    fn test_snap_to_grid_skips_unusable_spacing() {
        let point = Point::new(17.0, 24.0);
        let result = snap_to_grid(point, Vec2::new(0.0, 10.0));
        assert_eq!(result.point, Point::new(17.0, 20.0));
        assert!(!result.snapped_x);

        let result = snap_to_grid(point, Vec2::new(f64::NAN, -5.0));
        assert_eq!(result.point, point);
        assert!(!result.is_snapped());
    }

    #[test]
    fn test_snap_mode_cycle() {
        assert_eq!(SnapMode::None.next(), SnapMode::Grid);
        assert_eq!(SnapMode::Grid.next(), SnapMode::Guides);
        assert_eq!(SnapMode::Guides.next(), SnapMode::All);
        assert_eq!(SnapMode::All.next(), SnapMode::None);
    }

    #[test]
    fn test_snap_mode_flags() {
        assert!(!SnapMode::None.snaps_to_grid());
        assert!(SnapMode::Grid.snaps_to_grid());
        assert!(!SnapMode::Guides.snaps_to_grid());
        assert!(SnapMode::All.snaps_to_grid());

        assert!(!SnapMode::None.snaps_to_guides());
        assert!(!SnapMode::Grid.snaps_to_guides());
        assert!(SnapMode::Guides.snaps_to_guides());
        assert!(SnapMode::All.snaps_to_guides());
    }

    #[test]
    fn test_guide_lines_span_canvas() {
        let line = AlignmentGuide::horizontal(42.0).line();
        assert_eq!(line.p0.y, 42.0);
        assert_eq!(line.p1.y, 42.0);
        assert!((line.p1.x - line.p0.x - GUIDE_LENGTH).abs() < f64::EPSILON);

        let guide = AlignmentGuide::vertical(7.0);
        assert_eq!(guide.coordinate(), 7.0);
        assert_eq!(guide.line().p1.x, 7.0);
    }

    #[test]
    fn test_find_alignment_centers() {
        // Centers at x=100 and x=103
        let a = node("a", 50.0, 0.0, 100.0, 40.0);
        let b = node("b", 53.0, 300.0, 100.0, 40.0);
        let alignment = find_alignment(&b, &[a.clone(), b.clone()], Vec2::new(3.0, 3.0));

        let vertical = alignment.vertical.unwrap();
        assert_eq!(vertical.coordinate, 100.0);
        assert_eq!(vertical.offset, -3.0);
        assert!(alignment.horizontal.is_none());
    }

    #[test]
    fn test_find_alignment_ignores_self() {
        let a = node("a", 0.0, 0.0, 10.0, 10.0);
        let alignment = find_alignment(&a, &[a.clone()], Vec2::new(50.0, 50.0));
        assert_eq!(alignment, Alignment::default());
    }

    #[test]
    fn test_find_alignment_first_node_wins() {
        let first = node("first", 0.0, 101.0, 10.0, 10.0);
        let second = node("second", 200.0, 100.0, 10.0, 10.0);
        let dragged = node("d", 500.0, 100.0, 10.0, 10.0);
        let alignment = find_alignment(&dragged, &[first, second], Vec2::new(5.0, 5.0));
        // first node's center y is 106, within 5 of 105
        assert_eq!(alignment.horizontal.unwrap().coordinate, 106.0);
    }

    #[test]
    fn test_find_alignment_edges() {
        // Different widths, left edges equal, centers far apart
        let wide = node("wide", 100.0, 0.0, 300.0, 20.0);
        let narrow = node("narrow", 100.0, 500.0, 20.0, 20.0);
        let alignment = find_alignment(&narrow, &[wide], Vec2::new(2.0, 2.0));
        assert_eq!(alignment.vertical.unwrap().coordinate, 100.0);
    }

    #[test]
    fn test_engine_guide_appears_and_clears() {
        let mut engine = engine(SnapMode::None, 3.0);
        let a = node("a", 50.0, 0.0, 100.0, 40.0);
        let b = node("b", 400.0, 300.0, 100.0, 40.0);
        let nodes = vec![a, b.clone()];

        engine.on_drag_start(&b);
        assert_eq!(engine.drag_origin(), Some(Point::new(400.0, 300.0)));
        assert!(engine.guides().is_empty());

        // Center at x=103
        let mut changes = vec![NodePositionChange::new("b", Point::new(53.0, 300.0))];
        engine.on_nodes_change(&mut changes, &nodes);
        assert_eq!(engine.guides().vertical.unwrap().coordinate(), 100.0);
        // Snapping is off, position is untouched
        assert_eq!(changes[0].position, Point::new(53.0, 300.0));

        // Center at x=200
        let mut changes = vec![NodePositionChange::new("b", Point::new(150.0, 300.0))];
        engine.on_nodes_change(&mut changes, &nodes);
        assert!(engine.guides().vertical.is_none());
    }

    #[test]
    fn test_engine_snaps_onto_guide() {
        let mut engine = engine(SnapMode::Guides, 3.0);
        let a = node("a", 50.0, 0.0, 100.0, 40.0);
        let b = node("b", 400.0, 300.0, 100.0, 40.0);
        let nodes = vec![a, b.clone()];

        engine.on_drag_start(&b);
        let mut changes = vec![NodePositionChange::new("b", Point::new(53.0, 300.0))];
        engine.on_nodes_change(&mut changes, &nodes);
        assert_eq!(changes[0].position, Point::new(50.0, 300.0));
    }

    #[test]
    fn test_engine_grid_then_guides() {
        let mut engine = engine(SnapMode::All, 20.0);
        let a = node("a", 0.0, 0.0, 100.0, 40.0);
        let b = node("b", 400.0, 400.0, 100.0, 40.0);
        let nodes = vec![a, b.clone()];

        engine.on_drag_start(&b);
        // (117, 124) lands on (120, 120), too far from `a` on both axes
        let mut changes = vec![NodePositionChange::new("b", Point::new(117.0, 124.0))];
        engine.on_nodes_change(&mut changes, &nodes);
        assert_eq!(changes[0].position, Point::new(120.0, 120.0));
        assert!(engine.guides().is_empty());

        // (12, 9) lands on (10, 10); both centers are 10 away from `a`'s
        let mut changes = vec![NodePositionChange::new("b", Point::new(12.0, 9.0))];
        engine.on_nodes_change(&mut changes, &nodes);
        assert_eq!(changes[0].position, Point::new(0.0, 0.0));
        assert_eq!(engine.guides().vertical.unwrap().coordinate(), 50.0);
        assert_eq!(engine.guides().horizontal.unwrap().coordinate(), 20.0);
    }

    #[test]
    fn test_engine_only_grid_snaps_other_nodes() {
        let mut engine = engine(SnapMode::All, 20.0);
        let a = node("a", 0.0, 0.0, 100.0, 40.0);
        let b = node("b", 400.0, 400.0, 100.0, 40.0);
        let nodes = vec![a.clone(), b];

        engine.on_drag_start(&a);
        let mut changes = vec![NodePositionChange::new("b", Point::new(13.0, 4.0))];
        engine.on_nodes_change(&mut changes, &nodes);
        assert_eq!(changes[0].position, Point::new(10.0, 0.0));
        assert!(engine.guides().is_empty());
    }

    #[test]
    fn test_engine_drag_stop_and_reset_clear() {
        let mut engine = engine(SnapMode::None, 3.0);
        let a = node("a", 50.0, 0.0, 100.0, 40.0);
        let b = node("b", 53.0, 0.0, 100.0, 40.0);
        let nodes = vec![a, b.clone()];

        engine.on_drag_start(&b);
        let mut changes = vec![NodePositionChange::new("b", b.position)];
        engine.on_nodes_change(&mut changes, &nodes);
        assert!(!engine.guides().is_empty());

        engine.on_drag_stop(&"b".into());
        assert!(engine.guides().is_empty());
        assert!(engine.drag_origin().is_none());

        engine.on_drag_start(&b);
        engine.on_nodes_change(&mut changes, &nodes);
        engine.reset();
        assert!(engine.guides().is_empty());
        assert!(engine.dragged().is_none());
    }
}
