//! Edge path construction through user-placed waypoints.
//!
//! A path is derived on every render from the current node geometry and the
//! stored waypoints: `[center(source), ...waypoints, center(target)]`.
//! Anchors are node centers; the line is not clipped to node borders.

use kurbo::{BezPath, Point};

use crate::geometry::{NodeGeometry, find_line_center, find_node_center};

/// Handle radius for an existing waypoint, in screen pixels.
pub const WAYPOINT_HANDLE_RADIUS: f64 = 12.0;
/// Handle radius for a candidate midpoint, in screen pixels.
pub const CANDIDATE_HANDLE_RADIUS: f64 = 8.0;

/// Polyline of an edge, from the source anchor to the target anchor.
///
/// Always holds at least two points.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePath {
    points: Vec<Point>,
}

/// A draggable handle on an existing waypoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaypointHandle {
    /// Index into the edge's stored waypoint list.
    pub index: usize,
    /// Position in canvas space.
    pub position: Point,
}

/// An "insert waypoint here" affordance between two consecutive path points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Stored waypoint index a new point is inserted at.
    pub index: usize,
    /// Position in canvas space.
    pub position: Point,
}

impl EdgePath {
    /// Build the path for an edge between two nodes.
    pub fn build(source: &NodeGeometry, target: &NodeGeometry, waypoints: &[Point]) -> Self {
        Self::from_anchors(find_node_center(source), waypoints, find_node_center(target))
    }

    /// Build the path from already resolved anchors.
    pub fn from_anchors(source: Point, waypoints: &[Point], target: Point) -> Self {
        let mut points = Vec::with_capacity(waypoints.len() + 2);
        points.push(source);
        points.extend_from_slice(waypoints);
        points.push(target);
        Self { points }
    }

    /// All path points in traversal order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points, anchors included.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// A path is never empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn source(&self) -> Point {
        self.points[0]
    }

    pub fn target(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Interior points, i.e. the stored waypoints.
    pub fn waypoints(&self) -> &[Point] {
        &self.points[1..self.points.len() - 1]
    }

    /// Where the edge label is placed.
    ///
    /// A single segment uses its midpoint. Longer paths use the segment
    /// starting at `len / 2`, which leans towards the target half.
    pub fn label_position(&self) -> Point {
        let points = &self.points;
        if points.len() == 2 {
            return find_line_center(points[0], points[1]);
        }
        let index = points.len() / 2;
        find_line_center(points[index], points[index + 1])
    }

    /// SVG path data: `M x,y` then `L x,y` for every following point.
    pub fn svg_path_data(&self) -> String {
        self.points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let command = if i == 0 { "M" } else { "L" };
                format!("{} {},{}", command, point.x, point.y)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The same polyline as a kurbo path.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.points[0]);
        for &point in &self.points[1..] {
            path.line_to(point);
        }
        path
    }

    /// Handles for the interior waypoints. Empty for a two-point path.
    pub fn waypoint_handles(&self) -> Vec<WaypointHandle> {
        self.waypoints()
            .iter()
            .enumerate()
            .map(|(index, &position)| WaypointHandle { index, position })
            .collect()
    }

    /// One candidate midpoint per segment.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.points
            .windows(2)
            .enumerate()
            .map(|(index, pair)| Candidate {
                index,
                position: find_line_center(pair[0], pair[1]),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;

    fn node(id: &str, x: f64, y: f64) -> NodeGeometry {
        NodeGeometry::new(id, Point::new(x, y), Some(Size::new(100.0, 40.0)))
    }

    #[test]
    fn test_path_has_anchors_and_waypoints() {
        let a = node("a", 110.0, 160.0);
        let b = node("b", 510.0, 160.0);
        let waypoints = [
            Point::new(360.0, 170.0),
            Point::new(360.0, 60.0),
            Point::new(810.0, 60.0),
        ];
        let path = EdgePath::build(&a, &b, &waypoints);

        assert_eq!(path.len(), waypoints.len() + 2);
        assert_eq!(path.source(), find_node_center(&a));
        assert_eq!(path.target(), find_node_center(&b));
        assert_eq!(path.waypoints(), &waypoints);
    }

    #[test]
    fn test_label_two_points() {
        let path = EdgePath::from_anchors(Point::new(0.0, 0.0), &[], Point::new(10.0, 20.0));
        assert_eq!(path.label_position(), Point::new(5.0, 10.0));
    }

    #[test]
    fn test_label_odd_length_uses_later_segment() {
        // len 5 -> segment 2..3
        let path = EdgePath::from_anchors(
            Point::new(0.0, 0.0),
            &[Point::new(10.0, 0.0), Point::new(20.0, 0.0), Point::new(30.0, 0.0)],
            Point::new(40.0, 0.0),
        );
        assert_eq!(path.label_position(), Point::new(25.0, 0.0));
    }

    #[test]
    fn test_label_even_length() {
        // len 4 -> segment 2..3
        let path = EdgePath::from_anchors(
            Point::new(0.0, 0.0),
            &[Point::new(10.0, 0.0), Point::new(20.0, 0.0)],
            Point::new(30.0, 0.0),
        );
        assert_eq!(path.label_position(), Point::new(25.0, 0.0));
    }

    #[test]
    fn test_label_three_points() {
        // len 3 -> segment 1..2
        let path = EdgePath::from_anchors(
            Point::new(0.0, 0.0),
            &[Point::new(10.0, 10.0)],
            Point::new(20.0, 0.0),
        );
        assert_eq!(path.label_position(), Point::new(15.0, 5.0));
    }

    #[test]
    fn test_svg_path_data() {
        let path = EdgePath::from_anchors(
            Point::new(1.0, 2.0),
            &[Point::new(3.5, 4.0)],
            Point::new(5.0, 6.0),
        );
        assert_eq!(path.svg_path_data(), "M 1,2 L 3.5,4 L 5,6");
    }

    #[test]
    fn test_bez_path_matches_points() {
        let path = EdgePath::from_anchors(
            Point::new(0.0, 0.0),
            &[Point::new(5.0, 5.0)],
            Point::new(10.0, 0.0),
        );
        let bez = path.to_bez_path();
        assert_eq!(bez.elements().len(), 3);
    }

    #[test]
    fn test_two_point_path_has_one_candidate_no_handles() {
        let a = node("a", 0.0, 0.0);
        let b = node("b", 200.0, 100.0);
        let path = EdgePath::build(&a, &b, &[]);

        assert!(path.waypoint_handles().is_empty());
        let candidates = path.candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].index, 0);
        assert_eq!(
            candidates[0].position,
            find_line_center(find_node_center(&a), find_node_center(&b))
        );
    }

    #[test]
    fn test_handles_index_stored_waypoints() {
        let path = EdgePath::from_anchors(
            Point::new(0.0, 0.0),
            &[Point::new(1.0, 1.0), Point::new(2.0, 2.0)],
            Point::new(3.0, 3.0),
        );
        let handles = path.waypoint_handles();
        assert_eq!(handles.len(), 2);
        assert_eq!(handles[1].index, 1);
        assert_eq!(handles[1].position, Point::new(2.0, 2.0));
        assert_eq!(path.candidates().len(), 3);
    }
}
