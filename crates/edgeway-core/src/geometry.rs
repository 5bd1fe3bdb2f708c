//! Geometry primitives shared by the path builder and the alignment engine.

use kurbo::{Point, Rect, Size};

use crate::diagram::NodeId;

/// Geometry of a node as reported by the rendering widget.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGeometry {
    /// Node identifier.
    pub id: NodeId,
    /// Top-left corner in canvas space.
    pub position: Point,
    /// Measured size; `None` until the first layout pass.
    pub measured: Option<Size>,
}

impl NodeGeometry {
    /// Create geometry for a node.
    pub fn new(id: impl Into<NodeId>, position: Point, measured: Option<Size>) -> Self {
        Self {
            id: id.into(),
            position,
            measured,
        }
    }

    /// Measured size, or zero when the node has not been laid out yet.
    pub fn size(&self) -> Size {
        self.measured.unwrap_or(Size::ZERO)
    }

    /// Bounding box in canvas space.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size())
    }

    /// Same geometry, placed at another position.
    pub fn with_position(&self, position: Point) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }
}

/// Center of a node. Unmeasured nodes count as zero-sized.
pub fn find_node_center(node: &NodeGeometry) -> Point {
    let size = node.size();
    Point::new(
        node.position.x + size.width / 2.0,
        node.position.y + size.height / 2.0,
    )
}

/// Midpoint of the segment between `a` and `b`.
pub fn find_line_center(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// A new list with the item at `index` replaced.
/// An out-of-range index yields an unchanged copy.
pub fn replace_at<T: Clone>(items: &[T], index: usize, value: T) -> Vec<T> {
    let mut result = items.to_vec();
    if let Some(slot) = result.get_mut(index) {
        *slot = value;
    }
    result
}

/// A new list with `value` inserted at `index` (clamped to the length).
pub fn insert_at<T: Clone>(items: &[T], index: usize, value: T) -> Vec<T> {
    let index = index.min(items.len());
    let mut result = Vec::with_capacity(items.len() + 1);
    result.extend_from_slice(&items[..index]);
    result.push(value);
    result.extend_from_slice(&items[index..]);
    result
}
