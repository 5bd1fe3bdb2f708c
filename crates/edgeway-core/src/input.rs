//! Pointer events delivered by the canvas surface.

use kurbo::Point;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event, positions in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
    /// The pointer left the canvas surface.
    Leave,
}

impl PointerEvent {
    /// Screen position, if the event carries one.
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position } => Some(*position),
            PointerEvent::Leave => None,
        }
    }

    pub fn is_primary_down(&self) -> bool {
        matches!(self, PointerEvent::Down { button: MouseButton::Left, .. })
    }
}
