//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Size, Vec2};

/// Zoom used when centering the view on a node.
pub const FOCUS_ZOOM: f64 = 1.85;

/// Converts pointer positions from screen pixels to canvas space.
pub trait ScreenToCanvas {
    fn screen_to_canvas(&self, screen_point: Point) -> Point;
}

/// Visible part of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportDimensions {
    /// Top-left corner in canvas space.
    pub position: Point,
    /// Width in canvas units.
    pub width: f64,
    /// Height in canvas units.
    pub height: f64,
}

/// Camera manages the view transform for the canvas.
///
/// A canvas point `p` appears on screen at `offset + p * zoom`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    /// Current zoom level.
    pub zoom: f64,
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 4.0,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform from canvas to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Transform from screen to canvas coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a canvas point to screen coordinates.
    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// Zoom the camera, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let canvas_point = self.screen_to_canvas(screen_point);
        self.zoom = new_zoom;

        // Keep canvas_point under screen_point
        let new_screen = self.canvas_to_screen(canvas_point);
        self.offset += screen_point - new_screen;
    }

    /// Center the view on a canvas point at the given zoom.
    pub fn center_on(&mut self, canvas_point: Point, zoom: f64, viewport: Size) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.offset = Vec2::new(
            viewport.width / 2.0 - canvas_point.x * self.zoom,
            viewport.height / 2.0 - canvas_point.y * self.zoom,
        );
    }

    /// The visible canvas area for a viewport of the given screen size.
    pub fn viewport(&self, viewport: Size) -> ViewportDimensions {
        let scale = 1.0 / self.zoom;
        ViewportDimensions {
            position: Point::new(-self.offset.x * scale, -self.offset.y * scale),
            width: viewport.width * scale,
            height: viewport.height * scale,
        }
    }
}

impl ScreenToCanvas for Camera {
    fn screen_to_canvas(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }
}
