use serde::{Deserialize, Serialize};

use crate::geometry::Point;

const MIN_ZOOM: f32 = 0.01;

/// Maps pointer positions from screen space into model space.
pub trait CoordinateTransform {
    fn screen_to_model(&self, screen: Point) -> Point;
}

/// Pan/zoom state of the diagram view: `screen = model * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub pan_x: f32,
    pub pan_y: f32,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(pan_x: f32, pan_y: f32, zoom: f32) -> Self {
        Self { pan_x, pan_y, zoom }
    }

    fn effective_zoom(&self) -> f32 {
        if self.zoom.is_finite() {
            self.zoom.max(MIN_ZOOM)
        } else {
            1.0
        }
    }

    pub fn model_to_screen(&self, model: Point) -> Point {
        let zoom = self.effective_zoom();
        Point::new(model.x * zoom + self.pan_x, model.y * zoom + self.pan_y)
    }

    /// Zooms by `factor` keeping the model point under `screen` fixed.
    pub fn zoom_at(&mut self, screen: Point, factor: f32) {
        let anchor = self.screen_to_model(screen);
        self.zoom = (self.effective_zoom() * factor).max(MIN_ZOOM);
        self.pan_x = screen.x - anchor.x * self.zoom;
        self.pan_y = screen.y - anchor.y * self.zoom;
    }
}

impl CoordinateTransform for Viewport {
    fn screen_to_model(&self, screen: Point) -> Point {
        let zoom = self.effective_zoom();
        Point::new((screen.x - self.pan_x) / zoom, (screen.y - self.pan_y) / zoom)
    }
}

impl<F> CoordinateTransform for F
where
    F: Fn(Point) -> Point,
{
    fn screen_to_model(&self, screen: Point) -> Point {
        self(screen)
    }
}
