//! Geometry shared by the panel surface, the monitors and the overlap detector.

/// Axis aligned rectangle in stage coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Resting geometry of the panel, stored as corner coordinates.
///
/// This is the rectangle the panel slides back to when shown, and the
/// region handed to the overlap detector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StaticBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl StaticBox {
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            x1: rect.x,
            y1: rect.y,
            x2: rect.x + rect.width,
            y2: rect.y + rect.height,
        }
    }

    /// Whether `y` lies in the horizontal band the panel occupies when it
    /// is `panel_height` tall.
    pub fn band_contains(&self, y: f64, panel_height: f64) -> bool {
        y >= self.y1 && y < self.y1 + panel_height
    }
}

/// A monitor as reported by the host layout
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Monitor {
    pub geometry: Rect,
    pub in_fullscreen: bool,
}
