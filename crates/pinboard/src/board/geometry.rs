use serde::{Deserialize, Serialize};

/// Smallest zoom factor reachable by zoom gestures.
pub const MIN_SCALE: f64 = 0.2;
/// Largest zoom factor reachable by zoom gestures.
pub const MAX_SCALE: f64 = 1.0;
/// Scale change per toolbar click or `Alt` +/- key press.
pub const ZOOM_STEP: f64 = 0.1;
/// Scale change per unit of wheel delta while `Alt` is held.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.001;

/// A point in either screen or world space. Which one is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn minus(self, other: Point) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(self, other: Point) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle, top-left anchored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_center(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn max(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// World-to-screen transform: `screen = world * scale + (x, y)`.
///
/// Zoom only ever touches `scale`, so the screen origin stays pinned to the same world
/// point while zooming. Cursor-anchored zoom is deliberately not implemented.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 0.5,
        }
    }
}

pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_finite() {
        scale.clamp(MIN_SCALE, MAX_SCALE)
    } else {
        MIN_SCALE
    }
}

impl Viewport {
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    /// Repair a viewport read from storage: non-finite offsets collapse to the origin and
    /// the scale is pulled into `[MIN_SCALE, MAX_SCALE]`.
    pub fn sanitized(self) -> Self {
        let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            x: finite_or_zero(self.x),
            y: finite_or_zero(self.y),
            scale: clamp_scale(self.scale),
        }
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.x) / self.scale,
            (screen.y - self.y) / self.scale,
        )
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(world.x * self.scale + self.x, world.y * self.scale + self.y)
    }

    /// World-space rectangle currently visible on a canvas of the given screen size.
    pub fn visible_world_rect(&self, canvas: Size) -> Rect {
        let min = self.screen_to_world(Point::ZERO);
        Rect::new(
            min.x,
            min.y,
            canvas.width / self.scale,
            canvas.height / self.scale,
        )
    }

    /// World point under the center of the canvas.
    pub fn view_center(&self, canvas: Size) -> Point {
        self.screen_to_world(Point::new(canvas.width / 2.0, canvas.height / 2.0))
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.scale = clamp_scale(self.scale + delta);
    }

    /// `Alt`+`0` and the toolbar reset button: back to 100%, offsets untouched.
    pub fn reset_zoom(&mut self) {
        self.scale = 1.0;
    }

    /// Viewport at the current scale that puts `world` in the middle of the canvas.
    pub fn centered_on(&self, world: Point, canvas: Size) -> Viewport {
        Viewport {
            x: canvas.width / 2.0 - world.x * self.scale,
            y: canvas.height / 2.0 - world.y * self.scale,
            scale: self.scale,
        }
    }
}
