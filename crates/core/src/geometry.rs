use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WorldPoint {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub plane: i32,
}

impl WorldPoint {
    pub fn new(x: i32, y: i32, plane: i32) -> Self {
        Self { x, y, plane }
    }

    /// Tile distance on the same plane, saturating at `i32::MAX`. Other
    /// planes are unreachable.
    pub fn manhattan_to(&self, other: &WorldPoint) -> Option<i32> {
        if self.plane != other.plane {
            return None;
        }
        let dx = (i64::from(self.x) - i64::from(other.x)).abs();
        let dy = (i64::from(self.y) - i64::from(other.y)).abs();
        Some(i32::try_from(dx + dy).unwrap_or(i32::MAX))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset_by(self, offset: ScreenPoint) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint {
            x: self.x + self.width / 2,
            y: self.y + self.height / 2,
        }
    }
}

/// Drawable game area, in canvas-relative pixels, and where it sits on screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Canvas {
    #[serde(default)]
    pub offset: ScreenPoint,
    pub width: i32,
    pub height: i32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            offset: ScreenPoint::default(),
            width: 765,
            height: 503,
        }
    }
}

impl Canvas {
    pub fn contains_point(&self, point: ScreenPoint, margin: i32) -> bool {
        point.x > margin
            && point.y > margin
            && point.x < self.width - margin
            && point.y < self.height - margin
    }

    /// Non-degenerate and strictly inside the canvas inset by `margin`.
    pub fn contains_rect(&self, rect: &Rect, margin: i32) -> bool {
        !rect.is_degenerate()
            && rect.x > margin
            && rect.y > margin
            && i64::from(rect.x) + i64::from(rect.width) < i64::from(self.width - margin)
            && i64::from(rect.y) + i64::from(rect.height) < i64::from(self.height - margin)
    }
}
