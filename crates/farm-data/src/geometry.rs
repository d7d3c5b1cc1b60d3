use serde::{Deserialize, Serialize};

/// Absolute screen position in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

impl Coordinates {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return a new point shifted by (dx, dy)
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Pixel rectangle on screen (region of interest).
/// Stored as left/top/width/height, matching the profile file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Top-left corner
    pub fn origin(&self) -> Coordinates {
        Coordinates::new(self.left, self.top)
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, point: Coordinates) -> bool {
        self.left <= point.x
            && point.x < self.left + self.width
            && self.top <= point.y
            && point.y < self.top + self.height
    }

    /// Translate a point expressed relative to this region into screen space
    pub fn local_to_global(&self, local: Coordinates) -> Coordinates {
        local.offset(self.left, self.top)
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}x{}]",
            self.left, self.top, self.width, self.height
        )
    }
}
