//! Axis-aligned geometry used by the spatial trigger checks.
//!
//! Positions are the top-left corner of a box in world units, with `y`
//! growing downwards as on a tile map. Only what the evaluator needs lives
//! here: overlap and center distance.

use serde::{Deserialize, Serialize};

/// A point or offset in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An axis-aligned bounding box: position plus size.
///
/// ```
/// use world_events::core::Bounds;
///
/// let trap = Bounds::new(150.0, 100.0, 32.0, 32.0);
/// let player = Bounds::new(160.0, 110.0, 32.0, 32.0);
///
/// assert!(trap.overlaps(&player));
/// assert!(!trap.overlaps(&Bounds::new(0.0, 0.0, 32.0, 32.0)));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Top-left corner.
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    /// Create a box at `(x, y)` with the given size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            width,
            height,
        }
    }

    #[must_use]
    pub fn min_x(&self) -> f32 {
        self.position.x
    }

    #[must_use]
    pub fn max_x(&self) -> f32 {
        self.position.x + self.width
    }

    #[must_use]
    pub fn min_y(&self) -> f32 {
        self.position.y
    }

    #[must_use]
    pub fn max_y(&self) -> f32 {
        self.position.y + self.height
    }

    /// Center point of the box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.position.x + self.width / 2.0,
            self.position.y + self.height / 2.0,
        )
    }

    /// Strict overlap on both axes. Boxes that only share an edge do not touch.
    #[must_use]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min_x() < other.max_x()
            && self.max_x() > other.min_x()
            && self.min_y() < other.max_y()
            && self.max_y() > other.min_y()
    }

    /// Distance between the two box centers.
    #[must_use]
    pub fn center_distance(&self, other: &Bounds) -> f32 {
        self.center().distance(other.center())
    }

    /// Move the box so its top-left corner sits at `(x, y)`.
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }
}
