//! Axis-Aligned Rectangle
//!
//! The only geometry the simulation needs: screen-space rectangles and the
//! AABB overlap predicate used by the collision resolver.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen coordinates.
///
/// `x`/`y` is the top-left corner; `width`/`height` extend right and down.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width (non-negative for meaningful overlap tests)
    pub width: f32,
    /// Height (non-negative for meaningful overlap tests)
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from its top-left corner and size.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle for a sprite anchored at bottom-center (the convention for
    /// every entity in this game: `x` is the horizontal center, `y` the feet).
    #[inline]
    pub fn from_anchor_bottom(center_x: f32, bottom_y: f32, width: f32, height: f32) -> Self {
        Self {
            x: center_x - width / 2.0,
            y: bottom_y - height,
            width,
            height,
        }
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Strict AABB overlap test.
    ///
    /// Two rectangles intersect iff each starts before the other ends on
    /// both axes. Edge-touching rectangles do NOT intersect (strict
    /// inequalities), so a degenerate zero-size rectangle never matches —
    /// the registry hands those out for entities that are not collidable.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}
