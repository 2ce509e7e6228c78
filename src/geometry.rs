//! Screen-space geometry used to size the outline's render targets.
//!
//! The outline renders outside its element's natural bounds, so everything
//! here revolves around one question: how much larger than the element does
//! the drawn quad (and therefore the framebuffer) have to be?

use crate::jump_flood;
use crate::transform::Transform;

/// Tolerance used when deciding whether a screen-space size actually changed.
pub const SIZE_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2::new(0.0, 0.0);
    pub const ONE: Vector2 = Vector2::new(1.0, 1.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise comparison within [`SIZE_EPSILON`].
    pub fn almost_equals(&self, other: Vector2) -> bool {
        (self.x - other.x).abs() <= SIZE_EPSILON && (self.y - other.y).abs() <= SIZE_EPSILON
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> Vector2 {
        Vector2::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Grow the rectangle by `amount` on every side.
    pub fn inflate(&self, amount: f32) -> Self {
        Self {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + amount * 2.0,
            height: self.height + amount * 2.0,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Four arbitrary corners, typically a local rectangle pushed through a draw matrix.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Quad {
    pub top_left: Vector2,
    pub top_right: Vector2,
    pub bottom_left: Vector2,
    pub bottom_right: Vector2,
}

impl Quad {
    pub fn from_rect(rect: Rect) -> Self {
        Self::from_rect_transformed(rect, &Transform::IDENTITY)
    }

    pub fn from_rect_transformed(rect: Rect, transform: &Transform) -> Self {
        let map = |x: f32, y: f32| {
            let (tx, ty) = transform.transform_point(x, y);
            Vector2::new(tx, ty)
        };

        Self {
            top_left: map(rect.x, rect.y),
            top_right: map(rect.right(), rect.y),
            bottom_left: map(rect.x, rect.bottom()),
            bottom_right: map(rect.right(), rect.bottom()),
        }
    }

    fn corners(&self) -> [Vector2; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// Axis-aligned bounding box of the four corners.
    pub fn aabb(&self) -> Rect {
        let corners = self.corners();
        let min_x = corners.iter().map(|c| c.x).fold(f32::INFINITY, f32::min);
        let min_y = corners.iter().map(|c| c.y).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|c| c.x).fold(f32::NEG_INFINITY, f32::max);
        let max_y = corners.iter().map(|c| c.y).fold(f32::NEG_INFINITY, f32::max);

        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Round up to the next power of two. Zero stays zero.
pub fn next_power_of_two(value: u32) -> u32 {
    if value == 0 {
        0
    } else {
        value.next_power_of_two()
    }
}

/// How far the drawn quad is grown past the element's bounds for a given width.
///
/// Rounding to a power of two keeps the quad from jittering while the width
/// is dragged around interactively. The amount always equals the jump-flood
/// start size, so the flood never reaches past the inflated region.
pub fn inflate_amount(outline_width: f32, draw_matrix: &Transform) -> f32 {
    let width = jump_flood::clamped_width(outline_width, draw_matrix);
    jump_flood::start_size(width) as f32
}

/// Divide the draw matrix's scale out of a screen-space size.
pub fn scale_normalized_size(size: Vector2, draw_matrix: &Transform) -> Vector2 {
    let (sx, sy) = draw_matrix.inverse().extract_scale();
    Vector2::new(size.x * sx, size.y * sy)
}

/// Pixel dimensions of a framebuffer covering `rect` at the given scale.
pub fn frame_buffer_size(rect: Rect, scale: Vector2) -> (u32, u32) {
    let width = (rect.width * scale.x).ceil().max(1.0) as u32;
    let height = (rect.height * scale.y).ceil().max(1.0) as u32;
    (width, height)
}
