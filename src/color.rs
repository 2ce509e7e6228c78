//! Colours and per-corner colour information.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const LIGHT_CORAL: Color = Color::from_hex(0xF08080);

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }

    fn lerp(self, other: Color, t: f32) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

/// Gradient direction for linear gradients
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientDirection {
    /// Left to right
    Horizontal,
    /// Top to bottom
    Vertical,
    /// Top-left to bottom-right
    Diagonal,
    /// Top-right to bottom-left
    DiagonalReverse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGradient {
    pub start_color: Color,
    pub end_color: Color,
    pub direction: GradientDirection,
}

impl LinearGradient {
    pub fn new(start: Color, end: Color, direction: GradientDirection) -> Self {
        Self {
            start_color: start,
            end_color: end,
            direction,
        }
    }

    pub fn horizontal(start: Color, end: Color) -> Self {
        Self::new(start, end, GradientDirection::Horizontal)
    }

    pub fn vertical(start: Color, end: Color) -> Self {
        Self::new(start, end, GradientDirection::Vertical)
    }
}

/// Colour of a quad, one value per corner.
///
/// Solid colours set all four corners alike; gradients are baked into the
/// corners and interpolated across the quad by the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColourInfo {
    pub top_left: Color,
    pub top_right: Color,
    pub bottom_left: Color,
    pub bottom_right: Color,
}

impl ColourInfo {
    pub fn solid(colour: Color) -> Self {
        Self {
            top_left: colour,
            top_right: colour,
            bottom_left: colour,
            bottom_right: colour,
        }
    }

    pub fn gradient(gradient: LinearGradient) -> Self {
        let start = gradient.start_color;
        let end = gradient.end_color;
        let mid = start.lerp(end, 0.5);

        match gradient.direction {
            GradientDirection::Horizontal => Self {
                top_left: start,
                top_right: end,
                bottom_left: start,
                bottom_right: end,
            },
            GradientDirection::Vertical => Self {
                top_left: start,
                top_right: start,
                bottom_left: end,
                bottom_right: end,
            },
            GradientDirection::Diagonal => Self {
                top_left: start,
                top_right: mid,
                bottom_left: mid,
                bottom_right: end,
            },
            GradientDirection::DiagonalReverse => Self {
                top_left: mid,
                top_right: start,
                bottom_left: end,
                bottom_right: mid,
            },
        }
    }

    pub fn has_single_colour(&self) -> bool {
        self.top_left == self.top_right
            && self.top_left == self.bottom_left
            && self.top_left == self.bottom_right
    }

    /// Multiply every corner by `tint`.
    pub fn tinted(&self, tint: Color) -> Self {
        let mul = |c: Color| Color::rgba(c.r * tint.r, c.g * tint.g, c.b * tint.b, c.a * tint.a);
        Self {
            top_left: mul(self.top_left),
            top_right: mul(self.top_right),
            bottom_left: mul(self.bottom_left),
            bottom_right: mul(self.bottom_right),
        }
    }
}

impl Default for ColourInfo {
    fn default() -> Self {
        Self::solid(Color::WHITE)
    }
}

impl From<Color> for ColourInfo {
    fn from(colour: Color) -> Self {
        Self::solid(colour)
    }
}

impl From<LinearGradient> for ColourInfo {
    fn from(gradient: LinearGradient) -> Self {
        Self::gradient(gradient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        let c = Color::from_hex(0xFF8000);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn test_solid_is_single_colour() {
        assert!(ColourInfo::solid(Color::LIGHT_CORAL).has_single_colour());
        assert!(!ColourInfo::gradient(LinearGradient::vertical(Color::WHITE, Color::BLACK))
            .has_single_colour());
    }

    #[test]
    fn test_horizontal_gradient_corners() {
        let info = ColourInfo::gradient(LinearGradient::horizontal(Color::WHITE, Color::BLACK));
        assert_eq!(info.top_left, Color::WHITE);
        assert_eq!(info.bottom_left, Color::WHITE);
        assert_eq!(info.top_right, Color::BLACK);
        assert_eq!(info.bottom_right, Color::BLACK);
    }

    #[test]
    fn test_value_equality() {
        let a: ColourInfo = Color::rgb(0.2, 0.4, 0.6).into();
        let b: ColourInfo = Color::rgb(0.2, 0.4, 0.6).into();
        assert_eq!(a, b);
    }
}
