//! Vertex format shared by every pipeline in this crate.
//!
//! All draws are quads sampling a texture, so a vertex only needs its
//! clip-space position, a UV, and a colour to tint with.

use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use crate::color::{Color, ColourInfo};
use crate::geometry::{Quad, Rect, Vector2};

/// Vertex with pre-computed NDC position, UV coordinates, and colour.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TexturedVertex {
    /// Position in NDC (pre-computed on CPU)
    pub position: [f32; 2],
    /// Texture coordinates
    pub uv: [f32; 2],
    /// Linear RGBA multiplied into the sampled texel
    pub color: [f32; 4],
}

impl TexturedVertex {
    pub fn desc() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<TexturedVertex>() as u64,
            step_mode: VertexStepMode::Vertex,
            attributes: &[
                // position (NDC)
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x2,
                },
                // uv
                VertexAttribute {
                    offset: 8,
                    shader_location: 1,
                    format: VertexFormat::Float32x2,
                },
                // color
                VertexAttribute {
                    offset: 16,
                    shader_location: 2,
                    format: VertexFormat::Float32x4,
                },
            ],
        }
    }

    /// Four vertices for `quad`, laid out as top-left, top-right, bottom-left, bottom-right.
    ///
    /// `viewport` is the screen-space area the bound target covers.
    pub fn from_quad(quad: &Quad, viewport: Rect, colour: &ColourInfo) -> [TexturedVertex; 4] {
        let corner = |p: Vector2, u: f32, v: f32, color: Color| TexturedVertex {
            position: to_ndc(p.x, p.y, viewport),
            uv: [u, v],
            color: color.to_array(),
        };

        [
            corner(quad.top_left, 0.0, 0.0, colour.top_left),
            corner(quad.top_right, 1.0, 0.0, colour.top_right),
            corner(quad.bottom_left, 0.0, 1.0, colour.bottom_left),
            corner(quad.bottom_right, 1.0, 1.0, colour.bottom_right),
        ]
    }
}

/// Index order matching [`TexturedVertex::from_quad`].
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 1, 3, 2];

/// Convert screen coordinates to NDC relative to `viewport`.
#[inline]
pub fn to_ndc(x: f32, y: f32, viewport: Rect) -> [f32; 2] {
    [
        ((x - viewport.x) / viewport.width) * 2.0 - 1.0,
        1.0 - ((y - viewport.y) / viewport.height) * 2.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_ndc_corners() {
        let viewport = Rect::new(100.0, 50.0, 200.0, 100.0);
        assert_eq!(to_ndc(100.0, 50.0, viewport), [-1.0, 1.0]);
        assert_eq!(to_ndc(300.0, 150.0, viewport), [1.0, -1.0]);
        assert_eq!(to_ndc(200.0, 100.0, viewport), [0.0, 0.0]);
    }

    #[test]
    fn test_quad_covers_viewport() {
        let viewport = Rect::new(0.0, 0.0, 64.0, 32.0);
        let quad = TexturedVertex::from_quad(
            &Quad::from_rect(viewport),
            viewport,
            &ColourInfo::solid(Color::WHITE),
        );
        assert_eq!(quad[0].position, [-1.0, 1.0]);
        assert_eq!(quad[3].position, [1.0, -1.0]);
        assert_eq!(quad[3].uv, [1.0, 1.0]);
    }

    #[test]
    fn test_gradient_colours_follow_corners() {
        let viewport = Rect::new(0.0, 0.0, 100.0, 100.0);
        let colour = ColourInfo::gradient(crate::color::LinearGradient::vertical(
            Color::WHITE,
            Color::BLACK,
        ));
        let quad = TexturedVertex::from_quad(
            &Quad::from_rect(Rect::new(10.0, 20.0, 30.0, 40.0)),
            viewport,
            &colour,
        );
        assert_eq!(quad[1].color, Color::WHITE.to_array());
        assert_eq!(quad[2].color, Color::BLACK.to_array());
    }

    #[test]
    fn test_vertex_stride() {
        assert_eq!(std::mem::size_of::<TexturedVertex>(), 32);
    }
}
