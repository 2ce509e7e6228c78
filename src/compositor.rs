//! Turns the jump-flood distance field into visible pixels.

use crate::blending::BlendingParameters;
use crate::color::ColourInfo;
use crate::geometry::Rect;
use crate::renderer::frame_buffer::FrameBuffer;
use crate::renderer::shaders::ShaderKind;
use crate::renderer::uniforms::{OutlineParameters, UniformBuffer};
use crate::renderer::Renderer;

/// Draw the outline from `field` over `draw_rect`, tinted by `colour`.
///
/// `outline_width` is in texels of `field`. Coverage falls off linearly over
/// the last texel so the edge is antialiased. Returns whether anything was
/// drawn; non-positive widths draw nothing.
pub fn draw_outline(
    renderer: &mut Renderer,
    field: &FrameBuffer,
    draw_rect: Rect,
    outline_width: f32,
    colour: &ColourInfo,
    blending: BlendingParameters,
    parameters: &mut UniformBuffer<OutlineParameters>,
) -> bool {
    if outline_width <= 0.0 {
        log::debug!("Skipping outline draw for width {}", outline_width);
        return false;
    }

    let (width, height) = field.size();
    parameters.reset();
    let offset = parameters.push(
        renderer.queue(),
        &OutlineParameters {
            tex_size: [width as f32, height as f32],
            outline_width,
            _pad0: 0,
        },
    );

    let mut renderer = renderer.blend_state(blending);
    renderer.draw_frame_buffer(
        field,
        draw_rect,
        colour,
        ShaderKind::Outline,
        Some(parameters.block(offset)),
    );
    true
}

/// Draw the element's rendered contents over `draw_rect`.
pub fn draw_contents(
    renderer: &mut Renderer,
    contents: &FrameBuffer,
    draw_rect: Rect,
    colour: &ColourInfo,
    blending: BlendingParameters,
) {
    renderer
        .blend_state(blending)
        .draw_frame_buffer(contents, draw_rect, colour, ShaderKind::Texture, None);
}
