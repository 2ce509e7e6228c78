//! Jump-flood distance transform.
//!
//! Starting from the element's rendered alpha mask, every pass looks at the
//! eight neighbours `step` texels away (plus itself) and keeps the nearest
//! seed any of them knows about. Halving `step` each pass from the start size
//! down to 1 gives every texel within the start size an approximate nearest
//! seed in `log2(start) + 1` passes.

use crate::blending::BlendingParameters;
use crate::color::{Color, ColourInfo};
use crate::geometry::{self, Rect};
use crate::renderer::frame_buffer::BufferSlot;
use crate::renderer::shaders::ShaderKind;
use crate::renderer::uniforms::{JumpFloodParameters, UniformBuffer};
use crate::renderer::{BufferedTargets, Renderer};
use crate::transform::Transform;

/// Outline widths are clamped to this many screen pixels.
pub const MAX_OUTLINE_WIDTH: f32 = 128.0;

/// Upper bound on passes, reached at [`MAX_OUTLINE_WIDTH`].
pub const MAX_PASSES: u32 = 8;

/// Outline width in screen pixels, clamped to [`MAX_OUTLINE_WIDTH`].
pub fn clamped_width(outline_width: f32, draw_matrix: &Transform) -> f32 {
    let (scale_x, _) = draw_matrix.extract_scale();
    (outline_width * scale_x).min(MAX_OUTLINE_WIDTH)
}

/// First step size for a clamped width: the next power of two at or above it.
/// Zero for non-positive widths, meaning no passes at all.
pub fn start_size(clamped_width: f32) -> u32 {
    if clamped_width.is_nan() || clamped_width <= 0.0 {
        return 0;
    }
    geometry::next_power_of_two(clamped_width.ceil() as u32)
}

/// Everything the shader needs for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpFloodPassState {
    pub step_size: u32,
    pub initial_pass: bool,
    pub texture_size: (u32, u32),
}

impl JumpFloodPassState {
    pub fn parameters(&self) -> JumpFloodParameters {
        JumpFloodParameters {
            initial_pass: self.initial_pass as i32,
            offset: [self.step_size as f32; 2],
            tex_size: [self.texture_size.0 as f32, self.texture_size.1 as f32],
            ..Default::default()
        }
    }
}

/// Step sizes in pass order, each paired with whether it is the initial pass.
pub fn pass_schedule(start_size: u32) -> impl Iterator<Item = (u32, bool)> {
    std::iter::successors((start_size > 0).then_some(start_size), |size| {
        Some(size / 2).filter(|&next| next > 0)
    })
    .enumerate()
    .map(|(index, size)| (size, index == 0))
}

/// Run every pass for `start_size`, leaving the result in `targets.current()`.
///
/// Returns the number of passes drawn. `targets` must be reset so that the
/// content buffer is current. Scissoring and blending are off for the whole
/// sequence: the flood has to reach outside the element's bounds, and
/// propagated coordinates must never be mixed with what was there before.
pub fn run_passes(
    renderer: &mut Renderer,
    targets: &mut BufferedTargets,
    parameters: &mut UniformBuffer<JumpFloodParameters>,
    start_size: u32,
) -> u32 {
    if start_size == 0 {
        return 0;
    }

    parameters.reset();

    let mut scissor = renderer.scissor_state(false);
    let mut renderer = scissor.blend_state(BlendingParameters::NONE);

    let mut passes = 0;
    for (step_size, initial_pass) in pass_schedule(start_size) {
        let (source, target) = targets.get_next();
        let state = JumpFloodPassState {
            step_size,
            initial_pass,
            texture_size: targets.get(source).size(),
        };

        log::trace!(
            "Jump flood pass {}: step {} ({:?} -> {:?})",
            passes,
            step_size,
            source,
            target
        );

        jump_flood_pass(&mut *renderer, targets, source, target, parameters, state);
        passes += 1;
    }

    passes
}

fn jump_flood_pass(
    renderer: &mut Renderer,
    targets: &BufferedTargets,
    source: BufferSlot,
    target: BufferSlot,
    parameters: &mut UniformBuffer<JumpFloodParameters>,
    state: JumpFloodPassState,
) {
    let offset = parameters.push(renderer.queue(), &state.parameters());

    let source = targets.get(source);
    let (width, height) = state.texture_size;
    let rect = Rect::new(0.0, 0.0, width as f32, height as f32);

    let mut bound = renderer.bind_frame_buffer(targets.get(target), rect);
    bound.draw_frame_buffer(
        source,
        rect,
        &ColourInfo::solid(Color::WHITE),
        ShaderKind::JumpFlood,
        Some(parameters.block(offset)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passes_for(width: f32, scale: f32) -> Vec<u32> {
        let width = clamped_width(width, &Transform::scale(scale));
        pass_schedule(start_size(width)).map(|(size, _)| size).collect()
    }

    #[test]
    fn test_zero_width_has_no_passes() {
        assert!(passes_for(0.0, 1.0).is_empty());
        assert!(passes_for(-3.0, 1.0).is_empty());
    }

    #[test]
    fn test_width_ten_runs_five_passes() {
        assert_eq!(passes_for(10.0, 1.0), vec![16, 8, 4, 2, 1]);
    }

    #[test]
    fn test_wide_outline_is_clamped() {
        assert_eq!(passes_for(200.0, 1.0), vec![128, 64, 32, 16, 8, 4, 2, 1]);
        assert_eq!(passes_for(200.0, 1.0).len() as u32, MAX_PASSES);
    }

    #[test]
    fn test_scale_applies_before_clamp() {
        assert_eq!(passes_for(5.0, 2.0), vec![16, 8, 4, 2, 1]);
        assert_eq!(passes_for(100.0, 4.0).len(), 8);
    }

    #[test]
    fn test_fractional_width_rounds_up() {
        assert_eq!(start_size(0.25), 1);
        assert_eq!(start_size(4.0), 4);
        assert_eq!(start_size(4.01), 8);
    }

    #[test]
    fn test_pass_count_formula() {
        for tenth in 1..=1500 {
            let width = tenth as f32 * 0.1;
            let start = start_size(clamped_width(width, &Transform::identity()));
            let expected = start.trailing_zeros() + 1;
            assert_eq!(pass_schedule(start).count() as u32, expected, "width {width}");
        }
    }

    #[test]
    fn test_only_first_pass_is_initial() {
        let flags: Vec<bool> = pass_schedule(8).map(|(_, initial)| initial).collect();
        assert_eq!(flags, vec![true, false, false, false]);
    }

    #[test]
    fn test_pass_state_parameters() {
        let state = JumpFloodPassState {
            step_size: 4,
            initial_pass: true,
            texture_size: (40, 24),
        };
        let params = state.parameters();
        assert_eq!(params.initial_pass, 1);
        assert_eq!(params.offset, [4.0, 4.0]);
        assert_eq!(params.tex_size, [40.0, 24.0]);
    }
}
