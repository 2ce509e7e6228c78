//! The draw-side half of the outline effect.
//!
//! The draw thread never sees the container. It receives an immutable
//! [`OutlineDrawState`] every frame and feeds it to the [`OutlineDrawNode`] it
//! owns, which keeps the framebuffers and redraws them only when the state's
//! version moved past the last one it rendered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::blending::BlendingParameters;
use crate::color::{Color, ColourInfo};
use crate::compositor;
use crate::element::Content;
use crate::geometry::{self, Rect, Vector2};
use crate::jump_flood::{self, MAX_OUTLINE_WIDTH, MAX_PASSES};
use crate::renderer::frame_buffer::FrameBuffer;
use crate::renderer::uniforms::{JumpFloodParameters, OutlineParameters, UniformBuffer};
use crate::renderer::{BufferedTargets, Renderer};
use crate::version::DrawVersion;

/// Everything needed to draw one frame of an outline.
#[derive(Clone)]
pub struct OutlineDrawState {
    pub version: u64,
    /// Outline width in screen pixels, already clamped
    pub outline_width: f32,
    /// Jump-flood start size in screen pixels, also the draw quad's inflation
    pub start_size: u32,
    pub outline_colour: ColourInfo,
    pub effect_blending: BlendingParameters,
    pub draw_blending: BlendingParameters,
    pub content_blending: BlendingParameters,
    pub frame_buffer_colour: ColourInfo,
    pub background_colour: Color,
    pub frame_buffer_scale: Vector2,
    pub draw_rectangle: Rect,
    pub child_masking_bounds: Rect,
    pub content: Arc<dyn Content>,
}

impl OutlineDrawState {
    /// Outline width in framebuffer texels, used for the outline's coverage.
    pub fn texel_outline_width(&self) -> f32 {
        (self.outline_width * self.frame_buffer_scale.x).min(MAX_OUTLINE_WIDTH)
    }

    /// Start size of the pass chain. Depends on the draw scale only, so the
    /// pass count does not change with the framebuffer scale.
    pub fn pass_start_size(&self) -> u32 {
        self.start_size
    }

    pub fn frame_buffer_size(&self) -> (u32, u32) {
        geometry::frame_buffer_size(self.draw_rectangle, self.frame_buffer_scale)
    }
}

/// What a single [`OutlineDrawNode::draw`] did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrawReport {
    pub redrawn: bool,
    pub jump_flood_passes: u32,
    pub outline_drawn: bool,
}

/// GPU-side state of one outline.
pub struct OutlineDrawNode {
    targets: BufferedTargets,
    jump_flood_parameters: Option<UniformBuffer<JumpFloodParameters>>,
    outline_parameters: Option<UniformBuffer<OutlineParameters>>,
    draw_version: DrawVersion,
    disposed: Arc<AtomicBool>,
}

impl OutlineDrawNode {
    pub(crate) fn new(disposed: Arc<AtomicBool>) -> Self {
        Self {
            targets: BufferedTargets::new(),
            jump_flood_parameters: None,
            outline_parameters: None,
            draw_version: DrawVersion::new(),
            disposed,
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Draw the outline and the element into the currently bound framebuffer.
    ///
    /// The content and jump-flood buffers are only redrawn when `state`
    /// carries a version this node has not rendered yet.
    pub fn draw(&mut self, renderer: &mut Renderer, state: &OutlineDrawState) -> DrawReport {
        if self.is_disposed() {
            self.dispose();
            return DrawReport::default();
        }

        let mut report = DrawReport::default();

        let (width, height) = state.frame_buffer_size();
        if self.targets.ensure_size(renderer.device(), width, height) {
            self.draw_version.reset();
        }

        if self.draw_version.needs_redraw(state.version) {
            log::debug!(
                "Redrawing outline: version {:?} -> {}",
                self.draw_version.last_drawn(),
                state.version
            );
            report.jump_flood_passes = self.populate(renderer, state);
            report.redrawn = true;
            self.draw_version.mark_drawn(state.version);
        } else {
            log::trace!("Reusing cached outline at version {}", state.version);
        }

        if state.texel_outline_width() > 0.0 {
            let parameters = self.outline_parameters.get_or_insert_with(|| {
                renderer.create_uniform_buffer(1, "Outline Parameters")
            });
            report.outline_drawn = compositor::draw_outline(
                renderer,
                self.targets.current(),
                state.draw_rectangle,
                state.texel_outline_width(),
                &state.outline_colour,
                state.effect_blending,
                parameters,
            );
        }

        compositor::draw_contents(
            renderer,
            self.targets.main(),
            state.draw_rectangle,
            &state.frame_buffer_colour,
            state.draw_blending,
        );

        report
    }

    /// Render the element into the content buffer and run the jump flood.
    fn populate(&mut self, renderer: &mut Renderer, state: &OutlineDrawState) -> u32 {
        self.targets.reset();

        {
            let mut bound = renderer.bind_frame_buffer(self.targets.main(), state.draw_rectangle);
            bound.clear(state.background_colour);

            bound.push_scissor(state.child_masking_bounds);
            {
                let mut blended = bound.blend_state(state.content_blending);
                state.content.paint(&mut *blended);
            }
            bound.pop_scissor_state();
        }

        let start_size = state.pass_start_size();
        if start_size == 0 {
            return 0;
        }

        let parameters = self.jump_flood_parameters.get_or_insert_with(|| {
            renderer.create_uniform_buffer(MAX_PASSES, "Jump Flood Parameters")
        });
        jump_flood::run_passes(renderer, &mut self.targets, parameters, start_size)
    }

    /// The buffer holding the distance field, or the content buffer when no
    /// passes ran.
    pub fn field(&self) -> &FrameBuffer {
        self.targets.current()
    }

    pub fn main_buffer(&self) -> &FrameBuffer {
        self.targets.main()
    }

    pub fn last_drawn_version(&self) -> Option<u64> {
        self.draw_version.last_drawn()
    }

    /// Free the framebuffers. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.targets.dispose() {
            log::info!("Released outline framebuffers");
        }
        self.draw_version.reset();
    }
}

impl Drop for OutlineDrawNode {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::BoxContent;
    use crate::geometry::Quad;

    fn state(outline_width: f32, scale: f32) -> OutlineDrawState {
        let rect = Rect::new(0.0, 0.0, 40.0, 30.0);
        OutlineDrawState {
            version: 1,
            outline_width,
            start_size: jump_flood::start_size(outline_width),
            outline_colour: ColourInfo::default(),
            effect_blending: BlendingParameters::MIXTURE,
            draw_blending: BlendingParameters::MIXTURE,
            content_blending: BlendingParameters::MIXTURE,
            frame_buffer_colour: ColourInfo::default(),
            background_colour: Color::TRANSPARENT,
            frame_buffer_scale: Vector2::new(scale, scale),
            draw_rectangle: rect,
            child_masking_bounds: rect,
            content: Arc::new(BoxContent {
                quad: Quad::from_rect(rect),
                colour: ColourInfo::default(),
            }),
        }
    }

    #[test]
    fn test_texel_width_follows_frame_buffer_scale() {
        assert_eq!(state(10.0, 0.5).texel_outline_width(), 5.0);
        assert_eq!(state(100.0, 2.0).texel_outline_width(), MAX_OUTLINE_WIDTH);
    }

    #[test]
    fn test_pass_count_ignores_frame_buffer_scale() {
        for scale in [0.5, 1.0, 2.0] {
            let state = state(10.0, scale);
            assert_eq!(state.pass_start_size(), 16);
            assert_eq!(jump_flood::pass_schedule(state.pass_start_size()).count(), 5);
        }
    }

    #[test]
    fn test_frame_buffer_size_is_scaled() {
        assert_eq!(state(4.0, 1.0).frame_buffer_size(), (40, 30));
        assert_eq!(state(4.0, 0.5).frame_buffer_size(), (20, 15));
    }

    #[test]
    fn test_state_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OutlineDrawState>();
    }

    #[test]
    fn test_disposed_node_draws_nothing_until_reallocated() {
        let mut node = OutlineDrawNode::new(Arc::new(AtomicBool::new(true)));
        assert!(node.is_disposed());
        node.dispose();
        assert_eq!(node.last_drawn_version(), None);
        assert!(!node.main_buffer().is_allocated());
    }
}
