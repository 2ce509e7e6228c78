//! Offscreen screen target for rendering without a window.

use image::RgbaImage;

use crate::color::Color;
use crate::error::{OutlineError, Result};
use crate::geometry::Rect;
use crate::renderer::frame_buffer::{FrameBuffer, CONTENT_FORMAT};
use crate::renderer::{read_frame_buffer, DrawStats, GpuContext, Renderer};

/// A renderer paired with an RGBA8 framebuffer standing in for the screen.
pub struct HeadlessTarget {
    context: GpuContext,
    renderer: Renderer,
    target: FrameBuffer,
    clear_colour: Color,
}

impl HeadlessTarget {
    /// Create a target on the default adapter.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_context(GpuContext::new()?, width, height)
    }

    pub fn with_context(context: GpuContext, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(OutlineError::ZeroSizedTarget { width, height });
        }

        let renderer = Renderer::new(context.device.clone(), context.queue.clone());
        let mut target = FrameBuffer::new("Screen", CONTENT_FORMAT);
        target.ensure_size(&context.device, width, height);

        Ok(Self {
            context,
            renderer,
            target,
            clear_colour: Color::TRANSPARENT,
        })
    }

    pub fn set_clear_colour(&mut self, colour: Color) {
        self.clear_colour = colour;
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    pub fn renderer(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    pub fn target(&self) -> &FrameBuffer {
        &self.target
    }

    pub fn size(&self) -> (u32, u32) {
        self.target.size()
    }

    /// Clear the target, let `draw` render into it, and submit.
    ///
    /// Returns the GPU work recorded for this frame.
    pub fn frame<F>(&mut self, draw: F) -> DrawStats
    where
        F: FnOnce(&mut Renderer),
    {
        let (width, height) = self.target.size();
        let viewport = Rect::new(0.0, 0.0, width as f32, height as f32);

        self.renderer.take_stats();
        {
            let mut bound = self.renderer.bind_frame_buffer(&self.target, viewport);
            bound.clear(self.clear_colour);
            draw(&mut *bound);
        }
        self.renderer.submit();
        self.renderer.take_stats()
    }

    /// Read the target back. Anything drawn must already be submitted.
    pub fn read_image(&self) -> Result<RgbaImage> {
        read_frame_buffer(&self.context.device, &self.context.queue, &self.target)
    }

    /// Read any framebuffer produced with this target's device.
    pub fn read_texels(&self, frame_buffer: &FrameBuffer) -> Result<Vec<u8>> {
        crate::renderer::read_texels(&self.context.device, &self.context.queue, frame_buffer)
    }
}
