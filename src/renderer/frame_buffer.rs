//! Offscreen render targets and the ping-pong set used by the outline.

use wgpu::{Device, Extent3d, Texture, TextureDimension, TextureFormat, TextureUsages, TextureView};

/// Format of the buffer the element's contents are rendered into.
pub const CONTENT_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// Format of the jump-flood buffers. Seed coordinates need full float
/// precision and these buffers are never filtered or blended.
pub const EFFECT_FORMAT: TextureFormat = TextureFormat::Rgba32Float;

/// A GPU texture that can be rendered into and sampled from.
pub struct FrameBuffer {
    label: &'static str,
    format: TextureFormat,
    texture: Option<Texture>,
    view: Option<TextureView>,
    width: u32,
    height: u32,
}

impl FrameBuffer {
    pub fn new(label: &'static str, format: TextureFormat) -> Self {
        Self {
            label,
            format,
            texture: None,
            view: None,
            width: 0,
            height: 0,
        }
    }

    /// Make sure the texture exists with exactly this size.
    ///
    /// Returns true when a new texture was allocated, in which case the previous
    /// contents are gone.
    pub fn ensure_size(&mut self, device: &Device, width: u32, height: u32) -> bool {
        let width = width.max(1);
        let height = height.max(1);

        if self.texture.is_some() && self.width == width && self.height == height {
            return false;
        }

        log::info!(
            "Allocating {} framebuffer: {}x{} ({:?})",
            self.label,
            width,
            height,
            self.format
        );

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(self.label),
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: self.format,
            usage: TextureUsages::RENDER_ATTACHMENT
                | TextureUsages::TEXTURE_BINDING
                | TextureUsages::COPY_SRC
                | TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.texture = Some(texture);
        self.view = Some(view);
        self.width = width;
        self.height = height;
        true
    }

    pub fn is_allocated(&self) -> bool {
        self.texture.is_some()
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    pub fn view(&self) -> Option<&TextureView> {
        self.view.as_ref()
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Size in pixels, `(0, 0)` until allocated.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Release the GPU texture. Safe to call more than once.
    pub fn dispose(&mut self) {
        if let Some(texture) = self.texture.take() {
            texture.destroy();
        }
        self.view = None;
        self.width = 0;
        self.height = 0;
    }
}

/// Which buffer a pass should read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferSlot {
    /// The element's rendered contents
    Main,
    /// One of the two jump-flood buffers
    Effect(usize),
}

/// The content buffer plus two effect buffers alternated between passes.
///
/// Before the first [`BufferedTargets::get_next`] of a redraw, `current` is the
/// content buffer, so the first pass seeds from the element itself. Every
/// `get_next` hands out the effect buffer that is not current and makes it the
/// new current, so a pass never reads the buffer it writes.
pub struct BufferedTargets {
    main: FrameBuffer,
    effects: [FrameBuffer; 2],
    current: BufferSlot,
    disposed: bool,
}

impl BufferedTargets {
    pub fn new() -> Self {
        Self {
            main: FrameBuffer::new("Outline Content", CONTENT_FORMAT),
            effects: [
                FrameBuffer::new("Outline Effect A", EFFECT_FORMAT),
                FrameBuffer::new("Outline Effect B", EFFECT_FORMAT),
            ],
            current: BufferSlot::Main,
            disposed: false,
        }
    }

    /// Resize all three buffers to `(width, height)`. Returns true if any were reallocated.
    pub fn ensure_size(&mut self, device: &Device, width: u32, height: u32) -> bool {
        let mut reallocated = self.main.ensure_size(device, width, height);
        for effect in &mut self.effects {
            reallocated |= effect.ensure_size(device, width, height);
        }
        self.disposed = false;
        reallocated
    }

    pub fn main(&self) -> &FrameBuffer {
        &self.main
    }

    pub fn current_slot(&self) -> BufferSlot {
        self.current
    }

    pub fn current(&self) -> &FrameBuffer {
        self.get(self.current)
    }

    pub fn get(&self, slot: BufferSlot) -> &FrameBuffer {
        match slot {
            BufferSlot::Main => &self.main,
            BufferSlot::Effect(index) => &self.effects[index],
        }
    }

    /// Make the inactive effect buffer current and return `(source, target)` for the pass.
    pub fn get_next(&mut self) -> (BufferSlot, BufferSlot) {
        let source = self.current;
        let target = match source {
            BufferSlot::Main | BufferSlot::Effect(1) => BufferSlot::Effect(0),
            BufferSlot::Effect(_) => BufferSlot::Effect(1),
        };
        self.current = target;
        (source, target)
    }

    /// Start a new chain of passes from the content buffer.
    pub fn reset(&mut self) {
        self.current = BufferSlot::Main;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release every buffer. Only the first call does anything.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }

        self.main.dispose();
        for effect in &mut self.effects {
            effect.dispose();
        }
        self.current = BufferSlot::Main;
        self.disposed = true;
        true
    }
}

impl Default for BufferedTargets {
    fn default() -> Self {
        Self::new()
    }
}
