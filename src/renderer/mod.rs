pub mod frame_buffer;
pub mod gpu_context;
pub mod pipeline;
pub mod readback;
pub mod shaders;
pub mod textured_vertex;
pub mod uniforms;

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use image::RgbaImage;
use wgpu::util::DeviceExt;
use wgpu::{BufferUsages, CommandEncoder, Device, Queue, TextureFormat, TextureView};

use crate::blending::BlendingParameters;
use crate::color::{Color, ColourInfo};
use crate::geometry::{Quad, Rect};

use self::frame_buffer::{FrameBuffer, CONTENT_FORMAT};
use self::pipeline::{PipelineCache, PipelineKey};
use self::shaders::{ShaderKind, ShaderManager};
use self::textured_vertex::{TexturedVertex, QUAD_INDICES};
use self::uniforms::{UniformBlock, UniformBuffer};

pub use frame_buffer::{BufferSlot, BufferedTargets};
pub use gpu_context::GpuContext;
pub use readback::{read_frame_buffer, read_texels};

/// Counters for the GPU work recorded since the last [`Renderer::take_stats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrawStats {
    pub draw_calls: u32,
    pub clears: u32,
    pub jump_flood_draws: u32,
    pub outline_draws: u32,
    pub frame_buffer_binds: u32,
}

/// A framebuffer bound as the render target.
struct BoundTarget {
    view: TextureView,
    format: TextureFormat,
    size: (u32, u32),
    /// Screen-space area the target covers
    viewport: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScissorState {
    enabled: bool,
    /// Screen-space scissor rectangle, only honoured while enabled
    rect: Option<Rect>,
}

/// Records draws into offscreen framebuffers.
///
/// Mirrors an immediate-mode renderer: a stack of bound framebuffers, a
/// scissor stack, and a current blend mode, all consulted at draw time.
/// Every draw becomes its own render pass in one command encoder, which is
/// submitted by [`Renderer::submit`].
pub struct Renderer {
    device: Arc<Device>,
    queue: Arc<Queue>,
    encoder: Option<CommandEncoder>,
    shaders: ShaderManager,
    pipelines: PipelineCache,
    sampler: wgpu::Sampler,
    index_buffer: wgpu::Buffer,
    white_pixel: FrameBuffer,
    images: HashMap<u64, FrameBuffer>,
    targets: Vec<BoundTarget>,
    scissor_stack: Vec<ScissorState>,
    blend: BlendingParameters,
    stats: DrawStats,
}

impl Renderer {
    pub fn new(device: Arc<Device>, queue: Arc<Queue>) -> Self {
        let shaders = ShaderManager::new(&device);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Texture Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Index Buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: BufferUsages::INDEX,
        });

        let mut white_pixel = FrameBuffer::new("White Pixel", CONTENT_FORMAT);
        white_pixel.ensure_size(&device, 1, 1);
        upload_rgba(&queue, &white_pixel, &[255, 255, 255, 255], 1, 1);

        Self {
            device,
            queue,
            encoder: None,
            shaders,
            pipelines: PipelineCache::new(),
            sampler,
            index_buffer,
            white_pixel,
            images: HashMap::new(),
            targets: Vec::new(),
            scissor_stack: vec![ScissorState {
                enabled: false,
                rect: None,
            }],
            blend: BlendingParameters::MIXTURE,
            stats: DrawStats::default(),
        }
    }

    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    pub fn queue(&self) -> &Arc<Queue> {
        &self.queue
    }

    pub fn shaders(&self) -> &ShaderManager {
        &self.shaders
    }

    /// Bind `frame_buffer` as the render target until the guard is dropped.
    ///
    /// `viewport` is the screen-space area the framebuffer represents; draws
    /// are positioned in screen space and mapped through it.
    pub fn bind_frame_buffer(
        &mut self,
        frame_buffer: &FrameBuffer,
        viewport: Rect,
    ) -> FrameBufferGuard<'_> {
        let pushed = match frame_buffer.texture() {
            Some(texture) => {
                self.targets.push(BoundTarget {
                    view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
                    format: frame_buffer.format(),
                    size: frame_buffer.size(),
                    viewport,
                });
                self.stats.frame_buffer_binds += 1;
                true
            }
            None => {
                log::warn!(
                    "Binding unallocated framebuffer '{}', draws will be dropped",
                    frame_buffer.label()
                );
                false
            }
        };

        FrameBufferGuard {
            renderer: self,
            pushed,
        }
    }

    /// Enable or disable scissor testing, keeping the current rectangle.
    pub fn push_scissor_state(&mut self, enabled: bool) {
        let rect = self.scissor().rect;
        self.scissor_stack.push(ScissorState { enabled, rect });
    }

    /// Clip subsequent draws to `rect` (screen space).
    pub fn push_scissor(&mut self, rect: Rect) {
        self.scissor_stack.push(ScissorState {
            enabled: true,
            rect: Some(rect),
        });
    }

    pub fn pop_scissor_state(&mut self) {
        // The bottom entry is the default state and always stays
        if self.scissor_stack.len() > 1 {
            self.scissor_stack.pop();
        } else {
            log::warn!("Scissor stack underflow");
        }
    }

    /// Scoped [`Renderer::push_scissor_state`], popped when the guard drops.
    pub fn scissor_state(&mut self, enabled: bool) -> ScissorGuard<'_> {
        self.push_scissor_state(enabled);
        ScissorGuard { renderer: self }
    }

    pub fn is_scissor_enabled(&self) -> bool {
        self.scissor().enabled
    }

    fn scissor(&self) -> ScissorState {
        self.scissor_stack
            .last()
            .copied()
            .unwrap_or(ScissorState {
                enabled: false,
                rect: None,
            })
    }

    /// Set the blend mode for subsequent draws and return the previous one.
    pub fn set_blend(&mut self, blending: BlendingParameters) -> BlendingParameters {
        std::mem::replace(&mut self.blend, blending)
    }

    /// Scoped [`Renderer::set_blend`], restored when the guard drops.
    pub fn blend_state(&mut self, blending: BlendingParameters) -> BlendGuard<'_> {
        let previous = self.set_blend(blending);
        BlendGuard {
            renderer: self,
            previous,
        }
    }

    pub fn blend(&self) -> BlendingParameters {
        self.blend
    }

    /// Clear the bound framebuffer.
    pub fn clear(&mut self, colour: Color) {
        let Some(target) = self.targets.last() else {
            log::warn!("clear() with no framebuffer bound");
            return;
        };

        let encoder = self.encoder.get_or_insert_with(|| {
            self.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Outline Encoder"),
                })
        });

        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(colour.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        self.stats.clears += 1;
    }

    /// Draw `source` as a textured quad covering `rect` in screen space.
    ///
    /// `shader` must be [`ShaderKind::Texture`] unless a uniform block is given.
    pub fn draw_frame_buffer(
        &mut self,
        source: &FrameBuffer,
        rect: Rect,
        colour: &ColourInfo,
        shader: ShaderKind,
        uniforms: Option<UniformBlock<'_>>,
    ) {
        let Some(texture) = source.texture() else {
            log::warn!("Drawing unallocated framebuffer '{}'", source.label());
            return;
        };

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.draw_textured(&view, &Quad::from_rect(rect), colour, shader, uniforms);
    }

    /// Fill `quad` with a solid or gradient colour.
    pub fn fill_quad(&mut self, quad: &Quad, colour: &ColourInfo) {
        let Some(texture) = self.white_pixel.texture() else {
            return;
        };
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.draw_textured(&view, quad, colour, ShaderKind::Texture, None);
    }

    /// Draw an image, uploading it on first use. `key` identifies the image contents.
    pub fn draw_image(&mut self, key: u64, image: &RgbaImage, quad: &Quad, colour: &ColourInfo) {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        let device = &self.device;
        let queue = &self.queue;
        let texture = self.images.entry(key).or_insert_with(|| {
            let mut texture = FrameBuffer::new("Image Texture", CONTENT_FORMAT);
            texture.ensure_size(device, width, height);
            upload_rgba(queue, &texture, image.as_raw(), width, height);
            texture
        });

        let Some(view) = texture
            .texture()
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()))
        else {
            return;
        };
        self.draw_textured(&view, quad, colour, ShaderKind::Texture, None);
    }

    fn draw_textured(
        &mut self,
        source: &TextureView,
        quad: &Quad,
        colour: &ColourInfo,
        shader: ShaderKind,
        uniforms: Option<UniformBlock<'_>>,
    ) {
        let Some(target) = self.targets.last() else {
            log::warn!("Draw with no framebuffer bound");
            return;
        };

        if shader.uses_uniforms() && uniforms.is_none() {
            log::error!("{} shader drawn without a uniform block", shader.name());
            return;
        }

        let scissor = self.scissor_stack.last().copied();
        let scissor_px = match scissor {
            Some(ScissorState {
                enabled: true,
                rect: Some(clip),
            }) => match scissor_pixels(clip, target.viewport, target.size) {
                Some(px) => Some(px),
                // Fully clipped away
                None => return,
            },
            _ => None,
        };

        let vertices = TexturedVertex::from_quad(quad, target.viewport, colour);
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Quad Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: BufferUsages::VERTEX,
            });

        let texture_bind_group = if shader.uses_uniforms() {
            self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Field Bind Group"),
                layout: &self.shaders.field_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                }],
            })
        } else {
            self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Texture Bind Group"),
                layout: &self.shaders.texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(source),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            })
        };

        let key = PipelineKey {
            shader,
            blend: self.blend.to_blend_state(),
            format: target.format,
        };
        let pipeline = self
            .pipelines
            .get_or_create(&self.device, &self.shaders, key);

        let encoder = self.encoder.get_or_insert_with(|| {
            self.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Outline Encoder"),
                })
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(shader.name()),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &texture_bind_group, &[]);
            if let Some(block) = uniforms {
                pass.set_bind_group(1, block.bind_group, &[block.offset]);
            }
            if let Some((x, y, w, h)) = scissor_px {
                pass.set_scissor_rect(x, y, w, h);
            }
            pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
        }

        self.stats.draw_calls += 1;
        match shader {
            ShaderKind::JumpFlood => self.stats.jump_flood_draws += 1,
            ShaderKind::Outline => self.stats.outline_draws += 1,
            ShaderKind::Texture => {}
        }
    }

    /// Create a uniform buffer bindable as group 1 of the jump-flood and outline shaders.
    pub fn create_uniform_buffer<T: bytemuck::Pod>(
        &self,
        capacity: u32,
        label: &str,
    ) -> UniformBuffer<T> {
        UniformBuffer::new(&self.device, &self.shaders.uniform_layout, capacity, label)
    }

    /// Submit everything recorded so far.
    pub fn submit(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.queue.submit(Some(encoder.finish()));
        }
    }

    pub fn stats(&self) -> DrawStats {
        self.stats
    }

    pub fn take_stats(&mut self) -> DrawStats {
        std::mem::take(&mut self.stats)
    }
}

/// Keeps a framebuffer bound; unbinds on drop.
pub struct FrameBufferGuard<'a> {
    renderer: &'a mut Renderer,
    pushed: bool,
}

impl Deref for FrameBufferGuard<'_> {
    type Target = Renderer;

    fn deref(&self) -> &Renderer {
        self.renderer
    }
}

impl DerefMut for FrameBufferGuard<'_> {
    fn deref_mut(&mut self) -> &mut Renderer {
        self.renderer
    }
}

impl Drop for FrameBufferGuard<'_> {
    fn drop(&mut self) {
        if self.pushed {
            self.renderer.targets.pop();
        }
    }
}

/// Keeps a scissor state pushed; pops it on drop.
pub struct ScissorGuard<'a> {
    renderer: &'a mut Renderer,
}

impl Deref for ScissorGuard<'_> {
    type Target = Renderer;

    fn deref(&self) -> &Renderer {
        self.renderer
    }
}

impl DerefMut for ScissorGuard<'_> {
    fn deref_mut(&mut self) -> &mut Renderer {
        self.renderer
    }
}

impl Drop for ScissorGuard<'_> {
    fn drop(&mut self) {
        self.renderer.pop_scissor_state();
    }
}

/// Keeps a blend mode set; restores the previous one on drop.
pub struct BlendGuard<'a> {
    renderer: &'a mut Renderer,
    previous: BlendingParameters,
}

impl Deref for BlendGuard<'_> {
    type Target = Renderer;

    fn deref(&self) -> &Renderer {
        self.renderer
    }
}

impl DerefMut for BlendGuard<'_> {
    fn deref_mut(&mut self) -> &mut Renderer {
        self.renderer
    }
}

impl Drop for BlendGuard<'_> {
    fn drop(&mut self) {
        self.renderer.set_blend(self.previous);
    }
}

/// Upload tightly packed RGBA8 pixels into `frame_buffer`.
pub fn upload_rgba(
    queue: &Queue,
    frame_buffer: &FrameBuffer,
    data: &[u8],
    width: u32,
    height: u32,
) {
    let Some(texture) = frame_buffer.texture() else {
        return;
    };

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

/// Map a screen-space scissor rectangle to target pixels, `None` if nothing is left.
fn scissor_pixels(clip: Rect, viewport: Rect, size: (u32, u32)) -> Option<(u32, u32, u32, u32)> {
    let sx = size.0 as f32 / viewport.width;
    let sy = size.1 as f32 / viewport.height;

    let left = ((clip.x - viewport.x) * sx).floor().clamp(0.0, size.0 as f32);
    let top = ((clip.y - viewport.y) * sy).floor().clamp(0.0, size.1 as f32);
    let right = ((clip.right() - viewport.x) * sx).ceil().clamp(0.0, size.0 as f32);
    let bottom = ((clip.bottom() - viewport.y) * sy).ceil().clamp(0.0, size.1 as f32);

    if right <= left || bottom <= top {
        return None;
    }

    Some((
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scissor_inside_viewport() {
        let viewport = Rect::new(100.0, 100.0, 50.0, 50.0);
        let px = scissor_pixels(Rect::new(110.0, 120.0, 10.0, 5.0), viewport, (100, 100));
        assert_eq!(px, Some((20, 40, 20, 10)));
    }

    #[test]
    fn test_scissor_clamped_to_target() {
        let viewport = Rect::new(0.0, 0.0, 64.0, 64.0);
        let px = scissor_pixels(Rect::new(-10.0, 60.0, 100.0, 100.0), viewport, (64, 64));
        assert_eq!(px, Some((0, 60, 64, 4)));
    }

    #[test]
    fn test_scissor_outside_viewport() {
        let viewport = Rect::new(0.0, 0.0, 64.0, 64.0);
        assert_eq!(
            scissor_pixels(Rect::new(100.0, 100.0, 5.0, 5.0), viewport, (64, 64)),
            None
        );
    }
}
