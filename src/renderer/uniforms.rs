//! Uniform block layouts and a per-pass slotted uniform buffer.
//!
//! Layouts follow std140: every struct is padded to a multiple of 16 bytes.

use std::marker::PhantomData;
use std::num::NonZeroU64;

use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, Queue};

/// Parameters for one jump-flood pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct JumpFloodParameters {
    /// 1 on the pass that seeds from the content buffer, 0 afterwards
    pub initial_pass: i32,
    pub _pad0: u32,
    /// Sample offset in texels (step size on both axes)
    pub offset: [f32; 2],
    /// Size of the source texture in texels
    pub tex_size: [f32; 2],
    pub _pad1: [u32; 2],
}

/// Parameters for the outline compositing draw.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OutlineParameters {
    /// Size of the jump-flood texture in texels
    pub tex_size: [f32; 2],
    /// Outline width in texels
    pub outline_width: f32,
    pub _pad0: u32,
}

/// A uniform buffer split into fixed-stride slots addressed by dynamic offset.
///
/// `queue.write_buffer` only lands at the next submit, so every pass recorded
/// into one encoder needs its own slot; reusing a single slot would make all
/// passes see the last value written.
pub struct UniformBuffer<T> {
    buffer: Buffer,
    bind_group: BindGroup,
    stride: u64,
    capacity: u32,
    cursor: u32,
    _marker: PhantomData<T>,
}

/// A uniform slot ready to bind: the buffer's bind group plus a dynamic offset.
#[derive(Clone, Copy)]
pub struct UniformBlock<'a> {
    pub bind_group: &'a BindGroup,
    pub offset: u32,
}

impl<T: bytemuck::Pod> UniformBuffer<T> {
    pub fn new(device: &Device, layout: &BindGroupLayout, capacity: u32, label: &str) -> Self {
        let capacity = capacity.max(1);
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = align_to(std::mem::size_of::<T>() as u64, alignment);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<T>() as u64),
                }),
            }],
        });

        Self {
            buffer,
            bind_group,
            stride,
            capacity,
            cursor: 0,
            _marker: PhantomData,
        }
    }

    /// Start handing out slots from the beginning again.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Write `value` into the next free slot and return its dynamic offset.
    pub fn push(&mut self, queue: &Queue, value: &T) -> u32 {
        if self.cursor >= self.capacity {
            log::warn!(
                "Uniform buffer out of slots ({}), reusing slot 0",
                self.capacity
            );
            self.cursor = 0;
        }

        let offset = self.cursor as u64 * self.stride;
        queue.write_buffer(&self.buffer, offset, bytemuck::bytes_of(value));
        self.cursor += 1;
        offset as u32
    }

    pub fn block(&self, offset: u32) -> UniformBlock<'_> {
        UniformBlock {
            bind_group: &self.bind_group,
            offset,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }
}

/// Round `value` up to a multiple of `alignment`.
pub fn align_to(value: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_sizes_are_std140() {
        assert_eq!(std::mem::size_of::<JumpFloodParameters>(), 32);
        assert_eq!(std::mem::size_of::<OutlineParameters>(), 16);
    }

    #[test]
    fn test_jump_flood_field_offsets() {
        let params = JumpFloodParameters {
            initial_pass: 1,
            offset: [16.0, 16.0],
            tex_size: [64.0, 32.0],
            ..Default::default()
        };
        let bytes = bytemuck::bytes_of(&params);
        assert_eq!(&bytes[0..4], &1i32.to_ne_bytes());
        assert_eq!(&bytes[8..12], &16.0f32.to_ne_bytes());
        assert_eq!(&bytes[16..20], &64.0f32.to_ne_bytes());
        assert_eq!(&bytes[20..24], &32.0f32.to_ne_bytes());
    }

    #[test]
    fn test_outline_field_offsets() {
        let params = OutlineParameters {
            tex_size: [8.0, 4.0],
            outline_width: 2.5,
            _pad0: 0,
        };
        let bytes = bytemuck::bytes_of(&params);
        assert_eq!(&bytes[8..12], &2.5f32.to_ne_bytes());
    }

    #[test]
    fn test_align_to() {
        assert_eq!(align_to(32, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
        assert_eq!(align_to(16, 0), 16);
    }
}
