//! Copy framebuffer contents back to the CPU.

use image::RgbaImage;
use wgpu::{Device, Queue};

use super::frame_buffer::FrameBuffer;
use super::uniforms::align_to;
use crate::error::{OutlineError, Result};

/// Read the raw texel bytes of `frame_buffer`, rows tightly packed.
///
/// Any work recorded but not yet submitted is not included; submit first.
pub fn read_texels(device: &Device, queue: &Queue, frame_buffer: &FrameBuffer) -> Result<Vec<u8>> {
    let (width, height) = frame_buffer.size();
    let texture = frame_buffer
        .texture()
        .ok_or(OutlineError::ZeroSizedTarget { width, height })?;

    let texel_size = frame_buffer
        .format()
        .block_copy_size(None)
        .unwrap_or(4) as u64;
    let row_bytes = width as u64 * texel_size;
    let padded_row_bytes = align_to(row_bytes, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64);

    let readback = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Outline Readback Buffer"),
        size: padded_row_bytes * height as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Outline Readback Encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row_bytes as u32),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(Some(encoder.finish()));

    let buffer_slice = readback.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |res| {
        let _ = tx.send(res);
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| OutlineError::Readback(format!("wgpu poll failed: {e:?}")))?;
    rx.recv()
        .map_err(|_| OutlineError::Readback("readback channel closed".to_string()))?
        .map_err(|e| OutlineError::Readback(format!("map failed: {e:?}")))?;

    let mapped = buffer_slice.get_mapped_range();
    let mut out = Vec::with_capacity((row_bytes * height as u64) as usize);
    for row in 0..height as usize {
        let start = row * padded_row_bytes as usize;
        out.extend_from_slice(&mapped[start..start + row_bytes as usize]);
    }
    drop(mapped);
    readback.unmap();

    Ok(out)
}

/// Read an 8-bit RGBA framebuffer into an image.
pub fn read_frame_buffer(
    device: &Device,
    queue: &Queue,
    frame_buffer: &FrameBuffer,
) -> Result<RgbaImage> {
    if !matches!(
        frame_buffer.format(),
        wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb
    ) {
        log::error!(
            "{} is {:?}, expected 8-bit RGBA",
            frame_buffer.label(),
            frame_buffer.format()
        );
        return Err(OutlineError::Readback(format!(
            "{:?} cannot be read as an RGBA image",
            frame_buffer.format()
        )));
    }

    let (width, height) = frame_buffer.size();
    let data = read_texels(device, queue, frame_buffer)?;

    RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| OutlineError::Readback("readback size mismatch".to_string()))
}
