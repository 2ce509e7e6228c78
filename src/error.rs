use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutlineError {
    #[error("No suitable GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    #[error("Failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("Failed to map readback buffer: {0}")]
    Readback(String),
    #[error("Render target has zero size: {width}x{height}")]
    ZeroSizedTarget { width: u32, height: u32 },
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, OutlineError>;
