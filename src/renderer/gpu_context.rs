use std::sync::Arc;

use wgpu::{Device, Instance, Queue};

use crate::error::Result;

/// Device and queue for offscreen rendering. No surface is ever created.
pub struct GpuContext {
    pub instance: Instance,
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
}

impl GpuContext {
    /// Create a headless context on the default adapter.
    pub fn new() -> Result<Self> {
        Self::with_backends(wgpu::Backends::all())
    }

    pub fn with_backends(backends: wgpu::Backends) -> Result<Self> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Outline Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            memory_hints: wgpu::MemoryHints::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            trace: wgpu::Trace::Off,
        }))?;

        Ok(Self {
            instance,
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }
}
