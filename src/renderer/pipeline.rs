//! Render pipelines, created on first use and cached by shader, blend and target format.

use std::collections::HashMap;

use wgpu::{Device, RenderPipeline, TextureFormat};

use super::shaders::{ShaderKind, ShaderManager};
use super::textured_vertex::TexturedVertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub shader: ShaderKind,
    pub blend: Option<wgpu::BlendState>,
    pub format: TextureFormat,
}

#[derive(Default)]
pub struct PipelineCache {
    pipelines: HashMap<PipelineKey, RenderPipeline>,
}

impl PipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(
        &mut self,
        device: &Device,
        shaders: &ShaderManager,
        key: PipelineKey,
    ) -> &RenderPipeline {
        self.pipelines
            .entry(key)
            .or_insert_with(|| create_pipeline(device, shaders, key))
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

fn create_pipeline(device: &Device, shaders: &ShaderManager, key: PipelineKey) -> RenderPipeline {
    log::debug!(
        "Creating {} pipeline for {:?} (blend: {})",
        key.shader.name(),
        key.format,
        key.blend.is_some()
    );

    let module = shaders.module(key.shader);
    let layouts = shaders.bind_group_layouts(key.shader);

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(key.shader.name()),
        bind_group_layouts: &layouts,
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(key.shader.name()),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers: &[TexturedVertex::desc()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: key.format,
                blend: key.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
