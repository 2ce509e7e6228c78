//! Named WGSL programs and the bind group layouts they expect.

use wgpu::{BindGroupLayout, Device, ShaderModule};

pub const TEXTURE_SHADER: &str = "texture";
pub const JUMP_FLOOD_SHADER: &str = "jump_flood";
pub const OUTLINE_SHADER: &str = "outline";

/// Handle to one of the loaded shader programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// Samples a texture and tints it with the vertex colour
    Texture,
    /// One step of the jump-flood seed propagation
    JumpFlood,
    /// Converts the jump-flood field into outline coverage
    Outline,
}

impl ShaderKind {
    pub const ALL: [ShaderKind; 3] = [
        ShaderKind::Texture,
        ShaderKind::JumpFlood,
        ShaderKind::Outline,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShaderKind::Texture => TEXTURE_SHADER,
            ShaderKind::JumpFlood => JUMP_FLOOD_SHADER,
            ShaderKind::Outline => OUTLINE_SHADER,
        }
    }

    fn source(self) -> &'static str {
        match self {
            ShaderKind::Texture => include_str!("shaders/texture.wgsl"),
            ShaderKind::JumpFlood => include_str!("shaders/jump_flood.wgsl"),
            ShaderKind::Outline => include_str!("shaders/outline.wgsl"),
        }
    }

    /// Whether the program reads its texture with `textureLoad` and takes a uniform block.
    pub fn uses_uniforms(self) -> bool {
        !matches!(self, ShaderKind::Texture)
    }
}

/// Compiled shader modules plus the bind group layouts shared between pipelines.
pub struct ShaderManager {
    modules: [ShaderModule; 3],
    /// Group 0 for the texture shader: filterable texture + sampler
    pub texture_layout: BindGroupLayout,
    /// Group 0 for the jump-flood and outline shaders: unfiltered texture
    pub field_layout: BindGroupLayout,
    /// Group 1 for the jump-flood and outline shaders: uniform block with dynamic offset
    pub uniform_layout: BindGroupLayout,
}

impl ShaderManager {
    pub fn new(device: &Device) -> Self {
        let modules = ShaderKind::ALL.map(|kind| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(kind.name()),
                source: wgpu::ShaderSource::Wgsl(kind.source().into()),
            })
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let field_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Field Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                },
                count: None,
            }],
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        Self {
            modules,
            texture_layout,
            field_layout,
            uniform_layout,
        }
    }

    /// Look a program up by name.
    pub fn load(&self, name: &str) -> Option<ShaderKind> {
        ShaderKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn module(&self, kind: ShaderKind) -> &ShaderModule {
        &self.modules[kind as usize]
    }

    /// Group layouts in binding order for pipelines using `kind`.
    pub fn bind_group_layouts(&self, kind: ShaderKind) -> Vec<&BindGroupLayout> {
        if kind.uses_uniforms() {
            vec![&self.field_layout, &self.uniform_layout]
        } else {
            vec![&self.texture_layout]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in ShaderKind::ALL {
            assert_eq!(
                ShaderKind::ALL.into_iter().find(|k| k.name() == kind.name()),
                Some(kind)
            );
        }
        assert_eq!(ShaderKind::JumpFlood.name(), "jump_flood");
        assert_eq!(ShaderKind::Outline.name(), "outline");
    }

    #[test]
    fn test_sources_declare_entry_points() {
        for kind in ShaderKind::ALL {
            assert!(kind.source().contains("fn vs_main"));
            assert!(kind.source().contains("fn fs_main"));
        }
    }
}
