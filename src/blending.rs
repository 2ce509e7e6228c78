//! Blend modes with parent inheritance.
//!
//! Every field may be left as `Inherit`, in which case the value is taken
//! from the parent when the effective blending is resolved. Anything still
//! inherited after that falls back to standard alpha mixing.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendingType {
    Inherit,
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
    SrcAlphaSaturate,
    ConstantColor,
    OneMinusConstantColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendingEquation {
    Inherit,
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendingParameters {
    pub source: BlendingType,
    pub destination: BlendingType,
    pub source_alpha: BlendingType,
    pub destination_alpha: BlendingType,
    pub rgb_equation: BlendingEquation,
    pub alpha_equation: BlendingEquation,
}

impl BlendingParameters {
    /// Overwrite the target with the source, no blending at all.
    pub const NONE: Self = Self {
        source: BlendingType::One,
        destination: BlendingType::Zero,
        source_alpha: BlendingType::One,
        destination_alpha: BlendingType::Zero,
        rgb_equation: BlendingEquation::Add,
        alpha_equation: BlendingEquation::Add,
    };

    pub const INHERIT: Self = Self {
        source: BlendingType::Inherit,
        destination: BlendingType::Inherit,
        source_alpha: BlendingType::Inherit,
        destination_alpha: BlendingType::Inherit,
        rgb_equation: BlendingEquation::Inherit,
        alpha_equation: BlendingEquation::Inherit,
    };

    /// Regular alpha blending.
    pub const MIXTURE: Self = Self {
        source: BlendingType::SrcAlpha,
        destination: BlendingType::OneMinusSrcAlpha,
        source_alpha: BlendingType::One,
        destination_alpha: BlendingType::One,
        rgb_equation: BlendingEquation::Add,
        alpha_equation: BlendingEquation::Add,
    };

    pub const ADDITIVE: Self = Self {
        source: BlendingType::SrcAlpha,
        destination: BlendingType::One,
        source_alpha: BlendingType::One,
        destination_alpha: BlendingType::One,
        rgb_equation: BlendingEquation::Add,
        alpha_equation: BlendingEquation::Add,
    };

    /// Fill every inherited field from `parent`.
    pub fn copy_from_parent(&mut self, parent: BlendingParameters) {
        fn pick<T: Copy + PartialEq>(own: &mut T, parent: T, inherit: T) {
            if *own == inherit {
                *own = parent;
            }
        }

        pick(&mut self.source, parent.source, BlendingType::Inherit);
        pick(&mut self.destination, parent.destination, BlendingType::Inherit);
        pick(&mut self.source_alpha, parent.source_alpha, BlendingType::Inherit);
        pick(&mut self.destination_alpha, parent.destination_alpha, BlendingType::Inherit);
        pick(&mut self.rgb_equation, parent.rgb_equation, BlendingEquation::Inherit);
        pick(&mut self.alpha_equation, parent.alpha_equation, BlendingEquation::Inherit);
    }

    /// Resolve anything still inherited to [`BlendingParameters::MIXTURE`].
    pub fn apply_default_to_inherited(&mut self) {
        self.copy_from_parent(Self::MIXTURE);
    }

    pub fn is_disabled(&self) -> bool {
        let mut resolved = *self;
        resolved.apply_default_to_inherited();
        resolved == Self::NONE
    }

    /// The wgpu blend state for these parameters, `None` when blending is off.
    pub fn to_blend_state(&self) -> Option<wgpu::BlendState> {
        if self.is_disabled() {
            return None;
        }

        let mut resolved = *self;
        resolved.apply_default_to_inherited();

        Some(wgpu::BlendState {
            color: blend_component(
                resolved.source,
                resolved.destination,
                resolved.rgb_equation,
            ),
            alpha: blend_component(
                resolved.source_alpha,
                resolved.destination_alpha,
                resolved.alpha_equation,
            ),
        })
    }
}

impl Default for BlendingParameters {
    fn default() -> Self {
        Self::INHERIT
    }
}

fn blend_component(
    src: BlendingType,
    dst: BlendingType,
    equation: BlendingEquation,
) -> wgpu::BlendComponent {
    let operation = match equation {
        BlendingEquation::Inherit | BlendingEquation::Add => wgpu::BlendOperation::Add,
        BlendingEquation::Subtract => wgpu::BlendOperation::Subtract,
        BlendingEquation::ReverseSubtract => wgpu::BlendOperation::ReverseSubtract,
        BlendingEquation::Min => wgpu::BlendOperation::Min,
        BlendingEquation::Max => wgpu::BlendOperation::Max,
    };

    // wgpu rejects min/max with anything but unit factors
    if matches!(
        operation,
        wgpu::BlendOperation::Min | wgpu::BlendOperation::Max
    ) {
        return wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation,
        };
    }

    wgpu::BlendComponent {
        src_factor: blend_factor(src),
        dst_factor: blend_factor(dst),
        operation,
    }
}

fn blend_factor(ty: BlendingType) -> wgpu::BlendFactor {
    match ty {
        BlendingType::Inherit | BlendingType::One => wgpu::BlendFactor::One,
        BlendingType::Zero => wgpu::BlendFactor::Zero,
        BlendingType::SrcColor => wgpu::BlendFactor::Src,
        BlendingType::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
        BlendingType::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendingType::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendingType::DstColor => wgpu::BlendFactor::Dst,
        BlendingType::OneMinusDstColor => wgpu::BlendFactor::OneMinusDst,
        BlendingType::DstAlpha => wgpu::BlendFactor::DstAlpha,
        BlendingType::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
        BlendingType::SrcAlphaSaturate => wgpu::BlendFactor::SrcAlphaSaturated,
        BlendingType::ConstantColor => wgpu::BlendFactor::Constant,
        BlendingType::OneMinusConstantColor => wgpu::BlendFactor::OneMinusConstant,
    }
}
