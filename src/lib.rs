pub mod blending;
pub mod color;
pub mod compositor;
pub mod container;
pub mod draw_node;
pub mod effect;
pub mod element;
pub mod error;
pub mod geometry;
pub mod headless;
pub mod invalidation;
pub mod jump_flood;
pub mod transform;
pub mod version;

// Public for hosts that drive their own frame loop
pub mod renderer;

pub mod prelude {
    pub use crate::blending::{BlendingEquation, BlendingParameters, BlendingType};
    pub use crate::color::{Color, ColourInfo, GradientDirection, LinearGradient};
    pub use crate::container::{DrawColourInfo, OutlineConfig, OutlineContainer};
    pub use crate::draw_node::{DrawReport, OutlineDrawNode, OutlineDrawState};
    pub use crate::effect::{ElementExt, OutlineEffect};
    pub use crate::element::{BoxElement, Content, Element, ImageElement};
    pub use crate::error::{OutlineError, Result};
    pub use crate::geometry::{Quad, Rect, Vector2};
    pub use crate::headless::HeadlessTarget;
    pub use crate::invalidation::Invalidation;
    pub use crate::renderer::{GpuContext, Renderer};
    pub use crate::transform::Transform;
}

pub use container::{OutlineConfig, OutlineContainer};
pub use effect::OutlineEffect;
pub use error::{OutlineError, Result};
