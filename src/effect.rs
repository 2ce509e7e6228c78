use crate::color::{Color, ColourInfo};
use crate::container::OutlineContainer;
use crate::element::Element;

/// Outline settings that can be applied to any element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineEffect {
    pub outline_width: f32,
    pub outline_colour: ColourInfo,
}

impl Default for OutlineEffect {
    fn default() -> Self {
        Self {
            outline_width: 0.0,
            outline_colour: ColourInfo::solid(Color::WHITE),
        }
    }
}

impl OutlineEffect {
    pub fn new(outline_width: f32, outline_colour: impl Into<ColourInfo>) -> Self {
        Self {
            outline_width,
            outline_colour: outline_colour.into(),
        }
    }

    /// Wrap `element` in a container configured with this effect.
    pub fn apply_to<E: Element>(&self, element: E) -> OutlineContainer<E> {
        OutlineContainer::new(element)
            .width(self.outline_width)
            .colour(self.outline_colour)
    }
}

/// `element.with_outline(effect)` sugar for [`OutlineEffect::apply_to`].
pub trait ElementExt: Element + Sized {
    fn with_outline(self, effect: OutlineEffect) -> OutlineContainer<Self> {
        effect.apply_to(self)
    }
}

impl<E: Element> ElementExt for E {}
