//! The host-side view of whatever gets outlined.
//!
//! An [`Element`] lives on the update thread and reports its geometry; its
//! [`Content`] is an immutable, screen-space snapshot of what it looks like,
//! handed to the draw thread and painted into the outline's content buffer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image::RgbaImage;

use crate::blending::BlendingParameters;
use crate::color::ColourInfo;
use crate::geometry::{Quad, Rect};
use crate::renderer::Renderer;
use crate::transform::Transform;

/// Paint data captured for one frame.
pub trait Content: Send + Sync {
    /// Paint into the currently bound framebuffer, in screen space.
    fn paint(&self, renderer: &mut Renderer);
}

/// A visual element the outline container can wrap.
pub trait Element {
    /// Natural bounds in local coordinates.
    fn draw_rectangle(&self) -> Rect;

    /// Local to screen transform.
    fn draw_matrix(&self) -> Transform;

    fn set_draw_matrix(&mut self, matrix: Transform);

    fn screen_space_draw_quad(&self) -> Quad {
        Quad::from_rect_transformed(self.draw_rectangle(), &self.draw_matrix())
    }

    /// Blending the element draws its own contents with.
    fn blending(&self) -> BlendingParameters {
        BlendingParameters::INHERIT
    }

    /// Snapshot of what to paint this frame.
    fn content(&self) -> Arc<dyn Content>;
}

/// Identifies uploaded image data across frames.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ContentId(u64);

static NEXT_CONTENT_ID: AtomicU64 = AtomicU64::new(1);

impl ContentId {
    pub fn next() -> Self {
        ContentId(NEXT_CONTENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// A filled quad.
#[derive(Debug, Clone)]
pub struct BoxContent {
    pub quad: Quad,
    pub colour: ColourInfo,
}

impl Content for BoxContent {
    fn paint(&self, renderer: &mut Renderer) {
        renderer.fill_quad(&self.quad, &self.colour);
    }
}

/// An image stretched over a quad.
#[derive(Debug, Clone)]
pub struct ImageContent {
    pub id: ContentId,
    pub image: Arc<RgbaImage>,
    pub quad: Quad,
    pub colour: ColourInfo,
}

impl Content for ImageContent {
    fn paint(&self, renderer: &mut Renderer) {
        renderer.draw_image(self.id.get(), &self.image, &self.quad, &self.colour);
    }
}

/// Several contents painted in order.
#[derive(Clone, Default)]
pub struct CompositeContent {
    pub children: Vec<Arc<dyn Content>>,
}

impl Content for CompositeContent {
    fn paint(&self, renderer: &mut Renderer) {
        for child in &self.children {
            child.paint(renderer);
        }
    }
}

/// A solid or gradient rectangle.
#[derive(Debug, Clone)]
pub struct BoxElement {
    pub rect: Rect,
    pub colour: ColourInfo,
    pub transform: Transform,
}

impl BoxElement {
    pub fn new(rect: Rect, colour: impl Into<ColourInfo>) -> Self {
        Self {
            rect,
            colour: colour.into(),
            transform: Transform::IDENTITY,
        }
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

impl Element for BoxElement {
    fn draw_rectangle(&self) -> Rect {
        self.rect
    }

    fn draw_matrix(&self) -> Transform {
        self.transform
    }

    fn set_draw_matrix(&mut self, matrix: Transform) {
        self.transform = matrix;
    }

    fn content(&self) -> Arc<dyn Content> {
        Arc::new(BoxContent {
            quad: self.screen_space_draw_quad(),
            colour: self.colour,
        })
    }
}

/// An image placed at `rect` in local coordinates.
#[derive(Debug, Clone)]
pub struct ImageElement {
    id: ContentId,
    image: Arc<RgbaImage>,
    pub rect: Rect,
    pub colour: ColourInfo,
    pub transform: Transform,
}

impl ImageElement {
    /// Show `image` at its natural size with its top-left corner at `(x, y)`.
    pub fn new(image: RgbaImage, x: f32, y: f32) -> Self {
        let (width, height) = image.dimensions();
        Self {
            id: ContentId::next(),
            image: Arc::new(image),
            rect: Rect::new(x, y, width as f32, height as f32),
            colour: ColourInfo::default(),
            transform: Transform::IDENTITY,
        }
    }

    /// Decode an image from encoded bytes (PNG, JPEG, GIF, WebP).
    pub fn from_bytes(bytes: &[u8], x: f32, y: f32) -> crate::error::Result<Self> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self::new(image, x, y))
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Replace the pixels. The next paint uploads them again.
    pub fn set_image(&mut self, image: RgbaImage) {
        self.id = ContentId::next();
        self.image = Arc::new(image);
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl Element for ImageElement {
    fn draw_rectangle(&self) -> Rect {
        self.rect
    }

    fn draw_matrix(&self) -> Transform {
        self.transform
    }

    fn set_draw_matrix(&mut self, matrix: Transform) {
        self.transform = matrix;
    }

    fn content(&self) -> Arc<dyn Content> {
        Arc::new(ImageContent {
            id: self.id,
            image: self.image.clone(),
            quad: self.screen_space_draw_quad(),
            colour: self.colour,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn test_content_ids_are_unique() {
        assert_ne!(ContentId::next(), ContentId::next());
    }

    #[test]
    fn test_box_quad_follows_transform() {
        let element = BoxElement::new(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE)
            .transform(Transform::translate(5.0, 5.0).then(&Transform::scale(2.0)));
        let aabb = element.screen_space_draw_quad().aabb();
        assert_eq!(aabb, Rect::new(5.0, 5.0, 20.0, 20.0));
    }

    #[test]
    fn test_image_element_uses_natural_size() {
        let element = ImageElement::new(RgbaImage::new(12, 7), 3.0, 4.0);
        assert_eq!(element.draw_rectangle(), Rect::new(3.0, 4.0, 12.0, 7.0));
    }

    #[test]
    fn test_set_image_changes_content_id() {
        let mut element = ImageElement::new(RgbaImage::new(1, 1), 0.0, 0.0);
        let before = element.id;
        element.set_image(RgbaImage::new(2, 2));
        assert_ne!(before, element.id);
    }
}
