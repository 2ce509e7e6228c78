//! The update-side half of the outline effect.
//!
//! [`OutlineContainer`] wraps one [`Element`], owns the outline's properties
//! and decides when the cached framebuffers are stale. Once per frame the
//! host calls [`OutlineContainer::update`], then hands a
//! [`OutlineContainer::snapshot`] to the draw thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::blending::BlendingParameters;
use crate::color::{Color, ColourInfo};
use crate::draw_node::{OutlineDrawNode, OutlineDrawState};
use crate::element::Element;
use crate::geometry::{self, Quad, Rect, Vector2};
use crate::invalidation::{Invalidation, LayoutValue};
use crate::jump_flood::{self, MAX_OUTLINE_WIDTH};
use crate::transform::Transform;
use crate::version::UpdateVersion;

/// Initial property values for an [`OutlineContainer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineConfig {
    pub outline_width: f32,
    pub outline_colour: ColourInfo,
    pub effect_blending: BlendingParameters,
    pub background_colour: Color,
    pub frame_buffer_scale: Vector2,
    pub redraw_on_scale: bool,
    /// When false the outline is recomputed every frame
    pub cached_frame_buffer: bool,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            outline_width: 0.0,
            outline_colour: ColourInfo::solid(Color::WHITE),
            effect_blending: BlendingParameters::INHERIT,
            background_colour: Color::TRANSPARENT,
            frame_buffer_scale: Vector2::ONE,
            redraw_on_scale: true,
            cached_frame_buffer: true,
        }
    }
}

/// Colour and blending used to draw a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawColourInfo {
    pub colour: ColourInfo,
    pub blending: BlendingParameters,
}

/// Draws an outline around its child.
pub struct OutlineContainer<E: Element> {
    child: E,

    outline_width: f32,
    outline_colour: ColourInfo,
    effect_blending: BlendingParameters,
    blending: BlendingParameters,
    colour: ColourInfo,
    background_colour: Color,
    frame_buffer_scale: Vector2,
    redraw_on_scale: bool,
    using_cached_frame_buffer: bool,

    /// Bumped whenever the cached framebuffers need to be redrawn.
    /// Draw nodes compare it against the version they last rendered.
    update_version: UpdateVersion,
    children_update_version: Option<u64>,

    last_screen_space_size: Vector2,
    screen_space_size_backing: LayoutValue,

    disposed: Arc<AtomicBool>,
}

impl<E: Element> OutlineContainer<E> {
    pub fn new(child: E) -> Self {
        Self::with_config(child, OutlineConfig::default())
    }

    /// A container that recomputes the outline every frame.
    pub fn new_uncached(child: E) -> Self {
        Self::with_config(
            child,
            OutlineConfig {
                cached_frame_buffer: false,
                ..Default::default()
            },
        )
    }

    pub fn with_config(child: E, config: OutlineConfig) -> Self {
        if config.outline_width > MAX_OUTLINE_WIDTH {
            log::warn!(
                "Outline width {} exceeds {} and will be clamped",
                config.outline_width,
                MAX_OUTLINE_WIDTH
            );
        }

        Self {
            child,
            outline_width: config.outline_width,
            outline_colour: config.outline_colour,
            effect_blending: config.effect_blending,
            blending: BlendingParameters::INHERIT,
            colour: ColourInfo::default(),
            background_colour: config.background_colour,
            frame_buffer_scale: config.frame_buffer_scale,
            redraw_on_scale: config.redraw_on_scale,
            using_cached_frame_buffer: config.cached_frame_buffer,
            update_version: UpdateVersion::new(),
            children_update_version: None,
            last_screen_space_size: Vector2::ZERO,
            screen_space_size_backing: LayoutValue::new(
                Invalidation::PRESENCE
                    | Invalidation::REQUIRED_PARENT_SIZE_TO_FIT
                    | Invalidation::DRAW_INFO,
            ),
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }

    // Builder methods

    pub fn width(mut self, width: f32) -> Self {
        self.set_outline_width(width);
        self
    }

    pub fn colour(mut self, colour: impl Into<ColourInfo>) -> Self {
        self.set_outline_colour(colour);
        self
    }

    pub fn effect_blending(mut self, blending: BlendingParameters) -> Self {
        self.set_effect_blending(blending);
        self
    }

    pub fn background(mut self, colour: Color) -> Self {
        self.set_background_colour(colour);
        self
    }

    pub fn frame_buffer_scale(mut self, scale: Vector2) -> Self {
        self.set_frame_buffer_scale(scale);
        self
    }

    pub fn redraw_on_scale(mut self, redraw_on_scale: bool) -> Self {
        self.set_redraw_on_scale(redraw_on_scale);
        self
    }

    // Accessors

    pub fn child(&self) -> &E {
        &self.child
    }

    /// Mutable access to the child.
    ///
    /// Any mutation may change what the child paints or where, so the cached
    /// outline is invalidated up front. Use
    /// [`OutlineContainer::set_child_transform`] to only move or zoom it.
    pub fn child_mut(&mut self) -> &mut E {
        self.invalidate(
            Invalidation::DRAW_NODE
                | Invalidation::DRAW_INFO
                | Invalidation::REQUIRED_PARENT_SIZE_TO_FIT,
        );
        &mut self.child
    }

    /// Replace the child's draw matrix.
    ///
    /// Only the screen-space size is marked stale, so with
    /// `redraw_on_scale == false` a pure zoom keeps the cached outline.
    pub fn set_child_transform(&mut self, transform: Transform) {
        if self.child.draw_matrix() == transform {
            return;
        }

        self.child.set_draw_matrix(transform);
        self.invalidate(Invalidation::DRAW_INFO);
    }

    pub fn outline_width(&self) -> f32 {
        self.outline_width
    }

    pub fn outline_colour(&self) -> ColourInfo {
        self.outline_colour
    }

    pub fn get_effect_blending(&self) -> BlendingParameters {
        self.effect_blending
    }

    pub fn background_colour(&self) -> Color {
        self.background_colour
    }

    pub fn get_frame_buffer_scale(&self) -> Vector2 {
        self.frame_buffer_scale
    }

    pub fn get_redraw_on_scale(&self) -> bool {
        self.redraw_on_scale
    }

    pub fn using_cached_frame_buffer(&self) -> bool {
        self.using_cached_frame_buffer
    }

    pub fn version(&self) -> u64 {
        self.update_version.current()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    // Setters

    pub fn set_outline_width(&mut self, width: f32) {
        if same_width(self.outline_width, width) {
            return;
        }

        if width > MAX_OUTLINE_WIDTH {
            log::warn!(
                "Outline width {} exceeds {} and will be clamped",
                width,
                MAX_OUTLINE_WIDTH
            );
        }

        self.outline_width = width;
        self.invalidate(Invalidation::DRAW_NODE);
    }

    pub fn set_outline_colour(&mut self, colour: impl Into<ColourInfo>) {
        let colour = colour.into();
        if self.outline_colour == colour {
            return;
        }

        self.outline_colour = colour;
        self.invalidate(Invalidation::DRAW_NODE);
    }

    pub fn set_effect_blending(&mut self, blending: BlendingParameters) {
        if self.effect_blending == blending {
            return;
        }

        self.effect_blending = blending;
        self.invalidate(Invalidation::DRAW_NODE);
    }

    /// Clear colour of the content framebuffer.
    pub fn set_background_colour(&mut self, colour: Color) {
        if self.background_colour == colour {
            return;
        }

        self.background_colour = colour;
        self.force_redraw();
    }

    pub fn set_frame_buffer_scale(&mut self, scale: Vector2) {
        if self.frame_buffer_scale == scale {
            return;
        }

        self.frame_buffer_scale = scale;
        self.force_redraw();
    }

    /// Whether a change in the draw matrix's scale alone triggers a redraw.
    ///
    /// Toggling this only marks the screen-space size stale; the next
    /// [`OutlineContainer::update`] decides whether a redraw is due.
    pub fn set_redraw_on_scale(&mut self, redraw_on_scale: bool) {
        if self.redraw_on_scale == redraw_on_scale {
            return;
        }

        self.redraw_on_scale = redraw_on_scale;
        self.screen_space_size_backing.invalidate();
    }

    /// Blending of the container itself, inherited by the effect.
    ///
    /// Only bumps the version when the effective outline blending changes.
    pub fn set_blending(&mut self, blending: BlendingParameters) {
        if self.blending == blending {
            return;
        }

        let previous = self.draw_effect_blending();
        self.blending = blending;

        if self.draw_effect_blending() != previous {
            self.invalidate(Invalidation::DRAW_NODE);
        } else {
            self.invalidate(Invalidation::COLOUR);
        }
    }

    /// Colour the cached contents are drawn with. Does not trigger a redraw.
    pub fn set_colour(&mut self, colour: impl Into<ColourInfo>) {
        let colour = colour.into();
        if self.colour == colour {
            return;
        }

        self.colour = colour;
        self.invalidate(Invalidation::COLOUR);
    }

    pub fn force_redraw(&mut self) {
        self.invalidate(Invalidation::DRAW_NODE);
    }

    /// Report a change to the container. Returns whether anything was invalidated.
    pub fn invalidate(&mut self, invalidation: Invalidation) -> bool {
        let mut result = self.screen_space_size_backing.on_invalidate(invalidation);

        if invalidation.contains(Invalidation::DRAW_NODE) {
            self.update_version.invalidate();
            result = true;
        }

        result
    }

    /// Per-frame update, run before [`OutlineContainer::snapshot`].
    pub fn update(&mut self) {
        if !self.using_cached_frame_buffer {
            self.force_redraw();
            return;
        }

        if self.screen_space_size_backing.is_valid() {
            return;
        }

        let mut draw_size = self.screen_space_draw_quad().aabb().size();
        if !self.redraw_on_scale {
            draw_size = geometry::scale_normalized_size(draw_size, &self.child.draw_matrix());
        }

        if !self.last_screen_space_size.almost_equals(draw_size) {
            log::debug!(
                "Screen-space size changed {:?} -> {:?}, redrawing",
                self.last_screen_space_size,
                draw_size
            );
            self.update_version.invalidate();
            self.last_screen_space_size = draw_size;
        }

        self.screen_space_size_backing.validate();
    }

    /// The effect blending with inherited fields taken from the container,
    /// and anything still inherited resolved to defaults.
    pub fn draw_effect_blending(&self) -> BlendingParameters {
        let mut blending = self.effect_blending;
        blending.copy_from_parent(self.blending);
        blending.apply_default_to_inherited();
        blending
    }

    /// The child's screen-space bounds grown to make room for the outline.
    pub fn screen_space_draw_quad(&self) -> Quad {
        let matrix = self.child.draw_matrix();
        let inflate = geometry::inflate_amount(self.outline_width, &matrix);
        let aabb = self.child.screen_space_draw_quad().aabb();
        Quad::from_rect(aabb.inflate(inflate))
    }

    /// Children are masked to their natural bounds, never the inflated ones.
    pub fn child_masking_bounds(&self) -> Rect {
        self.child.screen_space_draw_quad().aabb()
    }

    /// Colour reported to children: opaque white with resolved blending, so
    /// the contents render untinted into the framebuffer.
    pub fn draw_colour_info(&self) -> DrawColourInfo {
        let mut blending = self.blending;
        blending.apply_default_to_inherited();

        DrawColourInfo {
            colour: ColourInfo::solid(Color::WHITE),
            blending,
        }
    }

    /// Colour the content framebuffer is drawn to the screen with.
    pub fn frame_buffer_draw_colour(&self) -> DrawColourInfo {
        DrawColourInfo {
            colour: self.colour,
            blending: self.blending,
        }
    }

    /// Whether the children need updating since the last masking pass.
    pub fn requires_children_update(&self) -> bool {
        self.children_update_version != Some(self.update_version.current())
    }

    /// Record that the children were brought up to date with this version.
    /// Returns whether any part of the child is left unmasked.
    pub fn update_sub_tree_masking(&mut self) -> bool {
        self.children_update_version = Some(self.update_version.current());
        !self.child_masking_bounds().is_empty()
    }

    /// Capture everything the draw thread needs for this frame.
    pub fn snapshot(&self) -> OutlineDrawState {
        let clamped = jump_flood::clamped_width(self.outline_width, &self.child.draw_matrix());
        let mut draw_blending = self.frame_buffer_draw_colour().blending;
        draw_blending.apply_default_to_inherited();

        OutlineDrawState {
            version: self.update_version.current(),
            outline_width: clamped,
            start_size: jump_flood::start_size(clamped),
            outline_colour: self.outline_colour,
            effect_blending: self.draw_effect_blending(),
            draw_blending,
            content_blending: resolved_content_blending(self.child.blending()),
            frame_buffer_colour: self.frame_buffer_draw_colour().colour,
            background_colour: self.background_colour,
            frame_buffer_scale: self.frame_buffer_scale,
            draw_rectangle: self.screen_space_draw_quad().aabb(),
            child_masking_bounds: self.child_masking_bounds(),
            content: self.child.content(),
        }
    }

    /// A draw node sharing this container's lifetime.
    pub fn create_draw_node(&self) -> OutlineDrawNode {
        OutlineDrawNode::new(self.disposed.clone())
    }

    /// Release the shared GPU data. Draw nodes free their framebuffers on
    /// their next draw. Only the first call has any effect.
    pub fn dispose(&mut self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            log::debug!("Outline container disposed at version {}", self.version());
        }
    }
}

impl<E: Element> Drop for OutlineContainer<E> {
    fn drop(&mut self) {
        self.dispose();
    }
}

// NaN compares equal to itself here, so re-setting it is a no-op
fn same_width(a: f32, b: f32) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn resolved_content_blending(mut blending: BlendingParameters) -> BlendingParameters {
    blending.apply_default_to_inherited();
    blending
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::BoxElement;

    fn container() -> OutlineContainer<BoxElement> {
        OutlineContainer::new(BoxElement::new(
            Rect::new(10.0, 10.0, 50.0, 20.0),
            Color::WHITE,
        ))
    }

    #[test]
    fn test_equal_values_do_not_bump() {
        let mut c = container().width(4.0);
        let before = c.version();
        c.set_outline_width(4.0);
        c.set_outline_colour(Color::WHITE);
        c.set_effect_blending(BlendingParameters::INHERIT);
        c.set_background_colour(Color::TRANSPARENT);
        c.set_frame_buffer_scale(Vector2::ONE);
        assert_eq!(c.version(), before);
    }

    #[test]
    fn test_each_change_bumps_once() {
        let mut c = container();
        let before = c.version();
        c.set_outline_width(3.0);
        assert_eq!(c.version(), before + 1);
        c.set_outline_colour(Color::BLACK);
        assert_eq!(c.version(), before + 2);
        c.set_effect_blending(BlendingParameters::ADDITIVE);
        assert_eq!(c.version(), before + 3);
        c.set_background_colour(Color::WHITE);
        assert_eq!(c.version(), before + 4);
        c.set_frame_buffer_scale(Vector2::new(0.5, 0.5));
        assert_eq!(c.version(), before + 5);
    }

    #[test]
    fn test_tint_does_not_bump() {
        let mut c = container();
        let before = c.version();
        c.set_colour(Color::BLACK);
        assert_eq!(c.version(), before);
    }

    #[test]
    fn test_blending_bumps_only_when_effective_blending_changes() {
        let mut c = container();
        let before = c.version();
        c.set_blending(BlendingParameters::ADDITIVE);
        assert_eq!(c.version(), before + 1);

        // Fully specified effect blending ignores the container's
        c.set_effect_blending(BlendingParameters::NONE);
        let before = c.version();
        c.set_blending(BlendingParameters::MIXTURE);
        assert_eq!(c.version(), before);
    }

    #[test]
    fn test_first_update_bumps_for_size() {
        let mut c = container();
        let before = c.version();
        c.update();
        assert_eq!(c.version(), before + 1);
        c.update();
        assert_eq!(c.version(), before + 1);
    }

    #[test]
    fn test_draw_info_change_with_same_size_does_not_bump() {
        let mut c = container();
        c.update();
        let before = c.version();
        assert!(c.invalidate(Invalidation::DRAW_INFO));
        c.update();
        assert_eq!(c.version(), before);
    }

    #[test]
    fn test_zoom_keeps_outline_without_redraw_on_scale() {
        let mut c = container().redraw_on_scale(false);
        c.update();
        let before = c.version();

        c.set_child_transform(Transform::scale(2.0));
        assert_eq!(c.version(), before);

        c.update();
        assert_eq!(c.version(), before);
    }

    #[test]
    fn test_zoom_redraws_once_with_redraw_on_scale() {
        let mut c = container();
        c.update();
        let before = c.version();

        c.set_child_transform(Transform::scale(2.0));
        c.update();
        c.update();
        assert_eq!(c.version(), before + 1);
    }

    #[test]
    fn test_resize_redraws_without_redraw_on_scale() {
        let mut c = container().redraw_on_scale(false);
        c.update();
        let before = c.version();

        c.child_mut().rect = Rect::new(10.0, 10.0, 80.0, 20.0);
        c.update();
        assert!(c.version() > before);
        let after = c.version();

        c.update();
        assert_eq!(c.version(), after);
    }

    #[test]
    fn test_nan_width_set_twice_bumps_once() {
        let mut c = container();
        let before = c.version();
        c.set_outline_width(f32::NAN);
        c.set_outline_width(f32::NAN);
        assert_eq!(c.version(), before + 1);
        c.set_outline_width(0.0);
        assert_eq!(c.version(), before + 2);
    }

    #[test]
    fn test_uncached_bumps_every_update() {
        let mut c = OutlineContainer::new_uncached(BoxElement::new(
            Rect::new(0.0, 0.0, 5.0, 5.0),
            Color::WHITE,
        ));
        let before = c.version();
        c.update();
        c.update();
        c.update();
        assert_eq!(c.version(), before + 3);
    }

    #[test]
    fn test_draw_quad_is_inflated_by_start_size() {
        let c = container().width(10.0);
        assert_eq!(
            c.screen_space_draw_quad().aabb(),
            Rect::new(-6.0, -6.0, 82.0, 52.0)
        );
        assert_eq!(c.child_masking_bounds(), Rect::new(10.0, 10.0, 50.0, 20.0));
    }

    #[test]
    fn test_zero_width_draw_quad_matches_child() {
        let c = container();
        assert_eq!(c.screen_space_draw_quad().aabb(), c.child_masking_bounds());
    }

    #[test]
    fn test_draw_effect_blending_inherits_from_container() {
        let mut c = container();
        assert_eq!(c.draw_effect_blending(), BlendingParameters::MIXTURE);
        c.set_blending(BlendingParameters::ADDITIVE);
        assert_eq!(c.draw_effect_blending(), BlendingParameters::ADDITIVE);
        c.set_effect_blending(BlendingParameters::NONE);
        assert_eq!(c.draw_effect_blending(), BlendingParameters::NONE);
    }

    #[test]
    fn test_draw_colour_is_white_but_frame_buffer_keeps_tint() {
        let mut c = container();
        let tint = Color::rgba(1.0, 0.0, 0.0, 0.5);
        c.set_colour(tint);
        assert_eq!(c.draw_colour_info().colour, ColourInfo::solid(Color::WHITE));
        assert_eq!(c.frame_buffer_draw_colour().colour, ColourInfo::solid(tint));
    }

    #[test]
    fn test_children_update_gating() {
        let mut c = container();
        assert!(c.requires_children_update());
        assert!(c.update_sub_tree_masking());
        assert!(!c.requires_children_update());
        c.force_redraw();
        assert!(c.requires_children_update());
    }

    #[test]
    fn test_dispose_flags_draw_nodes() {
        let mut c = container();
        let node = c.create_draw_node();
        assert!(!node.is_disposed());
        c.dispose();
        c.dispose();
        assert!(node.is_disposed());
        assert!(c.is_disposed());
    }
}
