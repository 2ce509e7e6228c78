use std::sync::mpsc;
use std::thread;

use outline_effect::jump_flood::pass_schedule;
use outline_effect::prelude::*;

fn boxed(rect: Rect) -> OutlineContainer<BoxElement> {
    OutlineContainer::new(BoxElement::new(rect, Color::rgb(0.0, 0.0, 1.0)))
}

#[test]
fn test_setters_bump_exactly_once() {
    let mut container = boxed(Rect::new(0.0, 0.0, 32.0, 32.0));
    container.update();
    let start = container.version();

    container.set_outline_width(6.0);
    container.set_outline_width(6.0);
    assert_eq!(container.version(), start + 1);

    container.set_outline_colour(Color::BLACK);
    container.set_outline_colour(Color::BLACK);
    assert_eq!(container.version(), start + 2);

    container.set_effect_blending(BlendingParameters::ADDITIVE);
    container.set_effect_blending(BlendingParameters::ADDITIVE);
    assert_eq!(container.version(), start + 3);

    container.force_redraw();
    assert_eq!(container.version(), start + 4);
}

#[test]
fn test_colour_change_keeps_pass_schedule() {
    let mut container = boxed(Rect::new(0.0, 0.0, 32.0, 32.0)).width(10.0);
    container.update();
    let before = container.snapshot();

    container.set_outline_colour(Color::LIGHT_CORAL);
    container.update();
    let after = container.snapshot();

    assert_eq!(after.version, before.version + 1);
    assert_eq!(after.start_size, before.start_size);
    assert_eq!(after.draw_rectangle, before.draw_rectangle);
}

#[test]
fn test_toggling_redraw_on_scale_without_scale_is_free() {
    let mut container = boxed(Rect::new(4.0, 4.0, 16.0, 8.0)).width(3.0);
    container.update();
    let before = container.version();

    container.set_redraw_on_scale(false);
    container.update();
    container.set_redraw_on_scale(true);
    container.update();

    assert_eq!(container.version(), before);
}

#[test]
fn test_scale_change_redraws_when_redraw_on_scale() {
    let mut container = boxed(Rect::new(0.0, 0.0, 16.0, 16.0)).width(2.0);
    container.update();
    let before = container.version();

    container.set_child_transform(Transform::scale(1.5));
    container.update();

    assert_eq!(container.version(), before + 1);
}

#[test]
fn test_zoom_is_free_without_redraw_on_scale() {
    let mut container = boxed(Rect::new(0.0, 0.0, 16.0, 16.0)).redraw_on_scale(false);
    container.update();
    let before = container.version();

    for zoom in [2.0, 0.5, 3.0] {
        container.set_child_transform(Transform::scale(zoom));
        container.update();
    }

    assert_eq!(container.version(), before);
}

#[test]
fn test_uncached_container_redraws_every_frame() {
    let element = BoxElement::new(Rect::new(0.0, 0.0, 8.0, 8.0), Color::WHITE);
    let mut container = OutlineContainer::new_uncached(element);

    let mut versions = Vec::new();
    for _ in 0..4 {
        container.update();
        versions.push(container.snapshot().version);
    }

    assert!(versions.windows(2).all(|pair| pair[1] == pair[0] + 1));
}

#[test]
fn test_pass_counts_for_widths() {
    let passes = |width: f32| {
        let container = boxed(Rect::new(0.0, 0.0, 8.0, 8.0)).width(width);
        pass_schedule(container.snapshot().start_size).count()
    };

    assert_eq!(passes(0.0), 0);
    assert_eq!(passes(10.0), 5);
    assert_eq!(passes(200.0), 8);
}

#[test]
fn test_frame_buffer_scale_keeps_pass_count() {
    for scale in [0.5, 2.0, 4.0] {
        let container = boxed(Rect::new(0.0, 0.0, 8.0, 8.0))
            .width(10.0)
            .frame_buffer_scale(Vector2::new(scale, scale));
        let state = container.snapshot();

        assert_eq!(pass_schedule(state.pass_start_size()).count(), 5);
    }
}

#[test]
fn test_snapshot_is_isolated_from_later_updates() {
    let mut container = boxed(Rect::new(0.0, 0.0, 20.0, 20.0)).width(4.0);
    container.update();

    let (tx, rx) = mpsc::channel::<OutlineDrawState>();
    let (done_tx, done_rx) = mpsc::channel();

    let draw_thread = thread::spawn(move || {
        let state = rx.recv().unwrap();
        // Wait until the update side has moved on
        done_rx.recv().unwrap();
        (state.version, state.outline_width, state.draw_rectangle)
    });

    let sent = container.snapshot();
    let expected = (sent.version, sent.outline_width, sent.draw_rectangle);
    tx.send(sent).unwrap();

    container.set_outline_width(12.0);
    container.set_outline_colour(Color::BLACK);
    container.update();
    done_tx.send(()).unwrap();

    assert_eq!(draw_thread.join().unwrap(), expected);
    assert_ne!(container.snapshot().version, expected.0);
}

#[test]
fn test_dispose_is_idempotent() {
    let mut container = boxed(Rect::new(0.0, 0.0, 8.0, 8.0));
    let node = container.create_draw_node();

    container.dispose();
    container.dispose();
    drop(container);

    assert!(node.is_disposed());
}

#[test]
fn test_effect_applies_to_image_element() {
    let image = image::RgbaImage::from_pixel(6, 4, image::Rgba([255, 255, 255, 255]));
    let container =
        ImageElement::new(image, 2.0, 2.0).with_outline(OutlineEffect::new(2.0, Color::BLACK));

    assert_eq!(container.child_masking_bounds(), Rect::new(2.0, 2.0, 6.0, 4.0));
    assert_eq!(
        container.screen_space_draw_quad().aabb(),
        Rect::new(0.0, 0.0, 10.0, 8.0)
    );
}
