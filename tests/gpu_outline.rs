//! Headless rendering tests. Each test skips itself when no adapter is available.

use outline_effect::prelude::*;

const SIZE: u32 = 128;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn target() -> Option<HeadlessTarget> {
    init_logging();
    match HeadlessTarget::new(SIZE, SIZE) {
        Ok(target) => Some(target),
        Err(err) => {
            eprintln!("Skipping GPU test: {err}");
            None
        }
    }
}

fn blue_box(width: f32) -> OutlineContainer<BoxElement> {
    OutlineContainer::new(BoxElement::new(
        Rect::new(54.0, 54.0, 20.0, 20.0),
        Color::rgb(0.0, 0.0, 1.0),
    ))
    .width(width)
    .colour(Color::rgb(1.0, 0.0, 0.0))
}

fn pixel(image: &image::RgbaImage, x: u32, y: u32) -> [u8; 4] {
    image.get_pixel(x, y).0
}

#[test]
fn test_outline_surrounds_element() {
    let Some(mut target) = target() else { return };

    let mut container = blue_box(4.0);
    container.update();
    let state = container.snapshot();
    let mut node = container.create_draw_node();

    let mut report = DrawReport::default();
    target.frame(|renderer| report = node.draw(renderer, &state));
    let image = target.read_image().unwrap();

    assert!(report.redrawn);
    assert_eq!(report.jump_flood_passes, 3);
    assert!(report.outline_drawn);

    // Two pixels left of the box: inside the outline
    assert_eq!(pixel(&image, 52, 64), [255, 0, 0, 255]);
    // Centre of the box: contents drawn over the outline
    assert_eq!(pixel(&image, 64, 64), [0, 0, 255, 255]);
    // Well outside the inflated quad
    assert_eq!(pixel(&image, 40, 64), [0, 0, 0, 0]);
}

#[test]
fn test_zero_width_matches_plain_render() {
    let Some(mut target) = target() else { return };

    let element = BoxElement::new(Rect::new(54.0, 54.0, 20.0, 20.0), Color::rgb(0.0, 0.0, 1.0));
    let content = element.content();
    let stats = target.frame(|renderer| content.paint(renderer));
    assert_eq!(stats.draw_calls, 1);
    let plain = target.read_image().unwrap();

    let mut container = blue_box(0.0);
    container.update();
    let state = container.snapshot();
    let mut node = container.create_draw_node();
    let stats = target.frame(|renderer| {
        node.draw(renderer, &state);
    });
    let outlined = target.read_image().unwrap();

    assert_eq!(stats.jump_flood_draws, 0);
    assert_eq!(stats.outline_draws, 0);
    assert_eq!(pixel(&outlined, 64, 64), pixel(&plain, 64, 64));
    assert_eq!(pixel(&outlined, 52, 64), pixel(&plain, 52, 64));
    assert_eq!(pixel(&outlined, 54, 54), pixel(&plain, 54, 54));
}

#[test]
fn test_pass_count_and_cached_redraw() {
    let Some(mut target) = target() else { return };

    let mut container = blue_box(10.0);
    container.update();
    let state = container.snapshot();
    let mut node = container.create_draw_node();

    let first = target.frame(|renderer| {
        node.draw(renderer, &state);
    });
    assert_eq!(first.jump_flood_draws, 5);
    assert_eq!(first.outline_draws, 1);

    // Same version: the cached field is reused
    container.update();
    let state = container.snapshot();
    let second = target.frame(|renderer| {
        node.draw(renderer, &state);
    });
    assert_eq!(second.jump_flood_draws, 0);
    assert_eq!(second.outline_draws, 1);
    assert_eq!(node.last_drawn_version(), Some(state.version));
}

#[test]
fn test_frame_buffer_scale_keeps_pass_count() {
    let Some(mut target) = target() else { return };

    let mut container = blue_box(10.0).frame_buffer_scale(Vector2::new(2.0, 2.0));
    container.update();
    let state = container.snapshot();
    let mut node = container.create_draw_node();

    let mut report = DrawReport::default();
    let stats = target.frame(|renderer| report = node.draw(renderer, &state));

    assert_eq!(report.jump_flood_passes, 5);
    assert_eq!(stats.jump_flood_draws, 5);
    assert!(report.outline_drawn);
}

#[test]
fn test_blend_state_is_restored_after_drawing() {
    let Some(mut target) = target() else { return };

    let mut container = blue_box(4.0).effect_blending(BlendingParameters::ADDITIVE);
    container.update();
    let state = container.snapshot();
    let mut node = container.create_draw_node();

    target.frame(|renderer| {
        let before = renderer.blend();
        {
            let scoped = renderer.blend_state(BlendingParameters::NONE);
            assert_eq!(scoped.blend(), BlendingParameters::NONE);
        }
        assert_eq!(renderer.blend(), before);

        node.draw(renderer, &state);
        assert_eq!(renderer.blend(), before);
    });
}

#[test]
fn test_forced_redraw_is_deterministic() {
    let Some(mut target) = target() else { return };

    let mut container = blue_box(6.0);
    container.update();
    let mut node = container.create_draw_node();

    let state = container.snapshot();
    target.frame(|renderer| {
        node.draw(renderer, &state);
    });
    let first = target.read_texels(node.field()).unwrap();

    container.force_redraw();
    let state = container.snapshot();
    let stats = target.frame(|renderer| {
        node.draw(renderer, &state);
    });
    let second = target.read_texels(node.field()).unwrap();

    assert_eq!(stats.jump_flood_draws, 4);
    assert_eq!(first, second);
}

#[test]
fn test_disposed_node_skips_drawing() {
    let Some(mut target) = target() else { return };

    let mut container = blue_box(4.0);
    container.update();
    let state = container.snapshot();
    let mut node = container.create_draw_node();
    container.dispose();

    let stats = target.frame(|renderer| {
        node.draw(renderer, &state);
    });

    assert_eq!(stats.draw_calls, 0);
    assert!(!node.main_buffer().is_allocated());
}
