//! Render an outlined scene to a PNG.
//!
//! Run with: cargo run --example outline_png -- <scene> [output.png]
//!
//! Scenes: box, gradient, rotated, image, scaled. Without arguments every
//! scene is written to `outline_<scene>.png`.

use image::{Rgba, RgbaImage};
use outline_effect::prelude::*;

const SIZE: u32 = 256;
const SCENES: [&str; 5] = ["box", "gradient", "rotated", "image", "scaled"];

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let jobs: Vec<(String, String)> = match args.next() {
        Some(scene) => {
            let output = args.next().unwrap_or_else(|| format!("outline_{scene}.png"));
            vec![(scene, output)]
        }
        None => SCENES
            .iter()
            .map(|scene| (scene.to_string(), format!("outline_{scene}.png")))
            .collect(),
    };

    let mut target = match HeadlessTarget::new(SIZE, SIZE) {
        Ok(target) => target,
        Err(err) => {
            log::error!("Could not create a GPU target: {err}");
            std::process::exit(1);
        }
    };
    target.set_clear_colour(Color::rgb(0.1, 0.1, 0.15));

    for (scene, output) in jobs {
        if let Err(err) = render_scene(&mut target, &scene, &output) {
            log::error!("Scene '{scene}' failed: {err}");
            std::process::exit(1);
        }
        println!("Wrote {output}");
    }
}

fn render_scene(target: &mut HeadlessTarget, scene: &str, output: &str) -> Result<()> {
    let centre = SIZE as f32 / 2.0;

    match scene {
        "box" => draw(
            target,
            BoxElement::new(Rect::new(88.0, 98.0, 80.0, 60.0), Color::rgb(0.2, 0.4, 0.9))
                .with_outline(OutlineEffect::new(6.0, Color::WHITE)),
        ),
        "gradient" => draw(
            target,
            BoxElement::new(Rect::new(78.0, 78.0, 100.0, 100.0), Color::rgb(0.15, 0.15, 0.2))
                .with_outline(OutlineEffect::new(
                    12.0,
                    LinearGradient::horizontal(
                        Color::from_hex(0xFF6B6B),
                        Color::from_hex(0x4ECDC4),
                    ),
                )),
        ),
        "rotated" => {
            // Rotate about the centre of the target
            let transform = Transform::translate(centre, centre)
                .then(&Transform::rotate_degrees(30.0))
                .then(&Transform::translate(-centre, -centre));
            draw(
                target,
                BoxElement::new(Rect::new(93.0, 103.0, 70.0, 50.0), Color::rgb(0.9, 0.7, 0.2))
                    .transform(transform)
                    .with_outline(OutlineEffect::new(8.0, Color::BLACK)),
            )
        }
        "image" => {
            let ring = ring_image(96, 40.0, 24.0);
            draw(
                target,
                ImageElement::new(ring, centre - 48.0, centre - 48.0)
                    .with_outline(OutlineEffect::new(10.0, Color::LIGHT_CORAL)),
            )
        }
        "scaled" => {
            let element =
                BoxElement::new(Rect::new(88.0, 88.0, 80.0, 80.0), Color::rgb(0.3, 0.8, 0.4));
            let container = OutlineContainer::with_config(
                element,
                OutlineConfig {
                    outline_width: 8.0,
                    outline_colour: Color::WHITE.into(),
                    frame_buffer_scale: Vector2::new(0.5, 0.5),
                    ..Default::default()
                },
            );
            draw(target, container)
        }
        other => {
            log::warn!("Unknown scene '{other}', expected one of {SCENES:?}");
            return Ok(());
        }
    }

    target.read_image()?.save(output)?;
    Ok(())
}

fn draw<E: Element>(target: &mut HeadlessTarget, mut container: OutlineContainer<E>) {
    container.update();
    let state = container.snapshot();
    let mut node = container.create_draw_node();

    let stats = target.frame(|renderer| {
        node.draw(renderer, &state);
    });
    log::info!(
        "{} draws, {} jump flood passes, {} outline draws",
        stats.draw_calls,
        stats.jump_flood_draws,
        stats.outline_draws
    );
}

/// An antialiased ring, transparent outside.
fn ring_image(size: u32, outer: f32, inner: f32) -> RgbaImage {
    let centre = size as f32 / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let d = ((x as f32 + 0.5 - centre).powi(2) + (y as f32 + 0.5 - centre).powi(2)).sqrt();
        let coverage = (outer - d + 0.5).clamp(0.0, 1.0) * (d - inner + 0.5).clamp(0.0, 1.0);
        Rgba([255, 255, 255, (coverage * 255.0) as u8])
    })
}
