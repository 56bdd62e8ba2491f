//! Floating labels demo
//!
//! Runs a scripted scene against an in-memory frame and checks after every
//! frame that undrawing left the frame exactly as the world painted it.
//! Built with the `sdl` feature, `--window` opens an SDL2 window instead:
//! click to spawn damage numbers, Space toggles a dialog context, arrow
//! keys scroll the map, Escape quits.
//!
//! Set `RUST_LOG=debug` to watch contexts come and go.

use floating_labels::{
    Alignment, Anchor, Color, FloatingLabel, LabelConfig, LabelService, ManualClock, PixelBuffer, Surface,
};
use floating_labels::{BitmapFont, FontSize, Rect};

const FRAME_MS: u32 = 50;
const FRAMES: u32 = 60;

fn main() -> Result<(), String> {
    env_logger::init();

    let config = LabelConfig::load_or_default();

    #[cfg(feature = "sdl")]
    if std::env::args().any(|arg| arg == "--window") {
        return window::run(&config);
    }

    run_headless(&config)
}

/// Checkerboard standing in for the rendered map
fn paint_world<S: Surface>(frame: &mut S) -> Result<(), String> {
    const TILE: u32 = 16;
    frame.fill_rect(None, Color::rgb(34, 48, 30)).map_err(|e| e.to_string())?;

    for ty in 0..frame.height().div_ceil(TILE) {
        for tx in 0..frame.width().div_ceil(TILE) {
            if (tx + ty) % 2 == 0 {
                let tile = Rect::new((tx * TILE) as i32, (ty * TILE) as i32, TILE, TILE);
                frame.fill_rect(Some(tile), Color::rgb(46, 66, 40)).map_err(|e| e.to_string())?;
            }
        }
    }
    Ok(())
}

fn damage_number<S: Surface>(amount: i32, x: f64, y: f64) -> FloatingLabel<S> {
    FloatingLabel::new(format!("-{}", amount))
        .with_font_size(FontSize::Normal)
        .with_color(Color::rgb(255, 80, 60))
        .with_position(x, y)
        .with_velocity(0.0, -0.04)
        .with_anchor(Anchor::Map)
}

fn run_headless(config: &LabelConfig) -> Result<(), String> {
    let clock = ManualClock::new();
    let mut labels = LabelService::new(BitmapFont::new(), clock.clone(), config);

    let viewport = config.viewport();
    let mut world = PixelBuffer::new(viewport.w, viewport.h);
    paint_world(&mut world)?;
    let mut frame = world.clone();

    labels.push_context();
    labels.add(
        FloatingLabel::from_config("Welcome to the <b>demo</b>", config)
            .with_position(f64::from(viewport.w) / 2.0, 8.0)
            .with_lifetime(2_000, 0),
    );
    let status = labels.add(
        FloatingLabel::new("STATUS: EXPLORING")
            .with_alignment(Alignment::Left)
            .with_background(Color::BLACK, 180)
            .with_border(3)
            .with_position(4.0, f64::from(viewport.h) - 24.0),
    );

    let mut dialog_open = false;
    let mut peak_labels = 0;

    for n in 0..FRAMES {
        clock.set(n * FRAME_MS);

        match n {
            5 | 12 | 19 => {
                let x = f64::from(40 + n * 10);
                labels.add(damage_number(n as i32 + 3, x, 120.0).with_lifetime(1_000, n * FRAME_MS));
            }
            25 => {
                labels.push_context();
                labels.add(
                    FloatingLabel::new("Dialog open, the map labels are frozen")
                        .with_background(Color::rgb(20, 20, 60), 220)
                        .with_border(4)
                        .with_position(f64::from(viewport.w) / 2.0, 60.0),
                );
                dialog_open = true;
            }
            40 => {
                labels.pop_context();
                dialog_open = false;
                labels.move_label(status, 0.0, -10.0);
            }
            _ => {}
        }

        // Map drifts one pixel left per frame
        labels.scroll(-1.0, 0.0);

        labels.draw_all(&mut frame);
        let painted = frame.pixels().iter().zip(world.pixels()).filter(|(a, b)| a != b).count();
        peak_labels = peak_labels.max(labels.len());

        labels.undraw_all(&mut frame);
        if frame != world {
            return Err(format!("frame {} was not restored after undrawing", n));
        }

        log::debug!(
            "frame {:>2}: {} labels, {} pixels painted{}",
            n,
            labels.len(),
            painted,
            if dialog_open { ", dialog open" } else { "" }
        );
    }

    labels.pop_context();

    println!("✓ {} frames drawn and restored", FRAMES);
    println!("  - Peak label count: {}", peak_labels);
    println!("  - Labels left after closing every context: {}", labels.len());
    Ok(())
}

#[cfg(feature = "sdl")]
mod window {
    use sdl2::event::Event;
    use sdl2::keyboard::Keycode;
    use sdl2::mouse::MouseButton;

    use floating_labels::{
        BitmapFont, Clock, Color, FloatingLabel, LabelConfig, LabelService, SdlSurface, Surface, SystemClock,
    };

    use super::{damage_number, paint_world};

    const SCROLL_STEP: f64 = 8.0;

    pub fn run(config: &LabelConfig) -> Result<(), String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let viewport = config.viewport();
        let window = video_subsystem
            .window("Floating Labels", viewport.w * 2, viewport.h * 2)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let mut canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        canvas.set_logical_size(viewport.w, viewport.h).map_err(|e| e.to_string())?;

        let texture_creator = canvas.texture_creator();
        let mut event_pump = sdl_context.event_pump()?;

        let mut frame = SdlSurface::create(viewport.w, viewport.h).map_err(|e| e.to_string())?;
        paint_world(&mut frame)?;

        let mut labels = LabelService::new(BitmapFont::new(), SystemClock::new(), config);
        labels.push_context();
        let mut hits = 0;

        println!("Controls:");
        println!("Click  - Spawn a damage number");
        println!("Space  - Open/close a dialog");
        println!("Arrows - Scroll the map");
        println!("Escape - Quit");

        'running: loop {
            for event in event_pump.poll_iter() {
                match event {
                    Event::Quit { .. }
                    | Event::KeyDown {
                        keycode: Some(Keycode::Escape),
                        ..
                    } => break 'running,
                    Event::MouseButtonDown {
                        mouse_btn: MouseButton::Left,
                        x,
                        y,
                        ..
                    } => {
                        hits += 1;
                        let now = labels.clock().now();
                        labels.add(damage_number(hits, f64::from(x), f64::from(y)).with_lifetime(1_000, now));
                    }
                    Event::KeyDown {
                        keycode: Some(Keycode::Space),
                        repeat: false,
                        ..
                    } => {
                        if labels.context_depth() > 1 {
                            labels.pop_context();
                        } else {
                            labels.push_context();
                            labels.add(
                                FloatingLabel::new("Dialog (Space to close)")
                                    .with_background(Color::rgb(20, 20, 60), 220)
                                    .with_border(4)
                                    .with_position(f64::from(viewport.w) / 2.0, 40.0),
                            );
                        }
                    }
                    Event::KeyDown {
                        keycode: Some(key), ..
                    } => {
                        let (dx, dy) = match key {
                            Keycode::Left => (SCROLL_STEP, 0.0),
                            Keycode::Right => (-SCROLL_STEP, 0.0),
                            Keycode::Up => (0.0, SCROLL_STEP),
                            Keycode::Down => (0.0, -SCROLL_STEP),
                            _ => continue,
                        };
                        labels.scroll(dx, dy);
                    }
                    _ => {}
                }
            }

            labels.draw_all(&mut frame);

            let texture = texture_creator
                .create_texture_from_surface(frame.as_raw())
                .map_err(|e| e.to_string())?;
            canvas.copy(&texture, None, None)?;
            canvas.present();

            labels.undraw_all(&mut frame);

            std::thread::sleep(std::time::Duration::from_millis(16));
        }

        Ok(())
    }
}
