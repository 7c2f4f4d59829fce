//! Headless driver for the motion engine: runs a scripted input session,
//! prints plane state at intervals and reports rasterizer cost.

use std::time::{Duration, Instant};

use depth_gallery::gallery::{ImageItem, ImageLibrary, Texture};
use depth_gallery::motion::{
    ArrowKey, DeviceClass, EnvelopePreset, FrameOutcome, GalleryOptions, InputEvent, MotionEngine,
};
use depth_gallery::raster::SceneRasterizer;

struct Args {
    frames: usize,
    images: usize,
    visible: usize,
    spacing: f32,
    preset: EnvelopePreset,
    compact: bool,
    every: usize,
    w: usize,
    h: usize,
    script: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        frames: 600,
        images: 12,
        visible: 8,
        spacing: 4.0,
        preset: EnvelopePreset::Tight,
        compact: false,
        every: 60,
        w: 160,
        h: 88,
        script: true,
    };

    let argv = std::env::args().skip(1).collect::<Vec<_>>();
    let mut i = 0usize;
    while i < argv.len() {
        let k = argv[i].as_str();
        let v = argv.get(i + 1).map(|s| s.as_str());
        match (k, v) {
            ("--frames", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.frames = n.max(1);
                }
                i += 2;
            }
            ("--images", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.images = n;
                }
                i += 2;
            }
            ("--visible", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.visible = n;
                }
                i += 2;
            }
            ("--spacing", Some(x)) => {
                if let Ok(v) = x.parse::<f32>() {
                    args.spacing = v;
                }
                i += 2;
            }
            ("--preset", Some(x)) => {
                if let Some(p) = EnvelopePreset::parse(x) {
                    args.preset = p;
                }
                i += 2;
            }
            ("--every", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.every = n.max(1);
                }
                i += 2;
            }
            ("--w", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.w = n.max(1);
                }
                i += 2;
            }
            ("--h", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.h = n.max(1);
                }
                i += 2;
            }
            ("--compact", _) => {
                args.compact = true;
                i += 1;
            }
            ("--no-script", _) => {
                args.script = false;
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }
    args
}

/// Scroll forward for a second, back for half a second, then go idle so
/// autoplay takes over again.
fn scripted_input(frame: usize) -> Option<InputEvent> {
    match frame {
        30..=89 if frame % 6 == 0 => Some(InputEvent::Wheel { delta_y: 120.0 }),
        120..=149 if frame % 5 == 0 => Some(InputEvent::Key(ArrowKey::Up)),
        200 => Some(InputEvent::TouchStart),
        201..=230 => Some(InputEvent::TouchMove),
        _ => None,
    }
}

fn synthetic_library(n: usize) -> ImageLibrary {
    let items = (0..n)
        .map(|i| ImageItem::parse(&format!("synthetic-{i}.png|frame {i}")))
        .collect();
    let textures = (0..n)
        .map(|i| {
            let hue = (i * 47 % 255) as u8;
            Texture::placeholder((hue, 255 - hue, 160))
        })
        .collect();
    ImageLibrary::from_parts(items, textures)
}

fn main() {
    let args = parse_args();
    let library = synthetic_library(args.images);
    let mut options = GalleryOptions::with_preset(args.preset);
    options.visible_count = args.visible;
    options.z_spacing = Some(args.spacing);

    let device = if args.compact {
        DeviceClass::Compact
    } else {
        DeviceClass::Regular
    };
    let mut now = Instant::now();
    let mut engine = MotionEngine::new(options, library.len(), device, now);
    let mut raster = SceneRasterizer::new(args.w, args.h, 1.0);

    println!(
        "motion trace: frames={} images={} slots={} depth={:.1} advance={} preset={}",
        args.frames,
        library.len(),
        engine.slot_count(),
        engine.depth_range(),
        engine.image_advance(),
        args.preset.label()
    );

    let dt = 1.0 / 60.0;
    let mut skipped = 0usize;
    let mut drawn_total = 0usize;
    let mut raster_time = Duration::ZERO;

    for f in 0..args.frames {
        now += Duration::from_secs_f32(dt);
        if args.script {
            if let Some(ev) = scripted_input(f) {
                engine.send(ev);
            }
        }
        if engine.tick(now, dt) == FrameOutcome::Skipped {
            skipped += 1;
        }

        let t0 = Instant::now();
        drawn_total += raster.draw(engine.visuals(), &library);
        raster_time += t0.elapsed();

        if f % args.every == 0 {
            println!(
                "frame {:>5}  vel={:>6.3}  auto={}",
                f,
                engine.velocity(),
                if engine.autoplay() { "on " } else { "off" }
            );
            for v in engine.visuals() {
                println!(
                    concat!(
                        "  slot {:>2}  img {:>3}  z={:>7.2}  ",
                        "pos=({:>6.2},{:>6.2})  opacity={:.3}  blur={:.3}"
                    ),
                    v.slot,
                    v.image_index,
                    v.position[2],
                    v.position[0],
                    v.position[1],
                    v.opacity,
                    v.blur
                );
            }
        }
    }

    let ms = raster_time.as_secs_f64() * 1000.0 / args.frames as f64;
    println!(
        "raster: {:>8.3} ms/frame  planes drawn avg={:.2}  skipped={}",
        ms,
        drawn_total as f64 / args.frames as f64,
        skipped
    );
}
