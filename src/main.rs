//! Desktop simulator: plays the watch host with an SDL2 window

use fireworks_face::display::{Display, InputEvent, RenderTarget};
use fireworks_face::{Bitmap, Color8, Face, FaceConfig, FrameClock, Mode};
use log::{info, warn, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sdl2::keyboard::Keycode;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Minimal stderr logger; the level is set from `--verbose`
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

struct Args {
    config: Option<PathBuf>,
    seed: Option<u64>,
    scale: u32,
    spirograph: bool,
    verbose: bool,
}

/// Parse command line arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        config: None,
        seed: None,
        scale: 3,
        spirograph: false,
        verbose: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    parsed.config = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            },
            "--seed" => {
                if i + 1 < args.len() {
                    if let Ok(seed) = args[i + 1].parse::<u64>() {
                        parsed.seed = Some(seed);
                    }
                    i += 1;
                }
            },
            "--scale" | "-s" => {
                if i + 1 < args.len() {
                    if let Ok(scale) = args[i + 1].parse::<u32>() {
                        parsed.scale = scale.clamp(1, 8);
                    }
                    i += 1;
                }
            },
            "--spirograph" => parsed.spirograph = true,
            "--verbose" | "-v" => parsed.verbose = true,
            "--help" => {
                println!("Usage: fireworks-face [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --config FILE, -c FILE  Load face settings from a JSON file");
                println!("  --seed N                Fixed random seed");
                println!("  --scale N, -s N         Window pixels per panel pixel (default: 3)");
                println!("  --spirograph            Start in spirograph mode");
                println!("  --verbose, -v           Debug logging");
                println!("  --help                  Show this help message");
                std::process::exit(0);
            },
            other => eprintln!("Ignoring unknown argument {}", other),
        }
        i += 1;
    }

    parsed
}

fn main() -> Result<(), String> {
    let args = parse_args();

    log::set_logger(&LOGGER).map_err(|e| e.to_string())?;
    log::set_max_level(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let mut config = match &args.config {
        Some(path) => FaceConfig::load(path).unwrap_or_else(|e| {
            warn!("failed to load {}: {}, using defaults", path.display(), e);
            FaceConfig::default()
        }),
        None => FaceConfig::default(),
    };
    if args.spirograph {
        config.mode = Mode::Spirograph;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate().map_err(|e| e.to_string())?;

    let seed = config.seed.unwrap_or_else(rand::random);
    info!("seed {}", seed);

    let (width, height) = (config.width, config.height);
    let (mut display, texture_creator) =
        Display::with_options("fireworks-face", width as u32, height as u32, args.scale)?;
    let mut target = RenderTarget::with_size(&texture_creator, width as u32, height as u32)?;

    let mut framebuffer = vec![Color8::BLACK.argb(); config.buffer_len()];
    let mut bitmap =
        Bitmap::with_size(&mut framebuffer, width, height).map_err(|e| e.to_string())?;
    let mut face =
        Face::initialize(config, StdRng::seed_from_u64(seed)).map_err(|e| e.to_string())?;

    let mut clock = FrameClock::new(60);
    let mut show_fps = false;

    println!("=== fireworks-face ===");
    println!("Panel: {}x{} at {}x scale", width, height, args.scale);
    println!("Use --help for command line options.");
    println!("Controls:");
    println!("  Space  - Toggle fireworks / spirograph");
    println!("  R      - Reset the face");
    println!("  F      - Log frame rate");
    println!("  Escape - Quit");

    'main: loop {
        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::KeyDown(key) => match key {
                    Keycode::Escape => break 'main,
                    Keycode::Space => face.set_mode(face.mode().toggled()),
                    Keycode::R => {
                        face.reset().map_err(|e| e.to_string())?;
                        bitmap.fill(Color8::BLACK);
                    },
                    Keycode::F => show_fps = !show_fps,
                    _ => {},
                },
            }
        }

        let now = Instant::now();
        if clock.is_due(now) {
            let (_dt, avg_fps) = clock.tick_at(now);
            face.on_frame(&mut bitmap, &mut clock);
            if show_fps && face.frames() % 20 == 0 {
                info!(
                    "{}: {:.1} fps, {:.1} ms/frame",
                    face.effect_name(),
                    avg_fps,
                    clock.avg_frame_time_ms()
                );
            }
        }

        if clock.take_dirty() {
            display.present(&mut target, &bitmap)?;
        }

        // Sleep until the next tick, waking often enough to stay responsive
        let wait = clock.time_until_due(Instant::now());
        std::thread::sleep(wait.min(Duration::from_millis(10)));
    }

    Ok(())
}
