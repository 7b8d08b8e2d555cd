use clap::Parser;
use particle_pulse::mapping::ControlMapper;
use particle_pulse::presets::PresetLibrary;
use particle_pulse::report::RunReport;
use particle_pulse::{ParticleEngine, SyntheticAudio};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "particle-pulse")]
#[command(about = "Headless audio-reactive particle simulation")]
struct Args {
    // === Engine ===
    /// Maximum live particles (pool capacity)
    #[arg(short = 'p', long, default_value = "1000")]
    particles: usize,

    /// Canvas width in pixels
    #[arg(long, default_value = "1920")]
    width: f32,

    /// Canvas height in pixels
    #[arg(long, default_value = "1080")]
    height: f32,

    /// Seed for the emitter's random numbers (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    // === Run ===
    /// Number of frames to simulate
    #[arg(short = 'n', long, default_value = "600")]
    frames: u64,

    /// Time step per frame (1.0 = one nominal frame)
    #[arg(long, default_value = "1.0")]
    dt: f32,

    /// Nominal frame rate the synthetic audio is paced against
    #[arg(long, default_value = "60")]
    fps: f32,

    /// Tempo of the synthetic kick drum
    #[arg(long, default_value = "120")]
    bpm: f32,

    /// Run without audio input
    #[arg(long, default_value = "false")]
    silent: bool,

    // === Physics ===
    /// Built-in preset (fountain, vortex, smoke, implode, pinball)
    #[arg(long)]
    preset: Option<String>,

    /// Force field (gravity, magnetism, turbulence, orbital)
    #[arg(short = 'm', long)]
    mode: Option<String>,

    /// Boundary behavior (wrap, bounce)
    #[arg(short = 'b', long)]
    boundary: Option<String>,

    /// Switch to the next force field every N frames (0 = never)
    #[arg(long = "cycle-every", default_value = "0")]
    cycle_every: u64,

    /// Parameter overrides as path=value (e.g. physics.gravityY=0.3)
    #[arg(long = "set", value_name = "PATH=VALUE")]
    overrides: Vec<String>,

    // === Output ===
    /// Render budget used when sampling for display
    #[arg(long = "lod", default_value = "500")]
    lod_max: usize,

    /// Log stats every N frames (0 = only at the end)
    #[arg(long = "log-every", default_value = "60")]
    log_every: u64,

    /// Print stats as JSON lines on stdout instead of logging them
    #[arg(long, default_value = "false")]
    json: bool,

    /// Write a JSON run summary to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// List built-in presets and exit
    #[arg(long = "list-presets", default_value = "false")]
    list_presets: bool,
}

/// Split a `path=value` override. Malformed entries are skipped with a warning.
fn parse_override(s: &str) -> Option<(&str, f32)> {
    let Some((path, value)) = s.split_once('=') else {
        log::warn!("ignoring override `{}`: expected PATH=VALUE", s);
        return None;
    };
    match value.trim().parse::<f32>() {
        Ok(v) => Some((path.trim(), v)),
        Err(_) => {
            log::warn!("ignoring override `{}`: `{}` is not a number", s, value);
            None
        }
    }
}

fn build_engine(args: &Args) -> ParticleEngine {
    let particles = args.particles.max(1);
    match args.seed {
        Some(seed) => ParticleEngine::with_seed(particles, args.width, args.height, seed),
        None => ParticleEngine::new(particles, args.width, args.height),
    }
}

fn print_stats(engine: &ParticleEngine, displayed: usize, json: bool) -> Result<(), serde_json::Error> {
    let stats = engine.stats();
    if json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        log::info!(
            "frame {}: {} / {} active ({:.1}%), {} cells, {} displayed, mode {}",
            stats.frame,
            stats.active,
            stats.capacity,
            stats.utilization,
            stats.occupied_cells,
            displayed,
            engine.settings.physics.mode.map_or("none", |m| m.name())
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let library = PresetLibrary::new();
    if args.list_presets {
        for preset in &library.builtin {
            println!("{:<10} {}", preset.name, preset.description);
        }
        return Ok(());
    }

    let mut engine = build_engine(&args);
    let mapper = ControlMapper::new();

    // Preset first, then individual flags on top of it
    if let Some(name) = &args.preset {
        match library.find(name) {
            Some(preset) => preset.apply_to(&mut engine.settings),
            None => log::warn!(
                "unknown preset `{}`, available: {}",
                name,
                library.preset_names().join(", ")
            ),
        }
    }
    if let Some(mode) = &args.mode {
        mapper.write_mode(&mut engine.settings, mode);
    }
    if let Some(boundary) = &args.boundary {
        mapper.write_boundary(&mut engine.settings, boundary);
    }
    for (path, value) in args.overrides.iter().filter_map(|s| parse_override(s)) {
        mapper.write(&mut engine.settings, path, value);
    }

    log::info!(
        "running {} frames, capacity {}, canvas {}x{}, {} boundary",
        args.frames,
        engine.capacity(),
        args.width,
        args.height,
        engine.settings.physics.boundary.name()
    );

    let mut audio = SyntheticAudio::new(args.bpm, args.fps);
    let mut report = RunReport::new(engine.settings.clone(), engine.stats());

    for frame in 1..=args.frames {
        let spawned = if args.silent {
            engine.frame(args.dt, None)
        } else {
            let audio_frame = audio.next_frame();
            engine.frame(args.dt, Some(&audio_frame))
        };
        report.record_frame(spawned, engine.active_count());

        if args.cycle_every > 0 && frame % args.cycle_every == 0 {
            engine.settings.physics.cycle_mode();
            log::debug!(
                "switched to {}",
                engine.settings.physics.mode.map_or("none", |m| m.name())
            );
        }

        if args.log_every > 0 && frame % args.log_every == 0 {
            let displayed = engine.sample_for_display(args.lod_max).len();
            print_stats(&engine, displayed, args.json)?;
        }
    }

    let displayed = engine.sample_for_display(args.lod_max).len();
    print_stats(&engine, displayed, args.json)?;

    if let Some(path) = &args.report {
        report.final_stats = engine.stats();
        report.settings = engine.settings.clone();
        report.save_to_file(path)?;
        log::info!("wrote run report to {}", path.display());
    }

    Ok(())
}
