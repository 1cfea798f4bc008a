//! Shape Bounce headless runner
//!
//! Spawns shapes on a virtual canvas, runs the animation and collision
//! threads, and logs statistics once per second until the time limit or
//! Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use shape_bounce::monitor::ChannelEventLogger;
use shape_bounce::platform::{Canvas, RedrawCounter};
use shape_bounce::settings::SpawnGroup;
use shape_bounce::sim::ShapeKind;
use shape_bounce::{Result, Settings, Simulation};

#[derive(Debug, Parser)]
#[command(name = "shape-bounce", version, about = "Concurrent 2D shape motion and collision")]
struct Args {
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Canvas width
    #[arg(long)]
    width: Option<f64>,

    /// Canvas height
    #[arg(long)]
    height: Option<f64>,

    /// Number of shapes to spawn (replaces the configured groups)
    #[arg(long)]
    count: Option<u32>,

    /// Shape for --count (circle, rectangle, triangle or random)
    #[arg(long, default_value = "random")]
    shape: String,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many seconds (runs until Ctrl-C when absent)
    #[arg(long)]
    seconds: Option<u64>,

    /// Restore entities from a save file before starting
    #[arg(long)]
    load: Option<PathBuf>,

    /// Save entities here on exit
    #[arg(long)]
    save: Option<PathBuf>,
}

fn settings_from(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    if let Some(w) = args.width {
        settings.canvas_width = w;
    }
    if let Some(h) = args.height {
        settings.canvas_height = h;
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    if let Some(count) = args.count {
        settings.initial = vec![SpawnGroup {
            shape: args.shape.clone(),
            count,
        }];
    }

    settings.validate()?;
    Ok(settings)
}

fn spawn_initial(sim: &Simulation, settings: &Settings) {
    for group in &settings.initial {
        if group.shape.eq_ignore_ascii_case("random") {
            sim.spawn_batch(group.count as usize);
            continue;
        }
        let kind: ShapeKind = group.kind();
        for _ in 0..group.count {
            sim.spawn_random(kind);
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let settings = settings_from(&args)?;
    log::info!(
        "Shape Bounce starting ({}x{} canvas)",
        settings.canvas_width,
        settings.canvas_height
    );

    let (events, writer) = ChannelEventLogger::spawn(settings.event_queue_capacity)?;
    let event_stats = events.stats();
    let redraws = Arc::new(RedrawCounter::default());
    let canvas = Arc::new(Canvas::new(settings.canvas_width, settings.canvas_height));

    let mut sim = Simulation::new(&settings, canvas, redraws.clone(), Arc::new(events));

    if let Some(path) = &args.load {
        sim.restore(path)?;
    }
    spawn_initial(&sim, &settings);

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        if let Err(e) = ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst)) {
            log::warn!("Could not install Ctrl-C handler: {e}");
        }
    }

    sim.start()?;

    let deadline = args.seconds.map(|s| Instant::now() + Duration::from_secs(s));
    let mut next_report = Instant::now() + Duration::from_secs(1);
    while !interrupted.load(Ordering::SeqCst) {
        let now = Instant::now();
        if deadline.is_some_and(|d| now >= d) {
            break;
        }
        if now >= next_report {
            log::info!(
                "entities={} colliding={} redraws={} scans={}",
                sim.len(),
                sim.colliding_count(),
                redraws.count(),
                sim.scans()
            );
            next_report += Duration::from_secs(1);
        }
        thread::sleep(Duration::from_millis(50));
    }

    sim.shutdown();

    if let Some(path) = &args.save {
        sim.save(path)?;
    }

    // Dropping the simulation releases the last logger handle
    drop(sim);
    if writer.join().is_err() {
        log::error!("event-log thread panicked");
    }
    log::info!("Events: {}", event_stats.summary());
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
