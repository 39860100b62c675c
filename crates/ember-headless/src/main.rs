//! Ember Headless - runs the engine without a window
//!
//! Plays an attract-mode session (menu, a timed run, game over, repeat) for a
//! fixed number of frames and prints a summary. Useful as a smoke test for
//! the whole frame loop.
//!
//! Usage:
//!   ember-headless [--config <engine.toml>] [--frames N] [--fps F] [--realtime]

mod attract;

use anyhow::{Context, Result};
use attract::Attract;
use clap::Parser;
use ember_engine::{Engine, EngineConfig, HeadlessHost, Host, MemoryLeaderboard, PacedHost};
use ember_runtime::GameEvent;
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "ember-headless")]
#[command(about = "Run an Ember attract-mode session without a window")]
struct Args {
    /// Engine config (TOML). Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to run
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Frame rate of the simulated (or paced) host
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Pace frames against the wall clock instead of simulating time
    #[arg(long)]
    realtime: bool,

    /// Seconds of play per run
    #[arg(long, default_value_t = 6.0)]
    round_length: f32,
}

/// What a session did
struct Summary {
    frames: u64,
    game_time: f64,
    fps: f64,
    runs: u32,
    best_score: i64,
    particles: usize,
    particles_dropped: u64,
    final_state: String,
}

fn run_session<H: Host>(host: H, config: EngineConfig, round_length: f32) -> Result<Summary> {
    let mut engine = Engine::new(host, Attract { round_length });
    engine.scene_mut().ctx.leaderboard = Box::new(MemoryLeaderboard::new());
    engine.init(config).context("Failed to initialize engine")?;

    let runs = Rc::new(Cell::new(0u32));
    let best = Rc::new(Cell::new(i64::MIN));
    {
        let (runs, best) = (Rc::clone(&runs), Rc::clone(&best));
        engine
            .scene()
            .ctx
            .events
            .on(GameEvent::GAME_OVER, move |event| {
                if let GameEvent::GameOver { score } = event {
                    runs.set(runs.get() + 1);
                    best.set(best.get().max(*score));
                }
            });
    }

    engine.run().context("Engine loop failed")?;

    let scene = engine.scene();
    Ok(Summary {
        frames: engine.timer().frame_count(),
        game_time: engine.timer().game_time(),
        fps: engine.fps(),
        runs: runs.get(),
        best_score: if runs.get() > 0 { best.get() } else { 0 },
        particles: scene.ctx.particles.len(),
        particles_dropped: scene.ctx.particles.dropped(),
        final_state: scene.current_state().unwrap_or("<none>").to_string(),
    })
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    log::info!(
        "running {} frame(s) at {} fps ({})",
        args.frames,
        args.fps,
        if args.realtime { "paced" } else { "simulated" }
    );

    let summary = if args.realtime {
        let host = PacedHost::new(args.fps).with_frame_limit(args.frames);
        run_session(host, config, args.round_length)?
    } else {
        let host = HeadlessHost::new(args.fps).with_frame_limit(args.frames);
        run_session(host, config, args.round_length)?
    };

    println!("Frames:            {}", summary.frames);
    println!("Game time:         {:.2}s", summary.game_time);
    println!("FPS (smoothed):    {:.1}", summary.fps);
    println!("Runs completed:    {}", summary.runs);
    println!("Best score:        {}", summary.best_score);
    println!("Live particles:    {}", summary.particles);
    println!("Dropped particles: {}", summary.particles_dropped);
    println!("Final state:       {}", summary.final_state);

    Ok(())
}
