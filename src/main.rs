//! kinetic2d headless runner.
//!
//! Loads an INI configuration and a JSON scene (or generates a demo scene),
//! then steps the simulation for a fixed number of frames and logs physics
//! statistics.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --frames 600 --seed 42
//! RUST_LOG=debug cargo run -- --scene assets/scene.json --config config.ini
//! ```

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use kinetic2d::game::Game;
use kinetic2d::resources::gameconfig::GameConfig;
use kinetic2d::scene::SceneDescription;

/// kinetic2d headless physics runner
#[derive(Parser)]
#[command(version, about = "Runs a kinetic2d scene without a window and reports physics statistics.")]
struct Cli {
    /// INI configuration file. Defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// JSON scene description. A random demo scene is generated when omitted.
    #[arg(long, value_name = "PATH")]
    scene: Option<PathBuf>,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Duration of every frame in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 1.0 / 60.0)]
    frame_time: f32,

    /// Seed for the demo scene.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Bodies in the demo scene.
    #[arg(long, default_value_t = 24)]
    bodies: usize,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let mut config = GameConfig::with_path(path);
            if let Err(e) = config.load_from_file() {
                error!("{e}");
                return ExitCode::FAILURE;
            }
            config
        }
        None => GameConfig::new(),
    };

    let scene = match &cli.scene {
        Some(path) => match SceneDescription::load(path) {
            Ok(scene) => scene,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => {
            info!("Generating demo scene (seed {}, {} bodies)", cli.seed, cli.bodies);
            SceneDescription::demo(cli.seed, cli.bodies)
        }
    };

    let mut game = match Game::new(config) {
        Ok(game) => game,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = game.load_scene(&scene) {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    let report_every = (cli.frames / 10).max(1);
    for frame in 1..=cli.frames {
        game.run_frame(cli.frame_time);
        if frame % report_every == 0 {
            let stats = game.stats();
            info!(
                "frame {frame}: t={:.2}s steps={} overlap tests={} contacts={}",
                game.elapsed(),
                stats.fixed_steps,
                stats.last_overlap_tests,
                stats.last_resolved_pairs
            );
        }
    }

    let stats = game.stats();
    info!(
        "Finished {} frames, {} fixed steps (max {} per frame), {} contacts, {} trigger events, {} objects left",
        stats.frames,
        stats.fixed_steps,
        stats.max_steps_in_frame,
        stats.total_resolved_pairs,
        stats.total_trigger_events,
        game.object_count()
    );
    ExitCode::SUCCESS
}
