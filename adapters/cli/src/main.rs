#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Overworld experience.

mod config;
mod simulation;

use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use overworld_rendering::{Color, FrameSimulationBreakdown, Presentation, RenderingBackend};
use overworld_rendering_macroquad::MacroquadBackend;
use overworld_system_bootstrap::Bootstrap;
use overworld_world::{MapLayout, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::GameConfig, simulation::Simulation};

const WINDOW_TITLE: &str = "Overworld";

#[derive(Debug, Parser)]
#[command(name = "overworld", about = "Walk a tile map and talk to its inhabitants")]
struct CliArgs {
    /// Tuning file with timing, movement, viewport, dialogue and encounter settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Map file to load instead of the built-in field.
    #[arg(long, value_name = "PATH", conflicts_with = "generate")]
    map: Option<PathBuf>,
    /// Generate a random map instead of loading one.
    #[arg(long)]
    generate: bool,
    /// Seed for map generation and random encounters.
    #[arg(long)]
    seed: Option<u64>,
    /// Columns of a generated map.
    #[arg(long, default_value_t = 20)]
    columns: u32,
    /// Rows of a generated map.
    #[arg(long, default_value_t = 15)]
    rows: u32,
    /// Synchronise presentation with the display refresh rate (default).
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,
    /// Render as fast as possible.
    #[arg(long, overrides_with = "vsync")]
    no_vsync: bool,
    /// Log frame timing once per second.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the Overworld command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GameConfig::default(),
    };
    info!(
        tick_rate = config.timing.tick_rate,
        tile_size = config.movement.tile_size,
        speed = config.movement.speed,
        encounter_rate = config.encounter.rate_per_second,
        "configuration loaded"
    );

    let bootstrap = Bootstrap;
    let layout = load_layout(&args, &bootstrap)?;
    let world = World::new(layout, config.world_config()).context("invalid map layout")?;
    let mut simulation = Simulation::new(world, &config, args.seed);
    println!("{}", bootstrap.welcome_banner(simulation.world()));

    let scene = simulation
        .initial_scene()
        .context("failed to describe the map for rendering")?;
    let presentation = Presentation::new(WINDOW_TITLE, Color::from_rgb_u8(16, 16, 24), scene);

    MacroquadBackend::new()
        .with_vsync(args.vsync || !args.no_vsync)
        .with_show_fps(args.show_fps)
        .run(presentation, move |frame_dt, input, scene| {
            let simulation_start = Instant::now();
            simulation.frame(frame_dt, input);
            let simulation_duration = simulation_start.elapsed();

            let population_start = Instant::now();
            simulation.populate_scene(scene);

            FrameSimulationBreakdown {
                simulation: simulation_duration,
                scene_population: population_start.elapsed(),
            }
        })
}

fn load_layout(args: &CliArgs, bootstrap: &Bootstrap) -> Result<MapLayout> {
    if let Some(path) = &args.map {
        info!(path = %path.display(), "loading map file");
        return bootstrap
            .load_map(path)
            .with_context(|| format!("failed to load map {}", path.display()));
    }

    if args.generate {
        let seed = args.seed.unwrap_or(0);
        info!(seed, columns = args.columns, rows = args.rows, "generating map");
        return bootstrap
            .generated_layout(seed, args.columns, args.rows)
            .context("failed to generate map");
    }

    bootstrap
        .default_layout()
        .context("built-in map is invalid")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_defaults_on_and_last_flag_wins() {
        let args = CliArgs::parse_from(["overworld"]);
        assert!(!args.no_vsync);

        let args = CliArgs::parse_from(["overworld", "--vsync", "--no-vsync"]);
        assert!(args.no_vsync);

        let args = CliArgs::parse_from(["overworld", "--no-vsync", "--vsync"]);
        assert!(!args.no_vsync);
    }

    #[test]
    fn map_and_generate_are_exclusive() {
        let result = CliArgs::try_parse_from(["overworld", "--map", "a.toml", "--generate"]);
        assert!(result.is_err());
    }

    #[test]
    fn generated_layout_honours_size_flags() {
        let args = CliArgs::parse_from([
            "overworld",
            "--generate",
            "--seed",
            "7",
            "--columns",
            "12",
            "--rows",
            "9",
        ]);
        let layout = load_layout(&args, &Bootstrap).expect("valid generated layout");
        assert_eq!((layout.columns, layout.rows), (12, 9));
    }

    #[test]
    fn built_in_layout_is_used_by_default() {
        let args = CliArgs::parse_from(["overworld"]);
        let layout = load_layout(&args, &Bootstrap).expect("valid built-in layout");
        assert_eq!((layout.columns, layout.rows), (15, 10));
    }
}
