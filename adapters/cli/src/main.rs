#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that renders a tactical map to an image.
//!
//! The binary loads a scenario, runs the scrolling system for a number of
//! frames while the viewport follows its requests, and writes the last frame
//! as a binary greymap whose grey levels are the palette indices.

mod scenario;

use std::{fs, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use clap::Parser;
use tactical_core::{CellIndex, Event, WorldPosition, LEPTONS_PER_PIXEL};
use tactical_rendering::{FrameStats, IndexedFrame, PalettePainter, Viewport};
use tactical_system_scrolling::{Easing, ScrollInput, Scrolling};
use tactical_world::{apply, Grid};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::scenario::ScenarioConfig;

/// Renders a tactical map scenario to a PGM image.
#[derive(Debug, Parser)]
#[command(name = "tactical-map", version, about, long_about = None)]
struct Args {
    /// TOML scenario to load instead of the built-in demo map.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Frames to simulate before the image is written.
    #[arg(long, default_value_t = 30)]
    frames: u32,
    /// Destination of the rendered frame.
    #[arg(long, default_value = "tactical.pgm")]
    output: PathBuf,
    /// Cell to centre the view on, as `X,Y`; overrides the scenario.
    #[arg(long)]
    center: Option<CellArg>,
    /// Pixels to pan right, eased over the simulated frames.
    #[arg(long, default_value_t = 0)]
    pan_right: i32,
}

/// Cell coordinates given on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CellArg {
    x: i32,
    y: i32,
}

impl FromStr for CellArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (x, y) = value
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y but found `{value}`"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<i32>()
                .map_err(|error| format!("invalid coordinate `{part}`: {error}"))
        };
        Ok(Self {
            x: parse(x)?,
            y: parse(y)?,
        })
    }
}

/// Entry point for the tactical map command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let scenario = match &args.scenario {
        Some(path) => ScenarioConfig::load(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => ScenarioConfig::demo(),
    };

    let simulation = simulate(&scenario, &args)?;
    fs::write(&args.output, encode_pgm(&simulation.frame))
        .with_context(|| format!("failed to write image to {}", args.output.display()))?;

    info!(
        path = %args.output.display(),
        origin_x = simulation.origin.x(),
        origin_y = simulation.origin.y(),
        cells = simulation.stats.cells,
        shrouded = simulation.stats.shrouded,
        "frame_written"
    );
    Ok(())
}

/// Outcome of a simulated run.
struct Simulation {
    frame: IndexedFrame,
    stats: FrameStats,
    origin: WorldPosition,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Loads the scenario, runs the camera for the requested frames and renders each one.
fn simulate(scenario: &ScenarioConfig, args: &Args) -> Result<Simulation> {
    let mut grid = Grid::new();
    let mut events = Vec::new();
    for command in scenario.commands() {
        apply(&mut grid, command, &mut events);
    }
    let rejected = events
        .iter()
        .filter(|event| matches!(event, Event::CommandRejected { .. }))
        .count();
    if rejected > 0 {
        warn!(rejected, "scenario_commands_rejected");
    }

    let mut viewport = Viewport::new(grid, scenario.viewport);
    let center = args
        .center
        .map(|cell| (cell.x, cell.y))
        .or(scenario.center);
    if let Some((x, y)) = center {
        viewport.center_on_cell(CellIndex::from_xy(x, y));
    }

    let mut scrolling = Scrolling::new(scenario.scrolling);
    let mut requests = Vec::new();
    if args.pan_right != 0 {
        let view = viewport.snapshot();
        let target = view
            .origin
            .offset(args.pan_right.saturating_mul(LEPTONS_PER_PIXEL), 0);
        scrolling.scroll_to(&view, target, Easing::EaseInOut, args.frames, &mut requests);
    }

    let end = viewport.tactical_area().end();
    let mut frame = IndexedFrame::new(
        u32::try_from(end.x).unwrap_or(0),
        u32::try_from(end.y).unwrap_or(0),
    );
    let mut painter = PalettePainter;
    let mut stats = viewport.render(&mut frame, &mut painter)?;

    let idle = ScrollInput::default();
    for _ in 0..args.frames {
        scrolling.handle(&idle, &viewport.snapshot(), &mut requests);
        for request in requests.drain(..) {
            viewport.apply(request);
        }
        stats = viewport.render(&mut frame, &mut painter)?;
    }
    for request in requests.drain(..) {
        viewport.apply(request);
    }

    Ok(Simulation {
        frame,
        stats,
        origin: viewport.origin(),
    })
}

/// Encodes the frame as a binary PGM with palette indices as grey levels.
fn encode_pgm(frame: &IndexedFrame) -> Vec<u8> {
    let mut bytes = format!("P5\n{} {}\n255\n", frame.width(), frame.height()).into_bytes();
    bytes.extend_from_slice(frame.pixels());
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(frames: u32, pan_right: i32) -> Args {
        Args {
            scenario: None,
            frames,
            output: PathBuf::from("unused.pgm"),
            center: None,
            pan_right,
        }
    }

    #[test]
    fn parses_cell_argument() {
        assert_eq!("12, 40".parse::<CellArg>(), Ok(CellArg { x: 12, y: 40 }));
        assert!("12".parse::<CellArg>().is_err());
        assert!("a,b".parse::<CellArg>().is_err());
    }

    #[test]
    fn command_line_flags_parse() {
        let args = Args::try_parse_from([
            "tactical-map",
            "--frames",
            "5",
            "--center",
            "30,25",
            "--pan-right",
            "48",
        ])
        .expect("valid flags");
        assert_eq!(args.frames, 5);
        assert_eq!(args.center, Some(CellArg { x: 30, y: 25 }));
        assert_eq!(args.pan_right, 48);
        assert_eq!(args.output, PathBuf::from("tactical.pgm"));
    }

    #[test]
    fn pgm_header_matches_frame() {
        let frame = IndexedFrame::new(3, 2);
        let bytes = encode_pgm(&frame);
        assert!(bytes.starts_with(b"P5\n3 2\n255\n"));
        assert_eq!(bytes.len(), b"P5\n3 2\n255\n".len() + 6);
    }

    #[test]
    fn demo_renders_full_tactical_area() {
        let simulation = simulate(&ScenarioConfig::demo(), &args(0, 0)).expect("render");
        let frame = &simulation.frame;
        assert_eq!((frame.width(), frame.height()), (640, 400));
        assert_eq!(frame.presented(), 1);

        // Centred on 40,30 and clamped to the 40x20 play area.
        assert_eq!(simulation.origin, WorldPosition::from_pixels(652, 540));
        let stats = simulation.stats;
        assert_eq!(stats.cells, 27 * 17);
        assert_eq!(stats.overlays, 3);
        assert_eq!(stats.occupied, 1);
        assert_eq!(stats.shrouded, 0);
        assert_eq!(stats.fogged, 27 * 5);
    }

    #[test]
    fn pan_eases_to_the_requested_offset() {
        let mut scenario = ScenarioConfig::demo();
        scenario.bounds = tactical_core::GridBounds::DEFAULT;
        scenario.center = Some((40, 40));

        let still = simulate(&scenario, &args(0, 0)).expect("render");
        assert_eq!(still.origin, WorldPosition::from_pixels(652, 780));

        let panned = simulate(&scenario, &args(12, 96)).expect("render");
        assert_eq!(panned.frame.presented(), 13);
        assert_eq!(panned.origin, WorldPosition::from_pixels(652 + 96, 780));
    }

    #[test]
    fn center_flag_overrides_scenario() {
        let mut overridden = args(0, 0);
        overridden.center = Some(CellArg { x: 50, y: 30 });
        let simulation = simulate(&ScenarioConfig::demo(), &overridden).expect("render");
        assert_eq!(simulation.origin, WorldPosition::from_pixels(800, 540));
    }
}
