//! Rubik's Cube
//!
//! An interactive 3x3x3 twisty puzzle. Drag a block to grab its layer and
//! turn it around the cube center; on release the layer snaps to the
//! nearest quarter turn. A headless demo mode scripts a few turns and
//! prints the block layout after each one.

mod visualization;

use std::cell::Cell;
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use glam::{Vec2, Vec3};

use rubiks::{BlockPose, CubeConfig, Hit, InputEvent, RotationPhase, RubiksCube};

/// Plays with a 3x3x3 Rubik's cube.
#[derive(Parser)]
#[command(name = "rubiks")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Open the interactive 3D viewer.
    Play,
    /// Run a scripted sequence of turns without a window.
    Demo,
}

/// Overrides for the cube's tunables.
#[derive(Args)]
struct ConfigArgs {
    /// Edge length of one block.
    #[arg(long, global = true, default_value_t = 0.1)]
    block_size: f32,
    /// Distance between neighbouring blocks, in block sizes.
    #[arg(long, global = true, default_value_t = 1.0)]
    layout_factor: f32,
    /// Duration of the assembly and reset animations in milliseconds.
    #[arg(long, global = true, default_value_t = 1000.0)]
    assembly_ms: f64,
    /// How far a grabbed layer is lifted, relative to its resting offset.
    #[arg(long, global = true, default_value_t = 1.3)]
    lift_ratio: f32,
    /// Duration of the lift in milliseconds.
    #[arg(long, global = true, default_value_t = 250.0)]
    lift_ms: f64,
    /// Duration of the snap after release in milliseconds.
    #[arg(long, global = true, default_value_t = 250.0)]
    settle_ms: f64,
    /// Layer rotation per unit of pointer rotation.
    #[arg(long, global = true, default_value_t = 3.0)]
    sensitivity: f32,
    /// Place blocks immediately instead of animating them in.
    #[arg(long, global = true)]
    no_assembly: bool,
    /// Do not highlight the layer under the pointer.
    #[arg(long, global = true)]
    no_hover: bool,
}

impl From<ConfigArgs> for CubeConfig {
    fn from(args: ConfigArgs) -> Self {
        Self {
            block_size: args.block_size,
            layout_factor: args.layout_factor,
            assembly_duration_ms: args.assembly_ms,
            lift_ratio: args.lift_ratio,
            lift_duration_ms: args.lift_ms,
            settle_duration_ms: args.settle_ms,
            drag_sensitivity: args.sensitivity,
            animate_assembly: !args.no_assembly,
            hover_highlight: !args.no_hover,
        }
    }
}

/// Simulated frame length for the demo.
const DEMO_FRAME_MS: f64 = 16.0;
/// Largest pointer step the demo takes, in degrees.
const DEMO_POINTER_STEP: f32 = 30.0;

/// Face grabbed and layer degrees turned by each demo move.
const DEMO_TURNS: [(Vec3, f32); 3] = [(Vec3::X, 90.0), (Vec3::Y, 180.0), (Vec3::NEG_Z, -90.0)];

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = CubeConfig::from(cli.config);

    let result = match cli.command {
        Some(Command::Demo) => run_demo(config).map(|output| print!("{output}")),
        Some(Command::Play) | None => {
            println!("Controls: drag a block to turn its layer, R reset");
            visualization::display(config)
        }
    };

    if let Err(e) = result {
        log::error!("invalid configuration: {e}");
        std::process::exit(2);
    }
}

/// Plays [`DEMO_TURNS`] on a cube through synthetic input, then resets it.
///
/// Returns the layout after each turn and after the reset.
fn run_demo(config: CubeConfig) -> Result<String, rubiks::ConfigError> {
    let face = Rc::new(Cell::new(Vec3::ZERO));
    let picked = Rc::clone(&face);
    let picker = move |_: Vec2, _: &[BlockPose]| {
        Some(Hit {
            block: 0,
            surface_point: picked.get(),
        })
    };
    let sensitivity = config.drag_sensitivity;
    let mut cube = RubiksCube::new(config, picker)?;
    let mut clock = 0.0;

    settle(&mut cube, &mut clock);
    let mut output = format!(
        "Start (solved: {}):\n{}\n\n",
        cube.solved(),
        cube.grid().format_layout()
    );

    for (i, &(grabbed, degrees)) in DEMO_TURNS.iter().enumerate() {
        face.set(grabbed);
        cube.handle(InputEvent::PointerDown(pointer_at(0.0)));
        while cube.phase() == RotationPhase::Selecting {
            frame(&mut cube, &mut clock);
        }

        let travel = degrees / sensitivity;
        let steps = (travel.abs() / DEMO_POINTER_STEP).ceil().max(1.0) as u32;
        for step in 1..=steps {
            let point = pointer_at(travel * step as f32 / steps as f32);
            cube.handle(InputEvent::PointerMove(point));
        }
        cube.handle(InputEvent::PointerUp);
        settle(&mut cube, &mut clock);

        output.push_str(&format!(
            "Turn {} ({degrees:+} degrees, solved: {}):\n{}\n\n",
            i + 1,
            cube.solved(),
            cube.grid().format_layout()
        ));
    }

    let turns = cube.turn_count();
    cube.reset();
    settle(&mut cube, &mut clock);
    output.push_str(&format!(
        "Reset after {turns} turns (solved: {}):\n{}\n",
        cube.solved(),
        cube.grid().format_layout()
    ));

    Ok(output)
}

fn frame(cube: &mut RubiksCube, clock: &mut f64) {
    *clock += DEMO_FRAME_MS;
    cube.handle(InputEvent::Frame(*clock));
}

/// Runs frames until nothing is moving.
fn settle(cube: &mut RubiksCube, clock: &mut f64) {
    frame(cube, clock);
    while !cube.is_idle() {
        frame(cube, clock);
    }
}

fn pointer_at(degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_config() -> CubeConfig {
        CubeConfig {
            animate_assembly: false,
            ..CubeConfig::default()
        }
    }

    #[test]
    fn test_demo_first_turn_snapshot() {
        let output = run_demo(demo_config()).expect("default config is valid");
        let first_turn = output.split("\n\n").nth(1).expect("demo prints every turn");
        insta::assert_snapshot!(first_turn, @r"
        Turn 1 (+90 degrees, solved: false):
        z=-1      z=0       z=1
        06 15 18  07 16 21  08 17 24
        03 12 19  04 13 22  05 14 25
        00 09 20  01 10 23  02 11 26
        ");
    }

    #[test]
    fn test_demo_reset_restores_solved() {
        let output = run_demo(demo_config()).expect("default config is valid");
        assert!(output.starts_with("Start (solved: true)"));
        assert!(output.contains("Turn 3 (-90 degrees, solved: false)"));
        assert!(output.contains("Reset after 3 turns (solved: true)"));
        assert!(output.ends_with("05 14 23\n00 09 18  01 10 19  02 11 20\n"));
    }

    #[test]
    fn test_demo_with_assembly_and_low_sensitivity() {
        let config = CubeConfig {
            drag_sensitivity: 0.5,
            ..CubeConfig::default()
        };
        let output = run_demo(config).expect("config is valid");
        assert!(output.contains("Turn 2 (+180 degrees, solved: false)"));
        assert!(output.contains("Reset after 3 turns (solved: true)"));
    }

    #[test]
    fn test_demo_rejects_invalid_config() {
        let config = CubeConfig {
            layout_factor: 0.0,
            ..CubeConfig::default()
        };
        assert!(run_demo(config).is_err());
    }
}
