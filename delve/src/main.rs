//! delve: generate a level and watch a few turns of it in the terminal.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Deserialize;

use delve::{Action, Scene, SceneConfig, TurnEvent};
use delve_rl::{Biome, BiomeParams, Seed, generate};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BiomeArg {
    Dungeon,
    Jungle,
    Town,
}

impl From<BiomeArg> for Biome {
    fn from(b: BiomeArg) -> Self {
        match b {
            BiomeArg::Dungeon => Biome::Dungeon,
            BiomeArg::Jungle => Biome::Jungle,
            BiomeArg::Town => Biome::Town,
        }
    }
}

/// Generate a roguelike level and run a few turns on it
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(version, about, long_about = None)]
struct Args {
    /// Level biome (overridden by a `biome` in the parameter file)
    #[arg(short, long, value_enum, default_value = "dungeon")]
    biome: BiomeArg,

    /// Seed: a number, or any text
    #[arg(short, long, default_value = "delve")]
    seed: String,

    #[arg(long, default_value_t = 60)]
    width: i32,

    #[arg(long, default_value_t = 30)]
    height: i32,

    /// JSON file with `level` generator parameters and `scene` settings
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Turns to simulate
    #[arg(short, long, default_value_t = 20)]
    turns: u32,

    /// Walk the player toward the exit instead of waiting
    #[arg(long)]
    travel: bool,

    /// Show the whole level instead of what the player has seen
    #[arg(long)]
    reveal: bool,
}

/// Contents of a `--params` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParamsFile {
    level: Option<BiomeParams>,
    scene: SceneConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let file = match &args.params {
        Some(path) => serde_json::from_str::<ParamsFile>(&fs::read_to_string(path)?)?,
        None => ParamsFile::default(),
    };
    let params = file
        .level
        .unwrap_or_else(|| BiomeParams::defaults(args.biome.into()));
    let seed = match args.seed.parse::<u64>() {
        Ok(n) => Seed::Int(n),
        Err(_) => Seed::Text(args.seed.clone()),
    };

    let level = generate(seed, args.width, args.height, &params)?;
    println!(
        "{} {}x{} seed {}: {} rooms, {} exits",
        level.biome,
        args.width,
        args.height,
        level.seed,
        level.rooms.len(),
        level.exits.len()
    );
    if let Some(d) = &level.degraded {
        println!("degraded: {d}");
    }

    let exit = level.exits.first().copied().unwrap_or(level.spawn);
    let mut scene = Scene::new(level, &file.scene)?;
    let (mut moves, mut attacks) = (0, 0);
    for _ in 0..args.turns {
        let action = if args.travel {
            Action::Travel(exit)
        } else {
            Action::Wait
        };
        for event in scene.act(action)? {
            match event {
                TurnEvent::MonsterMoved { .. } => moves += 1,
                TurnEvent::MonsterAttacked { name } => {
                    attacks += 1;
                    println!("turn {}: the {name} attacks", scene.turn());
                }
                TurnEvent::PlayerBumped { name } => {
                    println!("turn {}: you bump into the {name}", scene.turn())
                }
                TurnEvent::ReachedExit(p) => {
                    println!("turn {}: you reach the exit at {p}", scene.turn())
                }
                TurnEvent::PlayerMoved(_) | TurnEvent::PlayerBlocked => {}
            }
        }
        if scene.at_exit() {
            break;
        }
    }

    print!("{}", scene.render(args.reveal));
    println!(
        "after {} turns: {} monster moves, {} attacks, {} cells explored",
        scene.turn(),
        moves,
        attacks,
        scene.player().viewer.explored()
    );
    Ok(())
}
