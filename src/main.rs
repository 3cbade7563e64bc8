//! Black Hole Bloks

use std::path::PathBuf;
use std::process::ExitCode;

use bloks::assets::LevelLayout;
use bloks::core::{Engine, EngineConfig, GameConfig};
use bloks::game::BloksGame;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Four-player breakout around a black hole", version)]
struct Args {
    /// Gameplay tuning (.ron or .json)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Level layout (.ron or .json); a generated cluster is used without one
    #[arg(long)]
    level: Option<PathBuf>,
    #[arg(long, default_value_t = 1280)]
    width: u32,
    #[arg(long, default_value_t = 720)]
    height: u32,
    #[arg(long)]
    no_vsync: bool,
    /// Directory holding click and wind sounds
    #[arg(long, default_value = "assets/sounds")]
    sounds: PathBuf,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let layout = match &args.level {
        Some(path) => LevelLayout::load(path)?,
        None => LevelLayout::default(),
    };
    log::info!(
        "Level '{}' with {} bloks",
        layout.name,
        layout.blocks.len()
    );

    let engine_config = EngineConfig::default()
        .with_size(args.width, args.height)
        .with_vsync(!args.no_vsync);
    let game = BloksGame::new(config, layout, args.sounds);
    Engine::new(engine_config, game).run()
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
