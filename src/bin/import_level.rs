//! Convert a glTF scene of cubes into a level layout

use std::path::PathBuf;
use std::process::ExitCode;

use bloks::assets::import_gltf;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Scan glTF cube meshes into a Black Hole Bloks level", version)]
struct Args {
    /// Input .gltf or .glb
    input: PathBuf,
    /// Output layout, RON or JSON by extension
    #[arg(short, long)]
    output: PathBuf,
    /// Uniform scale applied when the level is built
    #[arg(long, default_value_t = 1.3)]
    scale: f32,
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let layout = import_gltf(&args.input, args.scale)?;
    layout.save(&args.output)?;
    log::info!(
        "Wrote {} bloks from {} to {}",
        layout.blocks.len(),
        args.input.display(),
        args.output.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
