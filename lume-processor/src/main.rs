use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueHint};
use lume_bake::BakeConfig;
use lume_core::{ReadOptions, MAX_STRING_LEN};

mod commands;
mod obj;

#[derive(Debug, Parser)]
#[command(author, version, about = "Bakes Wavefront OBJ models into indexed Lume mesh assets")]
struct Cli {
    /// Logging output filters; comma-separated
    #[arg(short, long, default_value = "info", env = "LUME_LOG", global = true)]
    log_filter: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Index an OBJ model, write the baked asset and copy its textures.
    Bake {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        output: PathBuf,
        /// Per-component distance under which corners are merged
        #[arg(short, long, default_value_t = 1e-5)]
        tolerance: f32,
        /// Padding around the bounding box, in multiples of the tolerance
        #[arg(long, default_value_t = 10.0)]
        margin_factor: f32,
        /// Upper bound on grid cells along the longest side
        #[arg(long, default_value_t = 1024 * 1024)]
        max_grid_size: usize,
        /// Texture directory relative to the output; defaults to `<stem>-tex`
        #[arg(long)]
        texture_dir: Option<PathBuf>,
    },
    /// Print a summary of a baked asset.
    Inspect {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
        /// Reject strings at least this long
        #[arg(long, default_value_t = MAX_STRING_LEN)]
        max_string_len: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter.as_str())).init();

    match cli.command {
        Command::Bake {
            input,
            output,
            tolerance,
            margin_factor,
            max_grid_size,
            texture_dir,
        } => {
            let config = BakeConfig {
                error_tolerance: tolerance,
                margin_factor,
                max_grid_size,
            };
            commands::bake(&input, &output, &config, texture_dir.as_deref())
        }
        Command::Inspect { path, max_string_len } => commands::inspect(&path, &ReadOptions { max_string_len }),
    }
}
