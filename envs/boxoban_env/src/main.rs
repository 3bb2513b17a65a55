use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use boxoban_env::{BoxobanLevels, Config, Difficulty, Split};
use clap::Parser;
use log::{error, info};

/// Prefetch the Boxoban level archive and print sampled rooms.
#[derive(Parser, Debug)]
#[command(name = "boxoban-fetch")]
struct Args {
    /// Cache directory. Falls back to $SCRATCH/.sokoban_cache.
    #[arg(long, env = "BOXOBAN_CACHE")]
    cache_root: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Difficulty::Unfiltered)]
    difficulty: Difficulty,
    #[arg(long, value_enum, default_value_t = Split::Train)]
    split: Split,
    #[arg(long)]
    seed: Option<u64>,
    /// Number of rooms to print.
    #[arg(long, default_value_t = 1)]
    count: usize,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let Some(cache_root) = args.cache_root.or_else(|| env::var_os("SCRATCH").map(|s| PathBuf::from(s).join(".sokoban_cache"))) else {
        error!("no cache directory: pass --cache-root or set BOXOBAN_CACHE or SCRATCH");
        return ExitCode::FAILURE;
    };

    let config = Config {
        difficulty: args.difficulty,
        split: args.split,
        cache_root,
        seed: args.seed,
        verbose: true,
        ..Config::default()
    };
    let mut levels = BoxobanLevels::new(config);
    for _ in 0..args.count {
        match levels.reset() {
            Ok(reset) => {
                info!(
                    "{}: player at {:?}, boxes at {:?}",
                    reset.source_file.display(), reset.room.player_position, reset.room.boxes
                );
                println!("{}\n", reset.room.room_text());
            }
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
