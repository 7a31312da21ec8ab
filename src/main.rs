use std::path::{Path, PathBuf};

use bracket_terminal::prelude::*;
use clap::Parser;
use hideous_truths::{
    GameConfig, GameWorld,
    app::GameApp,
    script::{IntentScript, run_script},
};

#[derive(Parser, Debug)]
#[command(name = "hideous-truths", about = "A turn-based dungeon crawl")]
struct Args {
    /// Seed for dungeon generation; a fresh one per game when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Where the game is saved on quit and loaded from
    #[arg(long, default_value = "savegame.json")]
    save: PathBuf,

    /// JSON file overriding game tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Play an intent script without a window and print a summary
    #[arg(long)]
    replay: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<GameConfig, Box<dyn std::error::Error + Send + Sync>> {
    let config = match &args.config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn replay(config: GameConfig, seed: u64, path: &Path) -> BError {
    let mut script = IntentScript::from_file(path)?;
    log::info!("replaying {} intents from {}", script.len(), path.display());
    let mut world = GameWorld::new_game(config, seed);
    let summary = run_script(&mut world, &mut script);
    println!("{summary:#?}");
    for line in world.messages() {
        println!("  {}", line.text);
    }
    Ok(())
}

// The game screen owns the terminal; only problems get logged over it.
fn default_log_filter(args: &Args) -> &'static str {
    if args.replay.is_some() { "info" } else { "warn" }
}

fn main() -> BError {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_log_filter(&args)))
        .init();
    let config = load_config(&args)?;

    if let Some(path) = &args.replay {
        return replay(config, args.seed.unwrap_or(0), path);
    }

    let context = BTermBuilder::simple80x50()
        .with_title("Hideous Truths")
        .build()?;
    let app = GameApp::new(config, args.save, args.seed);
    main_loop(context, app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_logs_quietly_and_replays_verbosely() {
        let play = Args::parse_from(["hideous-truths"]);
        assert_eq!(default_log_filter(&play), "warn");
        let replay = Args::parse_from(["hideous-truths", "--replay", "moves.txt"]);
        assert_eq!(default_log_filter(&replay), "info");
    }
}
