use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use grimoire_engine::engine::arena::{play_seeded, run_arena};
use grimoire_engine::engine::config::{load_default_setup, load_setup};
use grimoire_engine::engine::moderator::RandomModerator;

#[derive(Parser)]
#[command(name = "grimoire", about = "Autoplay seeded games of the grimoire engine")]
struct Cli {
    /// Path to grimoire.toml (default: auto-discover)
    #[arg(long, env = "GRIMOIRE_SETUP")]
    setup: Option<PathBuf>,

    /// Base seed; overrides the setup file
    #[arg(long, env = "GRIMOIRE_SEED")]
    seed: Option<u64>,

    /// Roster size; overrides the setup file
    #[arg(short, long)]
    players: Option<usize>,

    /// Number of games to play
    #[arg(short = 'n', long, default_value = "100")]
    games: usize,

    /// Print the public log of the first game
    #[arg(long)]
    show_log: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    let mut setup = match &cli.setup {
        Some(path) => load_setup(path)?,
        None => load_default_setup(),
    };
    if let Some(players) = cli.players {
        setup.table.players = players;
    }
    let seed = cli.seed.or(setup.table.seed).unwrap_or(42);
    let moderator = RandomModerator::default();

    tracing::info!(players = setup.table.players, games = cli.games, seed, "starting autoplay");

    if cli.show_log {
        let game = play_seeded(&setup, &moderator, seed)?;
        println!("Game {} ({} days, {} prompts):", game.seed, game.days, game.prompts);
        for line in &game.log {
            println!("  {line}");
        }
        println!();
    }

    let result = run_arena(&setup, &moderator, cli.games, seed)?;
    println!("{}", result.summary());
    Ok(())
}
