use std::str::FromStr;
use std::time::Instant;

use clap::Parser;
use hexsettle::MapType;
use hexsettle::cli::{GameStats, PlayerInstance, create_player, print_player_help};
use hexsettle::game::{Game, GameConfig};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser, Clone)]
#[command(name = "hexsettle-sim")]
#[command(about = "Simulate games between bot strategies")]
struct Args {
    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 5)]
    num: u32,

    /// Comma-separated player codes, one per seat (e.g. R,R,W,W)
    #[arg(long, default_value = "R,R,R,R")]
    players: String,

    /// Random seed; game i uses seed + i
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Map type: BASE, MINI, or TOURNAMENT
    #[arg(long, default_value = "BASE")]
    map: String,

    /// Victory points needed to win
    #[arg(long, default_value_t = 10)]
    vps_to_win: u8,

    /// Hand size above which a rolled 7 forces a discard
    #[arg(long, default_value_t = 7)]
    discard_limit: u32,

    /// Show player codes and exit
    #[arg(long)]
    help_players: bool,

    /// Silence console output
    #[arg(long)]
    quiet: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.help_players {
        print_player_help();
        return;
    }

    let codes: Vec<&str> = args.players.split(',').map(str::trim).collect();
    if !(2..=4).contains(&codes.len()) {
        eprintln!("Error: Must specify 2-4 players");
        std::process::exit(1);
    }
    let map_type = MapType::from_str(&args.map).unwrap_or_else(|err| {
        eprintln!("Error: {err}. Use BASE, MINI, or TOURNAMENT");
        std::process::exit(1);
    });

    let mut stats = GameStats::new();
    let mut seats: Vec<&'static str> = Vec::new();
    for game_idx in 0..args.num {
        let seed = game_seed(args.seed, game_idx);
        let players = match build_players(&codes, seed) {
            Some(players) => players,
            None => {
                eprintln!("Error: Unknown player code in '{}'", args.players);
                eprintln!("Use --help-players to see available codes");
                std::process::exit(1);
            }
        };
        seats = players.iter().map(PlayerInstance::name).collect();

        let config = GameConfig {
            num_players: players.len(),
            map_type,
            vps_to_win: args.vps_to_win,
            discard_limit: args.discard_limit,
            seed,
        };
        let start = Instant::now();
        let mut game = match Game::new(config) {
            Ok(game) => game,
            Err(err) => {
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        };
        if let Err(err) = game.play(&players) {
            error!(game = %game.id, %err, "game aborted");
        }
        let duration = start.elapsed();
        stats.record_game(&game, duration);

        if !args.quiet {
            let winner = game
                .winning_color()
                .map_or_else(|| "None".to_string(), |c| c.to_string());
            println!(
                "Game {:>4}: Winner={:>6}, Turns={:>4}, Duration={:?}",
                game_idx + 1,
                winner,
                game.state.num_turns,
                duration
            );
        }
    }

    if !args.quiet {
        print_summary(&stats, &seats);
    }
}

/// Seed for the `game_idx`-th game; wraps at the top of the range.
fn game_seed(base: u64, game_idx: u32) -> u64 {
    base.wrapping_add(u64::from(game_idx))
}

/// Seat players in color order, each with its own seed derived from the game's.
fn build_players(codes: &[&str], seed: u64) -> Option<Vec<PlayerInstance>> {
    codes
        .iter()
        .enumerate()
        .map(|(seat, code)| create_player(code, Some(seed.wrapping_mul(31).wrapping_add(seat as u64))))
        .collect()
}

fn print_summary(stats: &GameStats, seats: &[&'static str]) {
    println!("\n{}", "=".repeat(80));
    println!("SIMULATION SUMMARY");
    println!("{}", "=".repeat(80));

    println!("\nPlayer Summary:");
    println!(
        "{:<25} {:<10} {:<12} {:<12}",
        "Player", "Wins", "Win Rate", "Avg VP"
    );
    println!("{}", "-".repeat(60));
    for (color, name) in hexsettle::Color::ORDERED.iter().zip(seats) {
        println!(
            "{:<25} {:<10} {:<11.1}% {:<12.2}",
            format!("{name} ({color})"),
            stats.wins.get(color).copied().unwrap_or(0),
            stats.win_rate(*color),
            stats.avg_victory_points(*color)
        );
    }

    println!("\nGame Summary:");
    println!("  Total Games: {}", stats.games);
    println!("  Unfinished: {}", stats.unfinished);
    println!("  Avg Turns: {:.2}", stats.get_avg_turns());
    println!("  Avg Ticks: {:.2}", stats.get_avg_ticks());
    println!("  Avg Duration: {:.2?}", stats.get_avg_duration());
}
