//! Arena - AI vs AI matches for engine comparison.
//!
//! Plays two configurations against each other on randomly generated
//! mirrored maps, each map twice with the sides swapped so neither player
//! benefits from moving first. Matches run in parallel; results land in a
//! CSV table plus one JSON summary per match.

use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use csv::Writer;
use rand::prelude::*;
use rayon::prelude::*;

use nocturne::arena::{play_match, random_map, MapLimits, MatchSummary, MatchWinner};
use nocturne::players::{Player, RandomPlayer, SearchPlayer};

#[derive(Parser, Debug)]
#[command(name = "arena", about = "Run AI vs AI matches on random maps")]
struct Args {
    /// Number of random maps (each is played twice, sides swapped)
    #[arg(long, default_value_t = 3)]
    maps: usize,

    /// Search depth for player A (0 = anytime search with the time budget)
    #[arg(long, default_value_t = 0)]
    depth_a: u8,

    /// Search depth for player B (0 = anytime search with the time budget)
    #[arg(long, default_value_t = 0)]
    depth_b: u8,

    /// Per-move time budget in milliseconds for anytime players
    #[arg(long, default_value_t = 500)]
    budget_ms: u64,

    /// Use the random baseline as player B
    #[arg(long, default_value_t = false)]
    random_b: bool,

    /// Maximum half-turns before a match is called on populations
    #[arg(long, default_value_t = 200)]
    max_turns: u16,

    /// Smallest and largest board side
    #[arg(long, default_value_t = 5)]
    size_min: u8,
    #[arg(long, default_value_t = 15)]
    size_max: u8,

    /// How many human groups to scatter (pairs, mirrored)
    #[arg(long, default_value_t = 2)]
    humans_min: u8,
    #[arg(long, default_value_t = 12)]
    humans_max: u8,

    /// Starting monster count range
    #[arg(long, default_value_t = 4)]
    monsters_min: u8,
    #[arg(long, default_value_t = 30)]
    monsters_max: u8,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output directory for result files
    #[arg(short, long, default_value = "out")]
    output: String,
}

fn make_player(depth: u8, budget_ms: u64, random: bool) -> Box<dyn Player> {
    if random {
        Box::new(RandomPlayer::new())
    } else if depth > 0 {
        Box::new(SearchPlayer::with_depth(depth))
    } else {
        Box::new(SearchPlayer::with_timeout(Duration::from_millis(budget_ms)))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let _logger = nocturne::logging::init("info")?;
    let args = Args::parse();

    let limits = MapLimits {
        size_min: args.size_min,
        size_max: args.size_max,
        human_groups_min: args.humans_min,
        human_groups_max: args.humans_max,
        monsters_min: args.monsters_min,
        monsters_max: args.monsters_max,
    };

    let mut rng = StdRng::seed_from_u64(args.seed);
    let maps: Vec<_> = (0..args.maps).map(|_| random_map(&limits, &mut rng)).collect();

    log::info!("arena: {} maps, {} matches", args.maps, args.maps * 2);

    // One match per (map, side order); players are cheap to build, so each
    // match constructs its own pair and rayon spreads them over the cores.
    let results: Vec<MatchSummary> = (0..args.maps * 2)
        .into_par_iter()
        .map(|i| {
            let map = &maps[i / 2];
            let swap = i % 2 == 1;
            let mut match_rng = StdRng::seed_from_u64(args.seed.wrapping_add(1 + i as u64));

            let mut a = make_player(args.depth_a, args.budget_ms, false);
            let mut b = make_player(args.depth_b, args.budget_ms, args.random_b);

            let summary = if swap {
                flip_summary(play_match(b.as_mut(), a.as_mut(), map, args.max_turns, &mut match_rng))
            } else {
                play_match(a.as_mut(), b.as_mut(), map, args.max_turns, &mut match_rng)
            };
            log::info!("{}", summary.one_line());
            summary
        })
        .collect();

    print_leaderboard(&results);
    save_results(&args.output, &results)?;

    Ok(())
}

/// Re-expresses a sides-swapped match so that player A is always player 1
/// in the records.
fn flip_summary(summary: MatchSummary) -> MatchSummary {
    MatchSummary {
        map_name: summary.map_name,
        player1: summary.player2,
        player2: summary.player1,
        winner: match summary.winner {
            MatchWinner::Player1 => MatchWinner::Player2,
            MatchWinner::Player2 => MatchWinner::Player1,
            MatchWinner::Tie => MatchWinner::Tie,
        },
        player1_population: summary.player2_population,
        player2_population: summary.player1_population,
        end_turn: summary.end_turn,
    }
}

/// Three points for a win, one each for a tie.
fn print_leaderboard(results: &[MatchSummary]) {
    let mut points: HashMap<&str, u32> = HashMap::new();
    for summary in results {
        points.entry(&summary.player1).or_insert(0);
        points.entry(&summary.player2).or_insert(0);
        match summary.winner {
            MatchWinner::Player1 => *points.get_mut(summary.player1.as_str()).unwrap() += 3,
            MatchWinner::Player2 => *points.get_mut(summary.player2.as_str()).unwrap() += 3,
            MatchWinner::Tie => {
                *points.get_mut(summary.player1.as_str()).unwrap() += 1;
                *points.get_mut(summary.player2.as_str()).unwrap() += 1;
            }
        }
    }

    log::info!("leaderboard");
    let mut table: Vec<_> = points.into_iter().collect();
    table.sort_by_key(|(_, pts)| std::cmp::Reverse(*pts));
    for (name, pts) in table {
        log::info!("  {:<20} {:>3} points", name, pts);
    }
}

fn save_results(output: &str, results: &[MatchSummary]) -> Result<(), Box<dyn Error>> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let dir = PathBuf::from(output).join(format!("{}_arena", stamp));
    std::fs::create_dir_all(&dir)?;

    save_results_csv(&dir.join("results.csv"), results)?;

    for (i, summary) in results.iter().enumerate() {
        let path = dir.join(format!("match_{:03}.json", i));
        serde_json::to_writer_pretty(File::create(path)?, summary)?;
    }

    log::info!("results saved to {}", dir.display());
    Ok(())
}

fn save_results_csv(path: &Path, results: &[MatchSummary]) -> Result<(), Box<dyn Error>> {
    let mut writer = Writer::from_writer(File::create(path)?);
    writer.write_record([
        "map",
        "player1",
        "player2",
        "player1_population",
        "player2_population",
        "end_turn",
        "winner",
    ])?;

    for summary in results {
        let winner = match summary.winner {
            MatchWinner::Player1 => summary.player1.as_str(),
            MatchWinner::Player2 => summary.player2.as_str(),
            MatchWinner::Tie => "tie",
        };
        writer.write_record([
            summary.map_name.as_str(),
            summary.player1.as_str(),
            summary.player2.as_str(),
            &summary.player1_population.to_string(),
            &summary.player2_population.to_string(),
            &summary.end_turn.to_string(),
            winner,
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> MatchSummary {
        MatchSummary {
            map_name: "6x6".to_string(),
            player1: "alphabeta_d3".to_string(),
            player2: "random".to_string(),
            winner: MatchWinner::Player1,
            player1_population: 40,
            player2_population: 0,
            end_turn: 18,
        }
    }

    #[test]
    fn test_flip_summary_swaps_everything_but_the_map() {
        let flipped = flip_summary(summary());
        assert_eq!(flipped.map_name, "6x6");
        assert_eq!(flipped.player1, "random");
        assert_eq!(flipped.player2, "alphabeta_d3");
        assert_eq!(flipped.winner, MatchWinner::Player2);
        assert_eq!(flipped.player1_population, 0);
        assert_eq!(flipped.player2_population, 40);
        assert_eq!(flipped.end_turn, 18);
    }

    #[test]
    fn test_results_csv_has_one_row_per_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        let results = vec![summary(), flip_summary(summary())];
        save_results_csv(&path, &results).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("map,player1,player2"));
        assert!(lines[1].contains("alphabeta_d3"));
        assert!(lines[2].ends_with("alphabeta_d3"));
    }
}
