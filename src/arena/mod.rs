//! Local matches between two players.
//!
//! Stands in for a real game server when comparing engine configurations:
//! random mirrored maps, alternating turns, encounters resolved by sampling
//! the simulator's outcome distribution. With the threshold at 1 the
//! distribution is exact, so the sampled resolution follows the same odds a
//! server would roll.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game::race::Race;
use crate::game::simulator::PotentialOutcome;
use crate::game::state::State;
use crate::game::coordinates::Coordinates;
use crate::players::Player;

/// Bounds for random map generation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MapLimits {
    pub size_min: u8,
    pub size_max: u8,
    pub human_groups_min: u8,
    pub human_groups_max: u8,
    pub monsters_min: u8,
    pub monsters_max: u8,
}

impl Default for MapLimits {
    fn default() -> Self {
        MapLimits {
            size_min: 5,
            size_max: 15,
            human_groups_min: 2,
            human_groups_max: 12,
            monsters_min: 4,
            monsters_max: 30,
        }
    }
}

/// Generates a random starting position. Both factions get the same number
/// of monsters on point-mirrored cells, and human groups come in mirrored
/// pairs too, so neither side starts with a material or positional edge.
pub fn random_map(limits: &MapLimits, rng: &mut StdRng) -> State {
    let height = rng.random_range(limits.size_min..=limits.size_max);
    let width = rng.random_range(limits.size_min..=limits.size_max);
    let mut state = State::new(height, width);

    let mirror = |pos: Coordinates| Coordinates::new(width - 1 - pos.x, height - 1 - pos.y);
    let random_pos =
        |rng: &mut StdRng| Coordinates::new(rng.random_range(0..width), rng.random_range(0..height));

    let monsters = rng.random_range(limits.monsters_min..=limits.monsters_max);
    let home = loop {
        let pos = random_pos(rng);
        // The centre cell of an odd board mirrors onto itself.
        if mirror(pos) != pos {
            break pos;
        }
    };
    state.set_cell(home, Race::Ally, monsters);
    state.set_cell(mirror(home), Race::Enemy, monsters);

    let human_groups = rng.random_range(limits.human_groups_min..=limits.human_groups_max);
    for _ in 0..human_groups {
        let pos = random_pos(rng);
        if state.cell(pos).is_some() || state.cell(mirror(pos)).is_some() || mirror(pos) == pos {
            continue;
        }
        let count = rng.random_range(1..=monsters);
        state.set_cell(pos, Race::Neutral, count);
        state.set_cell(mirror(pos), Race::Neutral, count);
    }

    state
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchWinner {
    Tie,
    Player1,
    Player2,
}

/// The record of one finished match. Scores are the surviving populations;
/// no move history is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub map_name: String,
    pub player1: String,
    pub player2: String,
    pub winner: MatchWinner,
    pub player1_population: u32,
    pub player2_population: u32,
    pub end_turn: u16,
}

impl MatchSummary {
    pub fn one_line(&self) -> String {
        format!(
            "{:<16} VS {:<16} | {:>3} - {:<3} | {:>3} half-turns | {}",
            self.player1,
            self.player2,
            self.player1_population,
            self.player2_population,
            self.end_turn,
            self.map_name,
        )
    }
}

/// Plays one match to the end (or the turn cap). Player 1 owns the map's
/// ally faction and moves first; player 2 sees the board with the factions
/// swapped so that both think of themselves as the ally.
pub fn play_match(
    player1: &mut dyn Player,
    player2: &mut dyn Player,
    map: &State,
    max_turns: u16,
    rng: &mut StdRng,
) -> MatchSummary {
    let mut state = map.copy(false);
    let mut end_turn = 0;

    for turn in 0..max_turns {
        if state.game_over() {
            break;
        }
        end_turn = turn + 1;

        let (actor, mut coup) = if turn % 2 == 0 {
            (Race::Ally, player1.choose_coup(&state))
        } else {
            (Race::Enemy, player2.choose_coup(&swapped(&state)))
        };
        if coup.is_empty() {
            break;
        }

        let outcomes = state.apply_coup(actor, &mut coup, 1.0);
        state = sample_outcome(outcomes, rng);
    }

    let p1 = state.total(Race::Ally);
    let p2 = state.total(Race::Enemy);
    let winner = match p1.cmp(&p2) {
        std::cmp::Ordering::Greater => MatchWinner::Player1,
        std::cmp::Ordering::Less => MatchWinner::Player2,
        std::cmp::Ordering::Equal => MatchWinner::Tie,
    };

    MatchSummary {
        map_name: format!("{}x{}", map.height, map.width),
        player1: player1.name().to_string(),
        player2: player2.name().to_string(),
        winner,
        player1_population: p1,
        player2_population: p2,
        end_turn,
    }
}

/// The board as the other side sees it.
fn swapped(state: &State) -> State {
    let mut out = State::new(state.height, state.width);
    for (pos, cell) in state.cells() {
        let race = match cell.race {
            Race::Ally => Race::Enemy,
            Race::Enemy => Race::Ally,
            Race::Neutral => Race::Neutral,
        };
        out.set_cell(*pos, race, cell.count);
    }
    out
}

/// Draws one resulting position according to the outcome probabilities.
fn sample_outcome(outcomes: Vec<PotentialOutcome>, rng: &mut StdRng) -> State {
    let draw: f64 = rng.random();
    let mut acc = 0.0;
    let last = outcomes.len() - 1;
    for (i, outcome) in outcomes.into_iter().enumerate() {
        acc += outcome.p;
        if draw < acc || i == last {
            return outcome.state;
        }
    }
    unreachable!("outcome probabilities sum to one");
}
