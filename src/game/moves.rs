use serde::{Deserialize, Serialize};

use crate::game::coordinates::Coordinates;
use crate::game::race::Race;
use crate::game::state::State;

/// One atomic transfer of `n` units from a cell to one of its eight
/// neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub start: Coordinates,
    pub n: u8,
    pub end: Coordinates,
}

/// A full turn action: one or more simultaneous moves by the same actor.
///
/// Within a coup no cell may be both the destination of one move and the
/// source of another, and the moves leaving a cell may not take more units
/// than the cell holds. Coups are kept sorted by destination so that two
/// coups with the same moves compare equal regardless of how they were built.
pub type Coup = Vec<Move>;

/// The destination ordering shared by the generator and the simulator:
/// moves aimed at the same cell end up contiguous.
pub fn destination_key(m: &Move) -> (u8, u8) {
    (m.end.y, m.end.x)
}

/// Scores a coup much faster than the full evaluation by counting only the
/// material at stake in the battles it starts: a coup with no battle scores
/// zero, favourable attacks positive, bad trades negative. Moves that
/// converge on one defender count that defender once.
pub fn quick_score(coup: &Coup, state: &State, race: Race) -> f64 {
    let mut fought: Vec<Coordinates> = Vec::new();
    let mut score = 0.0;

    for mv in coup {
        if let Some(end) = state.cell(mv.end) {
            if !end.is_empty() && end.race != race {
                if !fought.contains(&mv.end) {
                    fought.push(mv.end);
                    score -= f64::from(end.count);
                }
                score += f64::from(mv.n);
            }
        }
    }

    score
}

/// Orders coups most-promising-first so the alpha-beta window tightens as
/// early as possible. The sort is stable: coups without battles keep their
/// generation order.
pub fn sort_coups_by_quick_score(coups: &mut [Coup], state: &State, race: Race) {
    coups.sort_by(|a, b| {
        quick_score(b, state, race)
            .partial_cmp(&quick_score(a, state, race))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: u8, y: u8) -> Coordinates {
        Coordinates::new(x, y)
    }

    fn board() -> State {
        let mut state = State::new(4, 4);
        state.set_cell(pos(0, 0), Race::Ally, 10);
        state.set_cell(pos(1, 1), Race::Neutral, 4);
        state.set_cell(pos(2, 2), Race::Enemy, 12);
        state
    }

    #[test]
    fn test_quick_score_is_zero_without_battles() {
        let state = board();
        let coup = vec![Move { start: pos(0, 0), n: 10, end: pos(1, 0) }];
        assert_eq!(quick_score(&coup, &state, Race::Ally), 0.0);
    }

    #[test]
    fn test_quick_score_rewards_favourable_attacks() {
        let state = board();
        let eat = vec![Move { start: pos(0, 0), n: 10, end: pos(1, 1) }];
        assert_eq!(quick_score(&eat, &state, Race::Ally), 6.0);

        let trade = vec![Move { start: pos(0, 0), n: 10, end: pos(2, 2) }];
        assert!(quick_score(&trade, &state, Race::Ally) < 0.0);
    }

    #[test]
    fn test_quick_score_counts_a_shared_defender_once() {
        let mut state = board();
        state.set_cell(pos(2, 0), Race::Ally, 3);
        let converge = vec![
            Move { start: pos(0, 0), n: 10, end: pos(1, 1) },
            Move { start: pos(2, 0), n: 3, end: pos(1, 1) },
        ];
        // 10 + 3 attackers against 4 defenders, subtracted one time.
        assert_eq!(quick_score(&converge, &state, Race::Ally), 9.0);
    }

    #[test]
    fn test_sort_puts_the_best_battles_first() {
        let state = board();
        let mut coups = vec![
            vec![Move { start: pos(0, 0), n: 10, end: pos(1, 0) }],
            vec![Move { start: pos(0, 0), n: 10, end: pos(2, 2) }],
            vec![Move { start: pos(0, 0), n: 10, end: pos(1, 1) }],
        ];
        sort_coups_by_quick_score(&mut coups, &state, Race::Ally);

        assert_eq!(coups[0][0].end, pos(1, 1));
        assert_eq!(coups[1][0].end, pos(1, 0));
        assert_eq!(coups[2][0].end, pos(2, 2));
    }
}

