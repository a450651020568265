//! Position evaluation.
//!
//! The score is always computed from the ally point of view: positive values
//! favour us, negative values favour the enemy, and the search flips between
//! maximising and minimising as the turn alternates. The weights below were
//! tuned in self-play matches; the battle terms are off by default because
//! population difference plus the time-discounted advantage already wins
//! against the baselines, at a fraction of the evaluation cost.

use serde::{Deserialize, Serialize};

use crate::game::battle::win_probability;
use crate::game::race::Race;
use crate::game::state::State;

/// Tunable weights for the evaluation and the search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicParameters {
    /// Weight on the population difference.
    /// Default: 1
    pub counts: f64,

    /// Weight on the expected gain of monster-versus-monster battles,
    /// normalised by the distance between the two groups.
    /// Default: 0
    pub battles: f64,

    /// Weight on the expected gain of battles against neutral groups,
    /// normalised by distance.
    /// Default: 0
    pub neutral_battles: f64,

    /// Weight on the advantage accumulated turn after turn. Small on
    /// purpose: it only breaks ties between lines that end up in the same
    /// place, in favour of the one that got there sooner.
    /// Default: 1e-4
    pub cum_score: f64,

    /// Magnitude of a terminal win.
    /// Default: 1e10
    pub win_score: f64,

    /// Penalty ratio applied to a terminal loss; above 1 the engine fears
    /// dying more than it enjoys winning.
    /// Default: 1
    pub lose_over_win_ratio: f64,

    /// Probability above which the simulator collapses a battle into a sure
    /// win (and below one minus it, into a sure loss).
    /// Default: 1
    pub win_threshold: f64,

    /// A race may split a group only while it occupies fewer cells than
    /// this.
    /// Default: 2
    pub max_groups: u16,

    /// Weight on the group-count difference; negative values discourage
    /// spreading out.
    /// Default: 0
    pub groups: f64,
}

impl Default for HeuristicParameters {
    fn default() -> Self {
        HeuristicParameters {
            counts: 1.0,
            battles: 0.0,
            neutral_battles: 0.0,
            cum_score: 1e-4,
            win_score: 1e10,
            lose_over_win_ratio: 1.0,
            win_threshold: 1.0,
            max_groups: 2,
            groups: 0.0,
        }
    }
}

/// Scores positions with a fixed set of weights.
#[derive(Debug, Clone, Default)]
pub struct Heuristic {
    params: HeuristicParameters,
}

impl Heuristic {
    pub fn new(params: HeuristicParameters) -> Self {
        Heuristic { params }
    }

    pub fn params(&self) -> &HeuristicParameters {
        &self.params
    }

    /// Evaluates a position from the ally point of view.
    ///
    /// Finished games collapse to the win score, adjusted by the cumulative
    /// advantage so that among winning lines the earliest win scores
    /// highest, and among losing lines the longest resistance does.
    pub fn score(&self, state: &State) -> f64 {
        let p = &self.params;

        if state.total(Race::Ally) == 0 {
            return -p.win_score * p.lose_over_win_ratio + state.cumulative_score;
        }
        if state.total(Race::Enemy) == 0 {
            return p.win_score - state.cumulative_score;
        }

        // Expected battle gains per faction, distance-normalised. Indexed by
        // faction: [ally, enemy].
        let mut battles = [0.0f64; 2];
        let mut neutral_battles = [0.0f64; 2];

        if p.battles != 0.0 || p.neutral_battles != 0.0 {
            for (pos1, c1) in state.cells() {
                if c1.race == Race::Neutral || c1.count == 0 {
                    continue;
                }
                let side = c1.race as usize - 1;
                for (pos2, c2) in state.cells() {
                    if pos2 == pos1 || c2.race == c1.race || c2.count == 0 {
                        continue;
                    }
                    let d = pos1.distance(*pos2);
                    let strengths = f64::from(c1.count) + f64::from(c2.count);
                    if c2.race == Race::Neutral {
                        // A lost raid on neutrals gains nothing, it only
                        // wastes attackers, hence the clamp at zero.
                        let w = win_probability(c1.count, c2.count, true);
                        neutral_battles[side] += (w * strengths - f64::from(c1.count)).max(0.0) / d;
                    } else {
                        let w = win_probability(c1.count, c2.count, false);
                        battles[side] += (w * strengths - f64::from(c2.count)) / d;
                    }
                }
            }
        }

        let counts = f64::from(state.total(Race::Ally)) - f64::from(state.total(Race::Enemy));
        let groups = f64::from(state.groups(Race::Ally)) - f64::from(state.groups(Race::Enemy));

        p.counts * counts
            + p.battles * (battles[0] - battles[1])
            + p.neutral_battles * (neutral_battles[0] - neutral_battles[1])
            + p.groups * groups
            + p.cum_score * state.cumulative_score
    }
}
