//! Probabilistic resolution of a coup.
//!
//! Applying a coup yields the list of positions the server could answer
//! with, each weighted by its probability. Battles with odds beyond the
//! configured threshold are collapsed into their likely outcome; this is
//! what keeps the number of branches from exploding on high-confidence
//! lines, and it is the main lever on how deep the search can look.

use crate::game::battle::win_probability;
use crate::game::coordinates::Coordinates;
use crate::game::moves::{destination_key, Coup};
use crate::game::race::Race;
use crate::game::state::{Cell, State};

/// One possible resulting position together with its probability.
#[derive(Debug, Clone, PartialEq)]
pub struct PotentialOutcome {
    pub state: State,
    pub p: f64,
}

impl State {
    /// Computes the possible positions after `race` plays `coup`.
    ///
    /// Moves are first sorted by destination so that several groups
    /// converging on one cell fight a single battle with their combined
    /// strength instead of several smaller ones. Sources are decremented on
    /// every live branch as the walk goes, and each aggregated attack then
    /// multiplies the branch set. The returned probabilities sum to 1.
    ///
    /// The coup must not be empty; the search never produces one.
    pub fn apply_coup(&self, race: Race, coup: &mut Coup, win_threshold: f64) -> Vec<PotentialOutcome> {
        assert!(!coup.is_empty(), "cannot apply an empty coup");

        let mut outcomes = vec![PotentialOutcome { state: self.copy(true), p: 1.0 }];

        coup.sort_by_key(destination_key);

        let mut target = coup[0].end;
        let mut strength: u8 = 0;
        for i in 0..coup.len() {
            let mv = coup[i];

            for outcome in &mut outcomes {
                outcome.state.decrease_cell(mv.start, race, mv.n);
            }

            if mv.end != target {
                outcomes = commit_attack(outcomes, race, target, strength, win_threshold);
                strength = 0;
                target = mv.end;
            }
            strength += mv.n;
        }

        commit_attack(outcomes, race, target, strength, win_threshold)
    }
}

/// Resolves one aggregated attack on every live branch and flattens the
/// resulting branch sets, multiplying probabilities along the way.
fn commit_attack(
    outcomes: Vec<PotentialOutcome>,
    race: Race,
    target: Coordinates,
    strength: u8,
    win_threshold: f64,
) -> Vec<PotentialOutcome> {
    let mut next = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        for branch in resolve_attack(outcome.state, race, target, strength, win_threshold) {
            next.push(PotentialOutcome { state: branch.state, p: branch.p * outcome.p });
        }
    }
    next
}

/// Resolves a single aggregated attack against `target`, consuming the
/// state it was handed. The win branch keeps mutating that state; only a
/// loss branch needs a fresh copy.
fn resolve_attack(
    mut state: State,
    race: Race,
    target: Coordinates,
    strength: u8,
    win_threshold: f64,
) -> Vec<PotentialOutcome> {
    let defender = state
        .cell(target)
        .copied()
        .unwrap_or(Cell { count: 0, race: Race::Neutral });

    if defender.is_empty() || defender.race == race {
        // Nobody to fight, the populations just merge.
        state.set_cell(target, race, defender.count + strength);
        return vec![PotentialOutcome { state, p: 1.0 }];
    }

    let is_neutral = defender.race == Race::Neutral;
    let p = win_probability(strength, defender.count, is_neutral);
    // On a victory against neutrals the survivors convert them.
    let converted = if is_neutral { f64::from(defender.count) } else { 0.0 };

    if p >= win_threshold {
        let survivors = (p * f64::from(strength) + converted * p) as u8;
        state.set_cell(target, race, survivors);
        return vec![PotentialOutcome { state, p: 1.0 }];
    }
    if p < 1.0 - win_threshold {
        let survivors = ((1.0 - p) * f64::from(defender.count)) as u8;
        state.set_cell(target, defender.race, survivors);
        return vec![PotentialOutcome { state, p: 1.0 }];
    }

    let mut loss_state = state.copy(false);
    // Each attacker survives with probability p, each defender with 1 - p.
    state.set_cell(target, race, (p * f64::from(strength) + converted * p) as u8);
    loss_state.set_cell(target, defender.race, ((1.0 - p) * f64::from(defender.count)) as u8);

    vec![
        PotentialOutcome { state, p },
        PotentialOutcome { state: loss_state, p: 1.0 - p },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::moves::Move;

    fn pos(x: u8, y: u8) -> Coordinates {
        Coordinates::new(x, y)
    }

    /// 2x2 board with ten neutrals in one corner and twenty allies in the
    /// opposite one.
    fn start_state() -> State {
        let mut state = State::new(2, 2);
        state.set_cell(pos(0, 0), Race::Neutral, 10);
        state.set_cell(pos(1, 1), Race::Ally, 20);
        state
    }

    #[test]
    fn test_sure_win_against_neutrals_converts_them() {
        let state = start_state();
        let mut coup = vec![Move { start: pos(1, 1), n: 11, end: pos(0, 0) }];

        let outcomes = state.apply_coup(Race::Ally, &mut coup, 1.0);

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].p, 1.0);
        let result = &outcomes[0].state;
        assert_eq!(result.cell(pos(0, 0)), Some(&Cell { count: 21, race: Race::Ally }));
        assert_eq!(result.cell(pos(1, 1)), Some(&Cell { count: 9, race: Race::Ally }));
        assert_eq!(result.total(Race::Ally), 30);
        assert_eq!(result.time(), 1);
    }

    #[test]
    fn test_uncertain_attack_splits_into_win_and_loss() {
        let state = start_state();
        let mut coup = vec![Move { start: pos(1, 1), n: 8, end: pos(0, 0) }];

        let outcomes = state.apply_coup(Race::Ally, &mut coup, 1.0);

        assert_eq!(outcomes.len(), 2);

        let win = &outcomes[0];
        assert!((win.p - 0.4).abs() < 1e-12);
        assert_eq!(win.state.cell(pos(0, 0)), Some(&Cell { count: 7, race: Race::Ally }));
        assert_eq!(win.state.cell(pos(1, 1)), Some(&Cell { count: 12, race: Race::Ally }));

        let loss = &outcomes[1];
        assert!((loss.p - 0.6).abs() < 1e-12);
        assert_eq!(loss.state.cell(pos(0, 0)), Some(&Cell { count: 6, race: Race::Neutral }));
        assert_eq!(loss.state.cell(pos(1, 1)), Some(&Cell { count: 12, race: Race::Ally }));
    }

    #[test]
    fn test_threshold_clamps_likely_wins() {
        let mut state = State::new(2, 2);
        state.set_cell(pos(0, 0), Race::Enemy, 10);
        state.set_cell(pos(1, 1), Race::Ally, 20);
        // p = 0.5: at threshold 0.5 this collapses to a single win branch.
        let mut coup = vec![Move { start: pos(1, 1), n: 10, end: pos(0, 0) }];

        let outcomes = state.apply_coup(Race::Ally, &mut coup, 0.5);

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].p, 1.0);
        // Half the attackers survive; a clamped win erases the defenders.
        assert_eq!(
            outcomes[0].state.cell(pos(0, 0)),
            Some(&Cell { count: 5, race: Race::Ally })
        );
        assert_eq!(outcomes[0].state.total(Race::Enemy), 0);
    }

    #[test]
    fn test_threshold_clamps_likely_losses() {
        let mut state = State::new(2, 2);
        state.set_cell(pos(0, 0), Race::Enemy, 100);
        state.set_cell(pos(1, 1), Race::Ally, 20);
        // p = 0.1 < 1 - 0.85: a sure loss, the defenders keep the cell.
        let mut coup = vec![Move { start: pos(1, 1), n: 20, end: pos(0, 0) }];

        let outcomes = state.apply_coup(Race::Ally, &mut coup, 0.85);

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].p, 1.0);
        assert_eq!(
            outcomes[0].state.cell(pos(0, 0)),
            Some(&Cell { count: 90, race: Race::Enemy })
        );
        assert_eq!(outcomes[0].state.total(Race::Ally), 0);
    }

    #[test]
    fn test_moves_on_same_destination_fight_once() {
        let mut state = State::new(3, 3);
        state.set_cell(pos(0, 0), Race::Ally, 6);
        state.set_cell(pos(2, 2), Race::Ally, 6);
        state.set_cell(pos(1, 1), Race::Neutral, 12);

        // Separately each group would be outnumbered; together they convert
        // the neutrals with certainty.
        let mut coup = vec![
            Move { start: pos(0, 0), n: 6, end: pos(1, 1) },
            Move { start: pos(2, 2), n: 6, end: pos(1, 1) },
        ];

        let outcomes = state.apply_coup(Race::Ally, &mut coup, 1.0);

        assert_eq!(outcomes.len(), 1);
        assert_eq!(
            outcomes[0].state.cell(pos(1, 1)),
            Some(&Cell { count: 24, race: Race::Ally })
        );
    }

    #[test]
    fn test_merging_with_friendly_cell_is_deterministic() {
        let mut state = State::new(2, 2);
        state.set_cell(pos(0, 0), Race::Ally, 4);
        state.set_cell(pos(1, 1), Race::Ally, 9);
        let mut coup = vec![Move { start: pos(1, 1), n: 3, end: pos(0, 0) }];

        let outcomes = state.apply_coup(Race::Ally, &mut coup, 1.0);

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].state.cell(pos(0, 0)), Some(&Cell { count: 7, race: Race::Ally }));
        assert_eq!(outcomes[0].state.cell(pos(1, 1)), Some(&Cell { count: 6, race: Race::Ally }));
        assert_eq!(outcomes[0].state.total(Race::Ally), 13);
    }

    #[test]
    fn test_probabilities_sum_to_one_across_battles() {
        let mut state = State::new(4, 4);
        state.set_cell(pos(0, 0), Race::Ally, 8);
        state.set_cell(pos(3, 3), Race::Ally, 8);
        state.set_cell(pos(1, 1), Race::Neutral, 10);
        state.set_cell(pos(2, 2), Race::Enemy, 9);

        // Two uncertain battles: four weighted branches.
        let mut coup = vec![
            Move { start: pos(0, 0), n: 8, end: pos(1, 1) },
            Move { start: pos(3, 3), n: 8, end: pos(2, 2) },
        ];

        let outcomes = state.apply_coup(Race::Ally, &mut coup, 1.0);

        assert_eq!(outcomes.len(), 4);
        let total: f64 = outcomes.iter().map(|o| o.p).sum();
        assert!((total - 1.0).abs() < 1e-9);
        for outcome in &outcomes {
            assert!(outcome.p > 0.0 && outcome.p <= 1.0);
        }
    }

    #[test]
    fn test_population_bookkeeping_survives_a_coup() {
        let state = start_state();
        let mut coup = vec![Move { start: pos(1, 1), n: 8, end: pos(0, 0) }];

        for outcome in state.apply_coup(Race::Ally, &mut coup, 1.0) {
            let expected: u32 = outcome
                .state
                .cells()
                .filter(|(_, c)| c.race == Race::Ally)
                .map(|(_, c)| u32::from(c.count))
                .sum();
            assert_eq!(outcome.state.total(Race::Ally), expected);
        }
    }

    #[test]
    #[should_panic]
    fn test_empty_coup_is_rejected() {
        let state = start_state();
        let mut coup = Coup::new();
        let _ = state.apply_coup(Race::Ally, &mut coup, 1.0);
    }
}
