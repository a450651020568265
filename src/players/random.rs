use crate::game::moves::Coup;
use crate::game::race::Race;
use crate::game::state::State;
use crate::players::Player;
use crate::search::algorithm::random_coup;
use crate::search::heuristic::HeuristicParameters;

/// The baseline opponent: plays a uniformly random legal move every turn.
#[derive(Debug, Default)]
pub struct RandomPlayer {
    params: HeuristicParameters,
}

impl RandomPlayer {
    pub fn new() -> Self {
        RandomPlayer::default()
    }
}

impl Player for RandomPlayer {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_coup(&mut self, state: &State) -> Coup {
        random_coup(state, Race::Ally, &self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::coordinates::Coordinates;

    #[test]
    fn test_plays_a_legal_move_when_possible() {
        let mut state = State::new(3, 3);
        state.set_cell(Coordinates::new(1, 1), Race::Ally, 6);
        state.set_cell(Coordinates::new(0, 0), Race::Enemy, 6);

        let mut player = RandomPlayer::new();
        let coup = player.choose_coup(&state);
        assert_eq!(coup.len(), 1);
        assert_eq!(coup[0].start, Coordinates::new(1, 1));
    }

    #[test]
    fn test_concedes_without_cells() {
        let state = State::new(3, 3);
        let mut player = RandomPlayer::new();
        assert!(player.choose_coup(&state).is_empty());
    }
}
