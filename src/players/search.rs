use std::time::Duration;

use crate::game::moves::Coup;
use crate::game::state::State;
use crate::players::Player;
use crate::search::algorithm::{find_best_coup_depth, find_best_coup_with_timeout};
use crate::search::heuristic::HeuristicParameters;

/// How much thinking a [`SearchPlayer`] is allowed per turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBudget {
    /// Deepen to exactly this many plies, however long it takes.
    Depth(u8),
    /// Deepen for this long and answer with the best coup found.
    Timeout(Duration),
}

/// The alpha-beta engine behind the [`Player`] seam.
pub struct SearchPlayer {
    name: String,
    params: HeuristicParameters,
    budget: SearchBudget,
}

impl SearchPlayer {
    pub fn with_depth(depth: u8) -> Self {
        SearchPlayer {
            name: format!("alphabeta_d{}", depth),
            params: HeuristicParameters::default(),
            budget: SearchBudget::Depth(depth),
        }
    }

    pub fn with_timeout(budget: Duration) -> Self {
        SearchPlayer {
            name: format!("alphabeta_{}ms", budget.as_millis()),
            params: HeuristicParameters::default(),
            budget: SearchBudget::Timeout(budget),
        }
    }

    /// Replaces the default evaluation weights.
    pub fn with_params(mut self, params: HeuristicParameters) -> Self {
        self.params = params;
        self
    }
}

impl Player for SearchPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_coup(&mut self, state: &State) -> Coup {
        match self.budget {
            SearchBudget::Depth(depth) => {
                let (coup, score) = find_best_coup_depth(&self.params, state, depth);
                log::debug!("{} picked a coup with score {:.3}", self.name, score);
                coup
            }
            SearchBudget::Timeout(timeout) => find_best_coup_with_timeout(&self.params, state, timeout),
        }
    }
}
