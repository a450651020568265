//! Iterative-deepening alpha-beta search.
//!
//! The engine has two faces: a deterministic fixed-depth search used by the
//! tests and the arena, and an anytime driver that runs the deepening loop
//! on a worker thread and returns whatever the worker last published when
//! the clock runs out. The worker polls a shared cancellation flag at the
//! top of every recursive call, which bounds how far past the deadline it
//! can still be computing to a single leaf evaluation and the backtrack.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::prelude::*;

use crate::game::moves::{sort_coups_by_quick_score, Coup};
use crate::game::race::Race;
use crate::game::state::State;
use crate::search::generation::{generate_coups, generate_moves};
use crate::search::heuristic::{Heuristic, HeuristicParameters};
use crate::search::pool::CoupPool;
use crate::search::transposition::{Bound, Entry, TranspositionTable};

/// Slack the anytime driver keeps for reading the last published result and
/// returning before the deadline.
const DRIVER_MARGIN: Duration = Duration::from_millis(5);

/// One search in progress: the evaluation weights plus all the mutable
/// machinery a search owns exclusively. Nothing in here is shared between
/// threads; the anytime driver gives its worker a searcher of its own.
struct Searcher {
    heuristic: Heuristic,
    table: TranspositionTable,
    pool: CoupPool,
    scratch: Vec<u32>,
    cancel: Arc<AtomicBool>,
}

impl Searcher {
    fn new(params: HeuristicParameters, cancel: Arc<AtomicBool>) -> Self {
        Searcher {
            heuristic: Heuristic::new(params),
            table: TranspositionTable::new(),
            pool: CoupPool::new(),
            scratch: Vec::new(),
            cancel,
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// One alpha-beta node. Returns the best coup found and its value; the
    /// coup is empty at leaves, when the actor has no move, and when the
    /// search was cancelled (the caller is being unwound and discards the
    /// result).
    fn alphabeta(
        &mut self,
        state: &State,
        actor: Race,
        mut alpha: f64,
        mut beta: f64,
        depth: u8,
        max_depth: u8,
    ) -> (Coup, f64) {
        if self.cancelled() {
            return (Coup::new(), 0.0);
        }

        let hash = state.hash(actor, &mut self.scratch);

        if depth >= max_depth || state.game_over() {
            return (Coup::new(), self.heuristic.score(state));
        }

        let mut coups = generate_coups(state, actor, self.heuristic.params(), &mut self.pool);
        if coups.is_empty() {
            self.pool.put_container(coups);
            return (Coup::new(), self.heuristic.score(state));
        }

        // Promising battles first, then the previous iteration's favourite
        // in front of everything: with a narrow window the first coup
        // searched prunes most of its siblings.
        sort_coups_by_quick_score(&mut coups, state, actor);
        if let Some(previous_best) = self.table.best_coup(hash) {
            if let Some(i) = coups.iter().position(|c| c == previous_best) {
                coups.swap(0, i);
            }
        }

        let maximising = actor == Race::Ally;
        let mut value = if maximising { -f64::MAX } else { f64::MAX };
        let mut best: Option<Coup> = None;

        for i in 0..coups.len() {
            if self.cancelled() {
                break;
            }

            let mut coup = std::mem::take(&mut coups[i]);

            let win_threshold = self.heuristic.params().win_threshold;
            let outcomes = state.apply_coup(actor, &mut coup, win_threshold);

            // The value of a coup is the average of its outcomes, weighted
            // by how likely the server is to pick each.
            let mut score = 0.0;
            for outcome in &outcomes {
                let (child_best, child_score) =
                    self.alphabeta(&outcome.state, actor.opponent(), alpha, beta, depth + 1, max_depth);
                self.pool.put_coup(child_best);
                score += child_score * outcome.p;
            }

            let improves = if maximising { score > value } else { score < value };
            if improves || best.is_none() {
                value = score;
                if let Some(previous) = best.replace(coup) {
                    self.pool.put_coup(previous);
                }
            } else {
                self.pool.put_coup(coup);
            }

            if maximising {
                if value > beta {
                    break;
                }
                alpha = alpha.max(value);
            } else {
                if alpha > value {
                    break;
                }
                beta = beta.min(value);
            }
        }

        self.pool.put_container(coups);

        if self.cancelled() {
            if let Some(coup) = best {
                self.pool.put_coup(coup);
            }
            return (Coup::new(), 0.0);
        }

        let best = best.unwrap_or_default();
        let bound = if alpha > value {
            Bound::Lower
        } else if value > beta {
            Bound::Upper
        } else {
            Bound::Exact
        };
        self.table.insert(
            hash,
            Entry { depth: max_depth, score: value, bound, best_coup: best.clone() },
        );

        (best, value)
    }
}

/// Deterministic search: deepens from 1 to `max_depth` and returns the last
/// completed iteration's best coup and value. The transposition table
/// carries over between iterations so each one starts from the previous
/// one's move ordering.
pub fn find_best_coup_depth(
    params: &HeuristicParameters,
    state: &State,
    max_depth: u8,
) -> (Coup, f64) {
    let cancel = Arc::new(AtomicBool::new(false));
    let mut searcher = Searcher::new(params.clone(), cancel);

    let mut best = (Coup::new(), 0.0);
    for depth in 1..=max_depth {
        best = searcher.alphabeta(state, Race::Ally, -f64::MAX, f64::MAX, 0, depth);
    }
    best
}

/// Anytime search: keeps deepening until the budget runs out, then returns
/// the deepest result published so far.
///
/// The fallback for the degenerate cases, a uniformly random legal coup, is
/// drawn before the worker even starts, so there is always something to
/// answer with; it is empty only when we no longer own a single cell, at
/// which point the game is lost anyway.
pub fn find_best_coup_with_timeout(
    params: &HeuristicParameters,
    state: &State,
    timeout: Duration,
) -> Coup {
    let deadline = Instant::now() + timeout;
    let fallback = random_coup(state, Race::Ally, params);

    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel();

    let worker_state = state.clone();
    let worker_params = params.clone();
    let worker_cancel = Arc::clone(&cancel);
    thread::spawn(move || {
        let mut searcher = Searcher::new(worker_params, worker_cancel);
        for depth in 1..=u8::MAX {
            if searcher.cancelled() {
                break;
            }
            let (coup, score) =
                searcher.alphabeta(&worker_state, Race::Ally, -f64::MAX, f64::MAX, 0, depth);
            if searcher.cancelled() {
                break;
            }
            if coup.is_empty() {
                // Nothing to play at depth one means nothing to play at all.
                break;
            }
            if tx.send((depth, coup, score)).is_err() {
                break;
            }
        }
    });

    let mut best: Option<Coup> = None;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining <= DRIVER_MARGIN {
            break;
        }
        match rx.recv_timeout(remaining - DRIVER_MARGIN) {
            Ok((depth, coup, score)) => {
                log::debug!("depth {} done, score {:.3}, {} moves", depth, score, coup.len());
                best = Some(coup);
            }
            Err(mpsc::RecvTimeoutError::Timeout) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }
    cancel.store(true, Ordering::Relaxed);

    match best {
        Some(coup) if !coup.is_empty() => coup,
        _ => fallback,
    }
}

/// A uniformly random legal coup: one full or half move of one owned cell.
pub fn random_coup(state: &State, race: Race, params: &HeuristicParameters) -> Coup {
    let moves = generate_moves(state, race, params);
    if moves.is_empty() {
        return Coup::new();
    }
    let mut rng = rand::rng();
    vec![moves[rng.random_range(0..moves.len())]]
}
