//! Legal move and coup enumeration.

use crate::game::coordinates::Coordinates;
use crate::game::moves::{destination_key, Coup, Move};
use crate::game::race::Race;
use crate::game::state::State;
use crate::search::heuristic::HeuristicParameters;
use crate::search::pool::CoupPool;

/// The eight king-move offsets.
const NEIGHBOURS: [(i16, i16); 8] = [
    (0, -1),
    (0, 1),
    (1, 0),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, -1),
    (-1, 1),
];

fn neighbour(state: &State, pos: Coordinates, dx: i16, dy: i16) -> Option<Coordinates> {
    let x = i16::from(pos.x) + dx;
    let y = i16::from(pos.y) + dy;
    if x < 0 || x >= i16::from(state.width) || y < 0 || y >= i16::from(state.height) {
        return None;
    }
    Some(Coordinates::new(x as u8, y as u8))
}

/// Emits the moves one cell may play into `moves`: the full group towards
/// each in-bounds neighbour, plus half the group right behind it when a
/// split is allowed.
fn moves_from_cell(
    state: &State,
    source: Coordinates,
    count: u8,
    allow_split: bool,
    moves: &mut Vec<Move>,
) {
    for (dx, dy) in NEIGHBOURS {
        if let Some(end) = neighbour(state, source, dx, dy) {
            moves.push(Move { start: source, n: count, end });
            if allow_split {
                moves.push(Move { start: source, n: count / 2, end });
            }
        }
    }
}

/// Whether `race` may split the group at hand. Splitting stops once the race
/// occupies its cap of cells, and half the group must still be a credible
/// threat to the smallest neutral cell on the board.
fn split_allowed(state: &State, race: Race, count: u8, params: &HeuristicParameters) -> bool {
    count >= 2
        && state.groups(race) < params.max_groups
        && u16::from(count) >= 2 * u16::from(state.smallest_neutral_group())
}

/// All single moves available to `race`, one entry per (cell, target,
/// strength) option.
pub fn generate_moves(state: &State, race: Race, params: &HeuristicParameters) -> Vec<Move> {
    let mut moves = Vec::new();
    for (pos, cell) in state.cells() {
        if cell.race != race || cell.count == 0 {
            continue;
        }
        let allow_split = split_allowed(state, race, cell.count, params);
        moves_from_cell(state, *pos, cell.count, allow_split, &mut moves);
    }
    moves
}

/// Enumerates every legal coup for `race`.
///
/// Coups grow as a prefix product over the owned cells: each cell either
/// stays put or contributes one of its moves to every coup built so far.
/// Visiting each source cell exactly once keeps per-source totals within
/// bounds and rules out duplicate coups; the remaining constraint, that no
/// move may end on another move's source, is checked pair-wise as coups are
/// extended. The all-stay prefix is dropped at the end: a coup has to move
/// something.
///
/// Both the returned container and the coups inside it come from the pool
/// and should go back to it once the caller is done.
pub fn generate_coups(
    state: &State,
    race: Race,
    params: &HeuristicParameters,
    pool: &mut CoupPool,
) -> Vec<Coup> {
    let mut coups = pool.take_container();
    coups.push(pool.take_coup());

    let mut cell_moves = Vec::new();
    for (pos, cell) in state.cells() {
        if cell.race != race || cell.count == 0 {
            continue;
        }

        cell_moves.clear();
        let allow_split = split_allowed(state, race, cell.count, params);
        moves_from_cell(state, *pos, cell.count, allow_split, &mut cell_moves);

        let existing = coups.len();
        for i in 0..existing {
            for mv in &cell_moves {
                if conflicts(&coups[i], *mv) {
                    continue;
                }
                let mut extended = pool.take_coup();
                extended.extend_from_slice(&coups[i]);
                extended.push(*mv);
                coups.push(extended);
            }
        }
    }

    let empty_prefix = coups.remove(0);
    pool.put_coup(empty_prefix);

    // Canonical destination order, so that equal coups compare equal and the
    // simulator's own sort finds nothing to do.
    for coup in &mut coups {
        coup.sort_by_key(destination_key);
    }

    coups
}

/// A cell that receives units this turn may not also send some away.
fn conflicts(coup: &Coup, mv: Move) -> bool {
    coup.iter().any(|m| m.end == mv.start || m.start == mv.end)
}
