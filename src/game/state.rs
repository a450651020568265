use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::Hasher;

use serde::{Deserialize, Serialize};

use crate::game::coordinates::Coordinates;
use crate::game::race::Race;

/// The population of one grid cell. A cell is empty when its count is zero;
/// empty cells are normally not stored at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub count: u8,
    pub race: Race,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// A full game position.
///
/// The grid maps occupied coordinates to cells; the only zero-count entries
/// are neutral markers coming straight from the wire. Population totals and
/// group counts are maintained incrementally on every mutation so the
/// evaluation never has to rescan the grid.
///
/// Do not touch the grid directly: go through [`State::set_cell`],
/// [`State::decrease_cell`] and [`State::empty_cell`] so the counters stay
/// consistent. Mutating a cell that does not exist, or taking more units out
/// of a cell than it holds, is a programming error and panics: it means the
/// position was corrupted upstream and nothing sensible can be computed from
/// it anymore.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    grid: HashMap<Coordinates, Cell>,
    pub height: u8,
    pub width: u8,
    time: u8,
    ally_total: u32,
    enemy_total: u32,
    ally_groups: u16,
    enemy_groups: u16,
    smallest_neutral_group: u8,
    pub cumulative_score: f64,
}

impl State {
    pub fn new(height: u8, width: u8) -> State {
        State {
            grid: HashMap::new(),
            height,
            width,
            time: 0,
            ally_total: 0,
            enemy_total: 0,
            ally_groups: 0,
            enemy_groups: 0,
            smallest_neutral_group: 0,
            cumulative_score: 0.0,
        }
    }

    /// Copies the position. When `advance_time` is set the copy is the start
    /// of a new turn: the turn counter moves forward and the current
    /// population advantage is banked into the cumulative score, discounted
    /// so that an advantage held early counts for more than the same
    /// advantage held late.
    pub fn copy(&self, advance_time: bool) -> State {
        let mut next = self.clone();
        if advance_time {
            next.cumulative_score += (1.0 - f64::from(self.time) / 1000.0)
                * (f64::from(self.ally_total) - f64::from(self.enemy_total));
            next.time = next.time.saturating_add(1);
        }
        next
    }

    /// Overwrites a cell. Setting a monster cell to zero erases it; a
    /// zero-count neutral cell is kept, because that is how the server marks
    /// neutral positions before populating them.
    pub fn set_cell(&mut self, pos: Coordinates, race: Race, count: u8) {
        if count == 0 && race != Race::Neutral {
            self.empty_cell(pos);
            return;
        }

        let cell = Cell { count, race };
        let stale_minimum = self
            .grid
            .insert(pos, cell)
            .is_some_and(|old| self.remove_from_counters(old));
        self.add_to_counters(cell);
        if stale_minimum {
            self.rescan_smallest_neutral();
        }
    }

    /// Takes `count` units out of the cell at `pos`, erasing it on exact
    /// depletion. The cell must exist, belong to `race` and hold at least
    /// `count` units.
    pub fn decrease_cell(&mut self, pos: Coordinates, race: Race, count: u8) {
        let cell = match self.grid.get(&pos) {
            Some(c) => *c,
            None => panic!("tried to decrease population at missing cell ({}, {})", pos.x, pos.y),
        };

        if cell.race != race {
            panic!(
                "invalid move from ({}, {}): expected {:?} there, found {:?}",
                pos.x, pos.y, race, cell.race
            );
        }

        if cell.count == count {
            self.empty_cell(pos);
            return;
        }

        if cell.count < count {
            panic!(
                "invalid move from ({}, {}): taking {} units out of {}",
                pos.x, pos.y, count, cell.count
            );
        }

        let next = Cell { count: cell.count - count, race };
        self.grid.insert(pos, next);
        let stale_minimum = self.remove_from_counters(cell);
        self.add_to_counters(next);
        if stale_minimum {
            self.rescan_smallest_neutral();
        }
    }

    pub fn empty_cell(&mut self, pos: Coordinates) {
        if let Some(old) = self.grid.remove(&pos) {
            if self.remove_from_counters(old) {
                self.rescan_smallest_neutral();
            }
        }
    }

    pub fn game_over(&self) -> bool {
        self.ally_total == 0 || self.enemy_total == 0
    }

    pub fn cell(&self, pos: Coordinates) -> Option<&Cell> {
        self.grid.get(&pos)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&Coordinates, &Cell)> {
        self.grid.iter()
    }

    pub fn occupied(&self) -> usize {
        self.grid.len()
    }

    pub fn time(&self) -> u8 {
        self.time
    }

    pub fn total(&self, race: Race) -> u32 {
        match race {
            Race::Ally => self.ally_total,
            Race::Enemy => self.enemy_total,
            Race::Neutral => panic!("neutral population total is not tracked"),
        }
    }

    /// Number of grid cells occupied by `race`.
    pub fn groups(&self, race: Race) -> u16 {
        match race {
            Race::Ally => self.ally_groups,
            Race::Enemy => self.enemy_groups,
            Race::Neutral => panic!("neutral group count is not tracked"),
        }
    }

    /// Size of the smallest populated neutral group, zero when there is none.
    pub fn smallest_neutral_group(&self) -> u8 {
        self.smallest_neutral_group
    }

    /// Hashes the occupancy of the position together with the actor to move.
    ///
    /// Each cell packs into one 32-bit word; the words are sorted in the
    /// caller-owned scratch buffer first, so that two identical positions
    /// hash the same no matter in which order their cells were inserted. The
    /// buffer is reused across calls to avoid allocating on every node of a
    /// search; it must not be shared between concurrent searches.
    pub fn hash(&self, actor: Race, scratch: &mut Vec<u32>) -> u64 {
        scratch.clear();
        for (pos, cell) in &self.grid {
            scratch.push(
                u32::from(pos.x)
                    | u32::from(pos.y) << 8
                    | u32::from(cell.count) << 16
                    | (cell.race as u32) << 24,
            );
        }
        scratch.push(actor as u32);
        scratch.sort_unstable();

        let mut hasher = DefaultHasher::new();
        for word in scratch.iter() {
            hasher.write_u32(*word);
        }
        hasher.finish()
    }

    /// Removes a cell's contribution from the running counters. Returns true
    /// when the smallest neutral group may have gone with it and a rescan of
    /// the grid is needed.
    fn remove_from_counters(&mut self, cell: Cell) -> bool {
        match cell.race {
            Race::Ally => {
                self.ally_total -= u32::from(cell.count);
                self.ally_groups -= 1;
                false
            }
            Race::Enemy => {
                self.enemy_total -= u32::from(cell.count);
                self.enemy_groups -= 1;
                false
            }
            Race::Neutral => cell.count > 0 && cell.count == self.smallest_neutral_group,
        }
    }

    fn add_to_counters(&mut self, cell: Cell) {
        match cell.race {
            Race::Ally => {
                self.ally_total += u32::from(cell.count);
                self.ally_groups += 1;
            }
            Race::Enemy => {
                self.enemy_total += u32::from(cell.count);
                self.enemy_groups += 1;
            }
            Race::Neutral => {
                if cell.count > 0
                    && (self.smallest_neutral_group == 0 || cell.count < self.smallest_neutral_group)
                {
                    self.smallest_neutral_group = cell.count;
                }
            }
        }
    }

    fn rescan_smallest_neutral(&mut self) {
        self.smallest_neutral_group = self
            .grid
            .values()
            .filter(|c| c.race == Race::Neutral && c.count > 0)
            .map(|c| c.count)
            .min()
            .unwrap_or(0);
    }
}
