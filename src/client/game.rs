//! Board bookkeeping between the wire protocol and the engine.
//!
//! The server never names sides: every diff speaks of humans, vampires and
//! werewolves. Which monster faction is ours is inferred once, from the
//! population found at our home cell in the initial map, and every later
//! update is normalised through that mapping before it reaches the state.

use std::collections::HashSet;

use crate::game::coordinates::Coordinates;
use crate::game::race::Race;
use crate::game::state::State;
use crate::{NocturneError, Result};

/// One cell diff as it arrives from the server. At most one of the three
/// populations may be non-zero; all three at zero erases the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChange {
    pub pos: Coordinates,
    pub humans: u8,
    pub vampires: u8,
    pub werewolves: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Faction {
    Vampires,
    Werewolves,
}

/// One game session as seen by the protocol client: the normalised board
/// plus the side-inference bookkeeping.
#[derive(Debug, Default)]
pub struct Game {
    state: Option<State>,
    home: Option<Coordinates>,
    ally_faction: Option<Faction>,
}

impl Game {
    pub fn new() -> Self {
        Game::default()
    }

    /// The current board. Panics when called before `set`; the server always
    /// opens with the grid dimensions.
    pub fn state(&self) -> &State {
        self.state.as_ref().expect("board requested before the server sent its dimensions")
    }

    /// Starts a fresh board of the given dimensions.
    pub fn set(&mut self, height: u8, width: u8) {
        self.state = Some(State::new(height, width));
    }

    /// Marks the cells that will hold human groups: zero-count neutral
    /// markers, populated later by the map.
    pub fn set_human_positions(&mut self, positions: &[Coordinates]) -> Result<()> {
        let state = self.state_mut()?;
        for pos in positions {
            state.set_cell(*pos, Race::Neutral, 0);
        }
        Ok(())
    }

    /// Remembers where we start; the side mapping is derived from it when
    /// the map arrives.
    pub fn set_home(&mut self, pos: Coordinates) {
        self.home = Some(pos);
    }

    /// Applies the initial placements. This is where sides are pinned down:
    /// whichever faction populates the home cell is ours.
    pub fn apply_map(&mut self, changes: &[RawChange]) -> Result<()> {
        validate(changes)?;

        let home = self
            .home
            .ok_or_else(|| NocturneError::Protocol("map received before the home cell".into()))?;
        let at_home = changes
            .iter()
            .find(|c| c.pos == home)
            .ok_or_else(|| NocturneError::Protocol("initial map says nothing about our home cell".into()))?;
        self.ally_faction = if at_home.vampires > 0 {
            Some(Faction::Vampires)
        } else if at_home.werewolves > 0 {
            Some(Faction::Werewolves)
        } else {
            return Err(NocturneError::Protocol("no monsters on our home cell".into()));
        };

        self.apply(changes)
    }

    /// Applies a per-turn diff. An empty diff is a no-op.
    pub fn apply_update(&mut self, changes: &[RawChange]) -> Result<()> {
        validate(changes)?;
        self.apply(changes)
    }

    /// Forgets everything about the current game; the connection survives
    /// for a rematch.
    pub fn reset(&mut self) {
        self.state = None;
        self.home = None;
        self.ally_faction = None;
    }

    fn apply(&mut self, changes: &[RawChange]) -> Result<()> {
        let ally_faction = self
            .ally_faction
            .ok_or_else(|| NocturneError::Protocol("update received before the initial map".into()))?;
        let state = self.state_mut()?;

        for change in changes {
            let (vampire_race, werewolf_race) = match ally_faction {
                Faction::Vampires => (Race::Ally, Race::Enemy),
                Faction::Werewolves => (Race::Enemy, Race::Ally),
            };
            if change.humans > 0 {
                state.set_cell(change.pos, Race::Neutral, change.humans);
            } else if change.vampires > 0 {
                state.set_cell(change.pos, vampire_race, change.vampires);
            } else if change.werewolves > 0 {
                state.set_cell(change.pos, werewolf_race, change.werewolves);
            } else {
                state.empty_cell(change.pos);
            }
        }
        Ok(())
    }

    fn state_mut(&mut self) -> Result<&mut State> {
        self.state
            .as_mut()
            .ok_or_else(|| NocturneError::Protocol("board update before the grid dimensions".into()))
    }
}

/// Rejects malformed diffs before they can corrupt the state: a cell holds
/// at most one population, and no cell appears twice in one diff.
fn validate(changes: &[RawChange]) -> Result<()> {
    let mut seen = HashSet::new();
    for change in changes {
        let populated = u8::from(change.humans > 0) + u8::from(change.vampires > 0) + u8::from(change.werewolves > 0);
        if populated > 1 {
            return Err(NocturneError::Protocol(format!(
                "impossible change at ({}, {}): at most one race per cell",
                change.pos.x, change.pos.y
            )));
        }
        if !seen.insert(change.pos) {
            return Err(NocturneError::Protocol(format!(
                "duplicate position ({}, {}) in one update",
                change.pos.x, change.pos.y
            )));
        }
    }
    Ok(())
}
