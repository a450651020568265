//! Player implementations.
//!
//! Everything that can pick a coup for a turn sits behind the [`Player`]
//! trait: the random baseline used as a sparring partner and the alpha-beta
//! engine. The protocol client and the arena drive both through the same
//! seam.

pub mod random;
pub mod search;

pub use random::RandomPlayer;
pub use search::SearchPlayer;

use crate::game::moves::Coup;
use crate::game::state::State;

/// A turn-taking decision maker. The state is always presented from the
/// player's own point of view: the player is the ally.
pub trait Player: Send {
    fn name(&self) -> &str;

    /// Picks this turn's coup. An empty coup means the player has nothing
    /// left to play with and concedes.
    fn choose_coup(&mut self, state: &State) -> Coup;
}
