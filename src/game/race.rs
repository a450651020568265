use serde::{Deserialize, Serialize};

/// The three populations on the grid: unowned neutral groups and the two
/// monster factions, labelled from our own point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Race {
    Neutral = 0,
    Ally = 1,
    Enemy = 2,
}

impl Race {
    /// The opposing faction. Asking for the opponent of the neutral race is a
    /// programming error and aborts: it means a neutral cell slipped into a
    /// place where only actors belong.
    pub fn opponent(self) -> Race {
        match self {
            Race::Ally => Race::Enemy,
            Race::Enemy => Race::Ally,
            Race::Neutral => panic!("opponent asked for the neutral race, this should not happen"),
        }
    }
}
