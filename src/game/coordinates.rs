use serde::{Deserialize, Serialize};

/// A cell position on the grid. `x` runs along the width, `y` along the
/// height, both starting at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: u8,
    pub y: u8,
}

impl Coordinates {
    pub fn new(x: u8, y: u8) -> Self {
        Coordinates { x, y }
    }

    /// Chebyshev distance: the number of king moves separating two cells.
    pub fn distance(&self, other: Coordinates) -> f64 {
        f64::from(self.x.abs_diff(other.x).max(self.y.abs_diff(other.y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_king_moves() {
        let origin = Coordinates::new(2, 2);
        assert_eq!(origin.distance(Coordinates::new(2, 2)), 0.0);
        assert_eq!(origin.distance(Coordinates::new(3, 3)), 1.0);
        assert_eq!(origin.distance(Coordinates::new(0, 1)), 2.0);
        assert_eq!(origin.distance(Coordinates::new(7, 3)), 5.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinates::new(1, 7);
        let b = Coordinates::new(4, 0);
        assert_eq!(a.distance(b), b.distance(a));
    }
}
