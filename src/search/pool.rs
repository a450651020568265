//! Allocation reuse for the search.
//!
//! A deep search builds and throws away an enormous number of coups; both
//! the coup vectors and the containers holding them are recycled through a
//! per-search free list instead of going back to the allocator. The pool
//! belongs to a single search and is never shared across threads.

use crate::game::moves::Coup;

#[derive(Debug, Default)]
pub struct CoupPool {
    coups: Vec<Coup>,
    containers: Vec<Vec<Coup>>,
}

impl CoupPool {
    pub fn new() -> Self {
        CoupPool::default()
    }

    /// Hands out an empty coup, reusing a returned one when available.
    pub fn take_coup(&mut self) -> Coup {
        self.coups.pop().unwrap_or_default()
    }

    pub fn put_coup(&mut self, mut coup: Coup) {
        coup.clear();
        self.coups.push(coup);
    }

    pub fn take_container(&mut self) -> Vec<Coup> {
        self.containers.pop().unwrap_or_default()
    }

    /// Takes a container back along with every coup still inside it.
    pub fn put_container(&mut self, mut coups: Vec<Coup>) {
        for coup in coups.drain(..) {
            self.put_coup(coup);
        }
        self.containers.push(coups);
    }

    #[cfg(test)]
    fn idle_coups(&self) -> usize {
        self.coups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::coordinates::Coordinates;
    use crate::game::moves::Move;

    #[test]
    fn test_returned_coups_come_back_empty() {
        let mut pool = CoupPool::new();
        let mut coup = pool.take_coup();
        coup.push(Move {
            start: Coordinates::new(0, 0),
            n: 3,
            end: Coordinates::new(1, 1),
        });
        pool.put_coup(coup);

        let reused = pool.take_coup();
        assert!(reused.is_empty());
        assert!(reused.capacity() > 0);
    }

    #[test]
    fn test_container_return_recovers_all_coups() {
        let mut pool = CoupPool::new();
        let mut container = pool.take_container();
        for _ in 0..4 {
            container.push(pool.take_coup());
        }
        pool.put_container(container);
        assert_eq!(pool.idle_coups(), 4);

        let reused = pool.take_container();
        assert!(reused.is_empty());
    }
}
