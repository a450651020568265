pub mod algorithm;
pub mod generation;
pub mod heuristic;
pub mod pool;
pub mod transposition;
