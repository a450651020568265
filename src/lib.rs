//! # Nocturne
//!
//! An AI player for a two-player, turn-based territory game on a
//! rectangular grid: two monster factions grow by absorbing neutral human
//! groups and fighting each other, battles resolving probabilistically on
//! the server.
//!
//! ## Features
//!
//! - **Game core**: compact board state, probabilistic coup simulation
//! - **Engine**: anytime iterative-deepening alpha-beta with a
//!   transposition table and pooled allocations
//! - **Protocol client**: TCP client for the server's binary protocol
//! - **Arena**: local AI-vs-AI matches on random maps
//!
//! ## Usage
//!
//! ```rust
//! use nocturne::{
//!     game::state::State,
//!     players::SearchPlayer,
//!     search::heuristic::HeuristicParameters,
//! };
//! ```

// ============================================================================
// PUBLIC API MODULES
// ============================================================================

/// Board state, battle odds and coup simulation
pub mod game;

/// Alpha-beta engine: generation, evaluation, search
pub mod search;

/// The decision-maker seam and its implementations
pub mod players;

/// TCP protocol client
pub mod client;

/// Local AI-vs-AI match driver
pub mod arena;

/// Logger setup shared by the binaries
pub mod logging;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Main error type for the nocturne library
#[derive(Debug, thiserror::Error)]
pub enum NocturneError {
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("game error: {0}")]
    Game(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, NocturneError>;

// ============================================================================
// LIBRARY VERSION INFO
// ============================================================================

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
