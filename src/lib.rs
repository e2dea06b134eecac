//! Battleship where each board lives encrypted under Paillier.
//!
//! Attacks homomorphically sink the targeted cell and only the board total is
//! ever decrypted, so neither side learns anything about the other's layout
//! beyond hit or miss.

pub mod board;
pub mod config;
pub mod error;
pub mod fleet;
pub mod game;
pub mod hash;
pub mod math;
pub mod paillier;

pub use error::{CryptoError, GameError, Result};
