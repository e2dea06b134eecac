use thiserror::Error;

use crate::board::Coordinate;

/// Failures of the Paillier layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("invalid public key: {0}")]
    InvalidKey(String),

    #[error("ciphertexts were produced under different public keys")]
    KeyMismatch,
}

/// All errors a game session can surface.
///
/// Messages only ever name the kind of failure and the attacked coordinate,
/// never the contents of a board.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("coordinate ({row}, {col}) is outside the 10x10 grid")]
    InvalidCoordinate { row: usize, col: usize },

    #[error("cannot parse coordinate: {0}")]
    ParseCoordinate(String),

    #[error("{0} was already attacked")]
    AlreadyAttacked(Coordinate),

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("invalid fleet: {0}")]
    InvalidFleet(String),

    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    #[error("the session is over")]
    SessionOver,

    #[error("input closed before a coordinate was entered")]
    InputClosed,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GameError {
    /// Recoverable errors leave the session untouched; the same attacker retries.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GameError::InvalidCoordinate { .. }
                | GameError::ParseCoordinate(_)
                | GameError::AlreadyAttacked(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
