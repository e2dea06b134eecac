use std::path::Path;

use rand::{rngs::OsRng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, GameError, Result};
use crate::fleet::{validate_fleet, STANDARD_FLEET};
use crate::paillier::{DEFAULT_MODULUS_BITS, MIN_MODULUS_BITS};

/// Everything a session needs to set itself up. The RNG built from it is owned
/// by that one session; there is no process-wide key or randomness state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Paillier modulus size for each board's keypair
    pub key_bits: u64,
    /// Fixes every random choice of the session when set
    pub seed: Option<u64>,
    /// Ship lengths placed on each board
    pub fleet: Vec<usize>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            key_bits: DEFAULT_MODULUS_BITS,
            seed: None,
            fleet: STANDARD_FLEET.to_vec(),
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| GameError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.key_bits < MIN_MODULUS_BITS {
            return Err(GameError::Config(format!(
                "key_bits = {} is below the {MIN_MODULUS_BITS}-bit minimum",
                self.key_bits
            )));
        }
        validate_fleet(&self.fleet)
    }

    /// Seeded when `seed` is set, otherwise drawn from the operating system.
    pub fn rng(&self) -> std::result::Result<ChaCha20Rng, CryptoError> {
        match self.seed {
            Some(seed) => Ok(ChaCha20Rng::seed_from_u64(seed)),
            None => ChaCha20Rng::from_rng(OsRng)
                .map_err(|e| CryptoError::KeyGeneration(format!("entropy unavailable: {e}"))),
        }
    }
}
