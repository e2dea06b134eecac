use rand::Rng;

use super::Seat;
use crate::board::Aggregate;
use crate::error::CryptoError;
use crate::paillier::{KeyManager, PrivateKey, PublicKey};

/// Holder of both boards' private keys, distinct from either player.
///
/// It opens board totals and nothing else: there is no way to hand it a
/// single cell. In a networked split this is the piece that moves behind a
/// channel.
pub struct DecryptionAuthority {
    keys: [PrivateKey; 2],
}

impl DecryptionAuthority {
    /// One fresh keypair per seat.
    pub fn generate<R: Rng + ?Sized>(bits: u64, rng: &mut R) -> Result<Self, CryptoError> {
        let (_, first) = KeyManager::generate_keypair(bits, rng)?.into_parts();
        let (_, second) = KeyManager::generate_keypair(bits, rng)?.into_parts();
        Ok(Self {
            keys: [first, second],
        })
    }

    /// Key the board of `seat` is encrypted under.
    pub fn public_key(&self, seat: Seat) -> &PublicKey {
        self.keys[seat.index()].public_key()
    }

    pub fn open_aggregate(&self, seat: Seat, aggregate: &Aggregate) -> Result<i64, CryptoError> {
        KeyManager::decrypt(&self.keys[seat.index()], aggregate.ciphertext())
    }
}
