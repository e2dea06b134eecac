use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::hash::{short_hex, Fingerprint};

/// An encrypted integer `c ∈ Z*_{n^2}`, tagged with the fingerprint of the
/// public key it was produced under.
///
/// The value is opaque: the only ways to combine ciphertexts are the
/// homomorphic operations on [`PublicKey`](super::PublicKey).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    value: BigUint,
    key: Fingerprint,
}

impl Ciphertext {
    pub(crate) fn new(value: BigUint, key: Fingerprint) -> Self {
        Self { value, key }
    }

    pub(crate) fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn key_fingerprint(&self) -> &Fingerprint {
        &self.key
    }
}

impl std::fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ciphertext({} bits, key {})",
            self.value.bits(),
            short_hex(&self.key)
        )
    }
}
