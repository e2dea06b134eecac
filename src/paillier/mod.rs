//! Additively homomorphic Paillier encryption over `Z*_{n^2}`.

use log::info;
use num_bigint::BigUint;
use rand::Rng;

use crate::error::CryptoError;
use crate::hash::short_hex;
use crate::math::{
    modular::ZnBigUint,
    prime::{gen_prime, lcm},
};

mod ciphertext;
mod key;

pub use ciphertext::Ciphertext;
pub use key::{Keypair, PrivateKey, PublicKey};

/// Smallest modulus accepted by [`KeyManager::generate_keypair`].
pub const MIN_MODULUS_BITS: u64 = 1024;
pub const DEFAULT_MODULUS_BITS: u64 = 2048;

pub struct KeyManager;

impl KeyManager {
    /// Generates `n = p q` with `bits` bits, `λ = lcm(p-1, q-1)`, `μ = λ^(-1) mod n`.
    pub fn generate_keypair<R: Rng + ?Sized>(
        bits: u64,
        rng: &mut R,
    ) -> Result<Keypair, CryptoError> {
        if bits < MIN_MODULUS_BITS {
            return Err(CryptoError::KeyGeneration(format!(
                "a {bits}-bit modulus is below the {MIN_MODULUS_BITS}-bit minimum"
            )));
        }
        if bits % 2 != 0 {
            return Err(CryptoError::KeyGeneration(format!(
                "modulus size must be even, got {bits} bits"
            )));
        }

        let (p, q) = loop {
            let p = gen_prime(bits / 2, rng);
            let q = gen_prime(bits / 2, rng);
            if p != q {
                break (p, q);
            }
        };
        let n = &p * &q;
        debug_assert_eq!(n.bits(), bits);

        let one = BigUint::from(1u32);
        let lambda = lcm(&(&p - &one), &(&q - &one));
        let mu = ZnBigUint::new(n.clone())
            .inv_mult(&lambda)
            .ok_or_else(|| CryptoError::KeyGeneration("λ is not invertible mod n".into()))?;

        let public_key = PublicKey::new(n);
        info!(
            "generated {}-bit paillier keypair {}",
            bits,
            short_hex(public_key.fingerprint())
        );
        let private_key = PrivateKey::new(public_key.clone(), lambda, mu);
        Ok(Keypair {
            public_key,
            private_key,
        })
    }

    pub fn encrypt<R: Rng + ?Sized>(public_key: &PublicKey, m: i64, rng: &mut R) -> Ciphertext {
        public_key.encrypt(m, rng)
    }

    pub fn decrypt(private_key: &PrivateKey, c: &Ciphertext) -> Result<i64, CryptoError> {
        private_key.decrypt(c)
    }
}
