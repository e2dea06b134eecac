use num_bigint::{BigUint, RandBigInt};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Ciphertext, MIN_MODULUS_BITS};
use crate::error::CryptoError;
use crate::hash::{sha3_256, short_hex, Fingerprint};
use crate::math::{modular::ZnBigUint, prime::gcd};

/// Paillier public key with `g = n + 1`.
///
/// Only `n` goes over the wire; it is checked and `n^2` and the fingerprint
/// are rebuilt on deserialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BigUint", into = "BigUint")]
pub struct PublicKey {
    n: BigUint,
    zn_square: ZnBigUint,
    fingerprint: Fingerprint,
}

impl PublicKey {
    pub(crate) fn new(n: BigUint) -> Self {
        let zn_square = ZnBigUint::new(&n * &n);
        let fingerprint = sha3_256(&n.to_bytes_be());
        Self {
            n,
            zn_square,
            fingerprint,
        }
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub(crate) fn n_square(&self) -> &BigUint {
        self.zn_square.modulus()
    }

    pub fn bits(&self) -> u64 {
        self.n.bits()
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// m mod n; negative plaintexts wrap to n - |m|
    fn encode(&self, m: i64) -> BigUint {
        let magnitude = BigUint::from(m.unsigned_abs()) % &self.n;
        if m < 0 {
            ZnBigUint::new(self.n.clone()).neg(&magnitude)
        } else {
            magnitude
        }
    }

    /// Inverse of `encode`: residues above n/2 are negative.
    pub(crate) fn decode(&self, m: &BigUint) -> Result<i64, CryptoError> {
        let out_of_range = || CryptoError::Decryption("plaintext does not fit in i64".into());
        let half = &self.n >> 1u32;
        if *m > half {
            let magnitude = u64::try_from(&(&self.n - m)).map_err(|_| out_of_range())?;
            0i64.checked_sub_unsigned(magnitude).ok_or_else(out_of_range)
        } else {
            let magnitude = u64::try_from(m).map_err(|_| out_of_range())?;
            i64::try_from(magnitude).map_err(|_| out_of_range())
        }
    }

    /// r^n mod n^2 for a fresh unit r
    fn random_mask<R: Rng + ?Sized>(&self, rng: &mut R) -> BigUint {
        let one = BigUint::from(1u32);
        loop {
            let r = rng.gen_biguint_range(&one, &self.n);
            if gcd(&r, &self.n) == one {
                return self.zn_square.pow(&r, &self.n);
            }
        }
    }

    /// c = (1 + m n) r^n mod n^2
    pub fn encrypt<R: Rng + ?Sized>(&self, m: i64, rng: &mut R) -> Ciphertext {
        let gm = BigUint::from(1u32) + self.encode(m) * &self.n;
        let c = self.zn_square.mult(&gm, &self.random_mask(rng));
        Ciphertext::new(c, self.fingerprint)
    }

    fn ensure_owned(&self, c: &Ciphertext) -> Result<(), CryptoError> {
        if c.key_fingerprint() == &self.fingerprint {
            Ok(())
        } else {
            Err(CryptoError::KeyMismatch)
        }
    }

    /// Enc(a) ⊕ Enc(b) = Enc(a + b)
    pub fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext, CryptoError> {
        self.ensure_owned(a)?;
        self.ensure_owned(b)?;
        let c = self.zn_square.mult(a.value(), b.value());
        Ok(Ciphertext::new(c, self.fingerprint))
    }

    /// Enc(a) ⊕ k = Enc(a + k), multiplying by g^k = 1 + k n
    pub fn add_plain(&self, a: &Ciphertext, k: i64) -> Result<Ciphertext, CryptoError> {
        self.ensure_owned(a)?;
        let gk = BigUint::from(1u32) + self.encode(k) * &self.n;
        let c = self.zn_square.mult(a.value(), &gk);
        Ok(Ciphertext::new(c, self.fingerprint))
    }

    /// Enc(a) ⊗ k = Enc(k a). The exponent is k mod n, so negative k needs no inverse.
    pub fn scale(&self, a: &Ciphertext, k: i64) -> Result<Ciphertext, CryptoError> {
        self.ensure_owned(a)?;
        let c = self.zn_square.pow(a.value(), &self.encode(k));
        Ok(Ciphertext::new(c, self.fingerprint))
    }

    /// Same plaintext, fresh randomness.
    pub fn rerandomize<R: Rng + ?Sized>(
        &self,
        a: &Ciphertext,
        rng: &mut R,
    ) -> Result<Ciphertext, CryptoError> {
        self.ensure_owned(a)?;
        let c = self.zn_square.mult(a.value(), &self.random_mask(rng));
        Ok(Ciphertext::new(c, self.fingerprint))
    }

    /// Homomorphic sum of every ciphertext yielded by `items`.
    /// The empty sum is the trivial encryption of zero.
    pub fn sum<'a, I>(&self, items: I) -> Result<Ciphertext, CryptoError>
    where
        I: IntoIterator<Item = &'a Ciphertext>,
    {
        let mut acc = BigUint::from(1u32);
        for c in items {
            self.ensure_owned(c)?;
            acc = self.zn_square.mult(&acc, c.value());
        }
        Ok(Ciphertext::new(acc, self.fingerprint))
    }
}

/// Accepts only an odd modulus of at least [`MIN_MODULUS_BITS`] bits.
impl TryFrom<BigUint> for PublicKey {
    type Error = CryptoError;

    fn try_from(n: BigUint) -> Result<Self, CryptoError> {
        if n.bits() < MIN_MODULUS_BITS {
            return Err(CryptoError::InvalidKey(format!(
                "a {}-bit modulus is below the {MIN_MODULUS_BITS}-bit minimum",
                n.bits()
            )));
        }
        if (&n % 2u32) == BigUint::from(0u32) {
            return Err(CryptoError::InvalidKey("modulus is even".into()));
        }
        Ok(Self::new(n))
    }
}

impl From<PublicKey> for BigUint {
    fn from(pk: PublicKey) -> Self {
        pk.n
    }
}

/// Paillier private key `(λ, μ)` together with its public half.
///
/// Not serializable: it must never leave the decryption authority.
pub struct PrivateKey {
    public: PublicKey,
    lambda: BigUint,
    mu: BigUint,
}

impl PrivateKey {
    pub(crate) fn new(public: PublicKey, lambda: BigUint, mu: BigUint) -> Self {
        Self { public, lambda, mu }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// m = L(c^λ mod n^2) μ mod n, with L(u) = (u - 1) / n
    pub fn decrypt(&self, c: &Ciphertext) -> Result<i64, CryptoError> {
        if c.key_fingerprint() != self.public.fingerprint() {
            return Err(CryptoError::Decryption(
                "ciphertext was not produced under the matching public key".into(),
            ));
        }

        let zero = BigUint::from(0u32);
        let one = BigUint::from(1u32);
        let n = self.public.n();
        let value = c.value();
        if value >= self.public.n_square() || gcd(value, n) != one {
            return Err(CryptoError::Decryption(
                "ciphertext is not a unit modulo n^2".into(),
            ));
        }

        let u = value.modpow(&self.lambda, self.public.n_square());
        let u_minus_one = u - &one;
        if &u_minus_one % n != zero {
            return Err(CryptoError::Decryption("ciphertext is malformed".into()));
        }
        let m = (u_minus_one / n * &self.mu) % n;
        self.public.decode(&m)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public", &short_hex(self.public.fingerprint()))
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct Keypair {
    pub public_key: PublicKey,
    pub private_key: PrivateKey,
}

impl Keypair {
    pub fn into_parts(self) -> (PublicKey, PrivateKey) {
        (self.public_key, self.private_key)
    }
}
