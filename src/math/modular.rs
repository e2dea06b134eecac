use num_bigint::{BigInt, BigUint};

/// Arithmetic in the ring Z_m for a composite modulus m.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZnBigUint {
    m: BigUint,
}

impl ZnBigUint {
    pub fn new(m: BigUint) -> Self {
        Self { m }
    }

    pub fn modulus(&self) -> &BigUint {
        &self.m
    }

    pub fn mult(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.m
    }

    pub fn pow(&self, a: &BigUint, e: &BigUint) -> BigUint {
        a.modpow(e, &self.m)
    }

    pub fn neg(&self, a: &BigUint) -> BigUint {
        let a = a % &self.m;
        if a == BigUint::from(0u32) {
            return a;
        }
        &self.m - a
    }

    /// Inverse by extended euclid. `None` when `gcd(a, m) != 1`,
    /// which happens for composite moduli.
    pub fn inv_mult(&self, a: &BigUint) -> Option<BigUint> {
        let zero = BigInt::from(0);
        let m = BigInt::from(self.m.clone());
        let (mut old_r, mut r) = (BigInt::from(a % &self.m), m.clone());
        let (mut old_s, mut s) = (BigInt::from(1), zero.clone());
        while r != zero {
            let quotient = &old_r / &r;
            let next_r = &old_r - &quotient * &r;
            old_r = std::mem::replace(&mut r, next_r);
            let next_s = &old_s - &quotient * &s;
            old_s = std::mem::replace(&mut s, next_s);
        }
        if old_r != BigInt::from(1) {
            return None;
        }
        ((old_s % &m + &m) % &m).to_biguint()
    }
}
