use num_bigint::{BigUint, RandBigInt};
use rand::Rng;

const MILLER_RABIN_ROUNDS: usize = 40;

/// primes below 200, used to discard most candidates before miller rabin
const SMALL_PRIMES: [u32; 46] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199,
];

pub(crate) fn gcd(n: &BigUint, m: &BigUint) -> BigUint {
    let zero = BigUint::from(0u32);
    let (mut n, mut m) = (n.clone(), m.clone());
    while m != zero {
        let r = &n % &m;
        n = m;
        m = r;
    }
    n
}

pub(crate) fn lcm(n: &BigUint, m: &BigUint) -> BigUint {
    n / gcd(n, m) * m
}

/// miller rabin prime test
pub fn is_probable_prime<R: Rng + ?Sized>(n: &BigUint, rng: &mut R) -> bool {
    let zero = BigUint::from(0u32);
    let one = BigUint::from(1u32);
    let two = BigUint::from(2u32);
    if *n < two {
        return false;
    }
    for p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if *n == p {
            return true;
        }
        if n % &p == zero {
            return false;
        }
    }

    // n-1 = 2^k * q, with q odd
    let n_minus_one = n - &one;
    let (k, q) = {
        let mut k = 0u32;
        let mut q = n_minus_one.clone();
        while &q % &two == zero {
            k += 1;
            q >>= 1u32;
        }
        (k, q)
    };

    for _ in 0..MILLER_RABIN_ROUNDS {
        // witness 2 <= a < n-1
        let a = rng.gen_biguint_range(&two, &n_minus_one);

        let mut x = a.modpow(&q, n);
        if x == one || x == n_minus_one {
            continue;
        }

        let mut unbroken = true;
        for _ in 1..k {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                unbroken = false;
                break;
            }
        }
        if unbroken {
            return false;
        }
    }

    true
}

/// Samples a random prime of exactly `bits` bits whose two leading bits are set,
/// so the product of two such primes has exactly `2 * bits` bits.
pub fn gen_prime<R: Rng + ?Sized>(bits: u64, rng: &mut R) -> BigUint {
    assert!(bits >= 16, "prime size too small: {bits} bits");
    let top = BigUint::from(3u32) << (bits - 2);
    loop {
        let candidate = rng.gen_biguint(bits) | &top | BigUint::from(1u32);
        if is_probable_prime(&candidate, rng) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_gcd_lcm() {
        let a = BigUint::from(182u32);
        let b = BigUint::from(28u32);
        assert_eq!(gcd(&a, &b), BigUint::from(14u32));
        assert_eq!(lcm(&a, &b), BigUint::from(364u32));
        assert_eq!(gcd(&a, &BigUint::from(1u32)), BigUint::from(1u32));
    }

    #[test]
    fn test_is_probable_prime() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let check = |n: u64, rng: &mut ChaCha20Rng| is_probable_prime(&BigUint::from(n), rng);

        assert!(!check(0, &mut rng));
        assert!(!check(1, &mut rng));
        assert!(check(2, &mut rng));
        assert!(check(3, &mut rng));
        assert!(!check(4, &mut rng));
        assert!(check(199, &mut rng));
        assert!(!check(201, &mut rng));
        assert!(check(211, &mut rng));
        // carmichael numbers
        assert!(!check(561, &mut rng));
        assert!(!check(41041, &mut rng));
        assert!(check(10001231, &mut rng));
        assert!(check(100001029, &mut rng));
        assert!(check(1_000_000_007, &mut rng));
        assert!(!check(1_000_000_007 * 998_244_353, &mut rng));
    }

    #[test]
    fn test_gen_prime() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for bits in [16, 64, 256] {
            let p = gen_prime(bits, &mut rng);
            assert_eq!(p.bits(), bits);
            assert_eq!(&p >> (bits - 2), BigUint::from(3u32));
            assert!(is_probable_prime(&p, &mut rng));
        }
    }
}
