use digest::Digest;
use sha3::Sha3_256;

pub const FINGERPRINT_LEN: usize = 32;

pub type Fingerprint = [u8; FINGERPRINT_LEN];

/// sha3-256 wrapper
pub fn sha3_256(data: &[u8]) -> Fingerprint {
    let mut hasher = Sha3_256::new();

    // write input message
    hasher.update(data);

    // read hash digest
    let mut digest = [0u8; FINGERPRINT_LEN];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// Leading bytes of a fingerprint as lowercase hex, for log lines.
pub fn short_hex(fingerprint: &Fingerprint) -> String {
    hex::encode(&fingerprint[..8])
}
