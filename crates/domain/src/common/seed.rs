//! Deterministic pseudo-random choices derived from SHA-256.
//!
//! Generated content that must be stable across regenerations (NPC stubs,
//! fallback names) picks from fixed tables using these helpers instead of a RNG.

use sha2::{Digest, Sha256};

/// First 32 bits of the SHA-256 of `seed`, as an integer.
pub fn stable_int(seed: &str) -> u32 {
    let digest = Sha256::digest(seed.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Deterministically pick one option for `seed`. Empty tables yield `""`.
pub fn pick<'a>(seed: &str, options: &[&'a str]) -> &'a str {
    if options.is_empty() {
        return "";
    }
    options[stable_int(seed) as usize % options.len()]
}
