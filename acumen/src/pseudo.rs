//! Deterministic pseudo-address generation.
//!
//! When a user has no custodial wallet record, the wallet stack still needs a
//! stable per-user deposit address to display. This module derives one from
//! an arbitrary identifier with no external state: the same input always
//! yields the same address, so nothing needs to be persisted.
//!
//! This is a display placeholder, not a key-derivation primitive - the hash
//! is non-cryptographic and collisions are only improbable, not impossible.
//!
//! The exact byte stream is part of the contract (addresses shown to a user
//! must never change across releases): djb2 with seed 5381 over the
//! identifier's UTF-8 bytes, then twenty xorshift (13, 17, 5) steps taking
//! the low byte of the 32-bit state each step.

use std::fmt::Write as _;

const DJB2_SEED: u32 = 5381;
const ADDRESS_BYTES: usize = 20;

/// Derives a stable pseudo-address from an arbitrary seed string.
///
/// Always returns a `0x`-prefixed, 40-hex-character, lowercase string.
#[must_use]
pub fn generate_address(seed: &str) -> String {
    let mut state = djb2(seed);
    let mut address = String::with_capacity(2 + ADDRESS_BYTES * 2);
    address.push_str("0x");
    for _ in 0..ADDRESS_BYTES {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let _ = write!(address, "{:02x}", state & 0xff);
    }
    address
}

/// Derives the fallback EVM-family address for a user identifier.
#[must_use]
pub fn evm_fallback_address(identifier: &str) -> String {
    generate_address(&format!("{identifier}:evm"))
}

/// Derives the fallback Solana-family address for a user identifier.
///
/// The `:sol` suffix keeps the two family addresses distinct for the same
/// identifier.
#[must_use]
pub fn sol_fallback_address(identifier: &str) -> String {
    generate_address(&format!("{identifier}:sol"))
}

fn djb2(input: &str) -> u32 {
    let mut hash = DJB2_SEED;
    for byte in input.bytes() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_add(hash)
            .wrapping_add(u32::from(byte));
    }
    hash
}
