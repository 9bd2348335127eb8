//! Storage keys for the few runtime items the bridge reads.
//!
//! Plain values live at `twox128(pallet) ++ twox128(item)`. `System.Account`
//! is a `Blake2_128Concat` map, so the account is appended after its own
//! blake2-128 hash.

use std::hash::Hasher;

use blake2::digest::consts::U16;
use blake2::{Blake2b, Digest};
use twox_hash::XxHash64;
use xcb_core::SovereignAccount;

/// Storage item holding the best finalized header of the bridged chain.
pub const BEST_FINALIZED: &str = "BestFinalized";

/// Two xxHash64 rounds (seeds 0 and 1), little-endian.
pub fn twox_128(data: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (seed, chunk) in out.chunks_exact_mut(8).enumerate() {
        let mut hasher = XxHash64::with_seed(seed as u64);
        hasher.write(data);
        chunk.copy_from_slice(&hasher.finish().to_le_bytes());
    }
    out
}

pub fn blake2_128(data: &[u8]) -> [u8; 16] {
    let mut hasher = Blake2b::<U16>::new();
    hasher.update(data);
    let mut out = [0u8; 16];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Key of a plain storage value.
pub fn storage_value_key(pallet: &str, item: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(&twox_128(pallet.as_bytes()));
    key.extend_from_slice(&twox_128(item.as_bytes()));
    key
}

/// Key of `System.Account(account)`.
pub fn system_account_key(account: &SovereignAccount) -> Vec<u8> {
    let mut key = storage_value_key("System", "Account");
    key.extend_from_slice(&blake2_128(account.as_bytes()));
    key.extend_from_slice(account.as_bytes());
    key
}
