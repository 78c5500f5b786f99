//! Keccak-256 helpers shared by hashing and address derivation.

use crate::entities::{Address, Hash};
use sha3::{Digest, Keccak256};

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    Hash::from_slice(&hasher.finalize())
}

/// Address of a contract created by `sender` with `nonce`:
/// the last 20 bytes of `keccak256(rlp([sender, nonce]))`.
pub fn create_address(sender: &Address, nonce: u64) -> Address {
    let mut s = rlp::RlpStream::new_list(2);
    s.append(sender);
    s.append(&nonce);
    let hash = keccak256(&s.out());
    Address::from_slice(&hash.as_bytes()[12..])
}
