//! # Transaction Signers
//!
//! Height-dependent signature schemes for sender recovery (secp256k1).
//!
//! | Scheme | Tx types | Replay protection | Low-s (EIP-2) |
//! |--------|----------|-------------------|---------------|
//! | Frontier | legacy | none, v ∈ {27, 28} | no |
//! | Homestead | legacy | none | yes |
//! | Eip155 | legacy | optional, v = 35 + 2·id + parity | yes |
//! | Berlin | legacy, 2930 | as Eip155 | yes |
//! | London | legacy, 2930, 1559 | as Eip155 | yes |

use super::errors::SignatureError;
use crate::ports::outbound::{SignatureScheme, SignerResolver};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use shared_types::{keccak256, Address, BlockNumber, ChainConfig, Hash, Transaction, TxType, U256};

/// Half of the secp256k1 curve order.
/// n/2 where n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// A signature scheme selected by fork schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signer {
    Frontier,
    Homestead,
    Eip155 { chain_id: u64 },
    Berlin { chain_id: u64 },
    London { chain_id: u64 },
}

impl Signer {
    /// The scheme active at `number` under `config`.
    pub fn for_block(config: &ChainConfig, number: BlockNumber) -> Self {
        let chain_id = config.chain_id;
        if config.is_london(number) {
            Signer::London { chain_id }
        } else if config.is_berlin(number) {
            Signer::Berlin { chain_id }
        } else if config.is_eip155(number) {
            Signer::Eip155 { chain_id }
        } else if config.is_homestead(number) {
            Signer::Homestead
        } else {
            Signer::Frontier
        }
    }

    /// Chain id enforced by this scheme, if replay protection is active.
    pub fn chain_id(&self) -> Option<u64> {
        match self {
            Signer::Frontier | Signer::Homestead => None,
            Signer::Eip155 { chain_id }
            | Signer::Berlin { chain_id }
            | Signer::London { chain_id } => Some(*chain_id),
        }
    }

    pub fn accepts(&self, tx_type: TxType) -> bool {
        match tx_type {
            TxType::Legacy => true,
            TxType::AccessList => matches!(self, Signer::Berlin { .. } | Signer::London { .. }),
            TxType::DynamicFee => matches!(self, Signer::London { .. }),
        }
    }

    fn enforces_low_s(&self) -> bool {
        !matches!(self, Signer::Frontier)
    }

    /// Signing hash and y-parity for `tx` under this scheme.
    fn signing_input(&self, tx: &Transaction) -> Result<(Hash, u8), SignatureError> {
        match tx.tx_type {
            TxType::Legacy => match tx.v {
                27 | 28 => Ok((tx.signing_hash(None), (tx.v - 27) as u8)),
                v if v >= 35 => {
                    let expected = self.chain_id().ok_or(SignatureError::InvalidRecoveryId(v))?;
                    let actual = (v - 35) / 2;
                    if actual != expected {
                        return Err(SignatureError::ChainIdMismatch { expected, actual });
                    }
                    Ok((tx.signing_hash(Some(actual)), ((v - 35) % 2) as u8))
                }
                v => Err(SignatureError::InvalidRecoveryId(v)),
            },
            TxType::AccessList | TxType::DynamicFee => {
                // accepts() already guarantees a protected scheme here
                let expected = self.chain_id().unwrap_or_default();
                if tx.chain_id != expected {
                    return Err(SignatureError::ChainIdMismatch {
                        expected,
                        actual: tx.chain_id,
                    });
                }
                if tx.v > 1 {
                    return Err(SignatureError::InvalidRecoveryId(tx.v));
                }
                Ok((tx.signing_hash(None), tx.v as u8))
            }
        }
    }
}

impl SignatureScheme for Signer {
    fn name(&self) -> &'static str {
        match self {
            Signer::Frontier => "frontier",
            Signer::Homestead => "homestead",
            Signer::Eip155 { .. } => "eip155",
            Signer::Berlin { .. } => "berlin",
            Signer::London { .. } => "london",
        }
    }

    fn recover_sender(&self, tx: &Transaction) -> Result<Address, SignatureError> {
        if !self.accepts(tx.tx_type) {
            return Err(SignatureError::UnsupportedTxType {
                tx_type: tx.tx_type,
                scheme: self.name(),
            });
        }
        let (hash, parity) = self.signing_input(tx)?;
        recover_address(&hash, tx.r, tx.s, parity, self.enforces_low_s())
    }
}

impl SignerResolver for ChainConfig {
    type Scheme = Signer;

    fn signer_for(&self, number: BlockNumber) -> Signer {
        Signer::for_block(self, number)
    }

    fn network_id(&self) -> u64 {
        ChainConfig::network_id(self)
    }
}

/// Recover the signer's address from `(r, s, parity)` over a prehashed message.
///
/// High-s signatures are rejected when `low_s` is set; otherwise they are
/// normalized and the parity flipped before recovery.
pub fn recover_address(
    message_hash: &Hash,
    r: U256,
    s: U256,
    parity: u8,
    low_s: bool,
) -> Result<Address, SignatureError> {
    if r.is_zero() || s.is_zero() {
        return Err(SignatureError::InvalidFormat);
    }
    if low_s && s > U256::from_big_endian(&SECP256K1_HALF_ORDER) {
        return Err(SignatureError::MalleableSignature);
    }

    let mut sig_bytes = [0u8; 64];
    r.to_big_endian(&mut sig_bytes[..32]);
    s.to_big_endian(&mut sig_bytes[32..]);
    let sig = Signature::from_slice(&sig_bytes).map_err(|_| SignatureError::InvalidFormat)?;

    // k256 only recovers from low-s signatures
    let (sig, y_odd) = match sig.normalize_s() {
        Some(normalized) => (normalized, parity == 0),
        None => (sig, parity == 1),
    };

    let recovered_key =
        VerifyingKey::recover_from_prehash(message_hash.as_bytes(), &sig, RecoveryId::new(y_odd, false))
            .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered_key))
}

/// Derive an address from a public key: last 20 bytes of keccak(x ‖ y).
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);
    let hash = keccak256(&pubkey_bytes.as_bytes()[1..]);
    Address::from_slice(&hash.as_bytes()[12..])
}
