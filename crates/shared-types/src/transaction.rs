//! # Transactions
//!
//! Signed transactions in their three envelope forms:
//!
//! | Type | Envelope | Payload |
//! |------|----------|---------|
//! | Legacy | bare RLP list | `[nonce, gasPrice, gas, to, value, data, v, r, s]` |
//! | EIP-2930 | `0x01 ‖ rlp(..)` | `[chainId, nonce, gasPrice, gas, to, value, data, accessList, yParity, r, s]` |
//! | EIP-1559 | `0x02 ‖ rlp(..)` | `[chainId, nonce, tip, maxFee, gas, to, value, data, accessList, yParity, r, s]` |
//!
//! Inside a block body typed transactions are carried as an RLP byte string
//! wrapping their envelope, legacy transactions as a nested list.

use crate::entities::{Address, Hash, U256};
use crate::hashing::keccak256;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};

/// Transaction envelope type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TxType {
    #[default]
    Legacy,
    /// EIP-2930
    AccessList,
    /// EIP-1559
    DynamicFee,
}

impl TxType {
    /// The EIP-2718 type byte (0 for legacy).
    pub fn as_u8(self) -> u8 {
        match self {
            TxType::Legacy => 0x00,
            TxType::AccessList => 0x01,
            TxType::DynamicFee => 0x02,
        }
    }

    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(TxType::Legacy),
            0x01 => Some(TxType::AccessList),
            0x02 => Some(TxType::DynamicFee),
            _ => None,
        }
    }
}

/// One entry of an EIP-2930 access list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessListItem {
    pub address: Address,
    pub storage_keys: Vec<Hash>,
}

impl Encodable for AccessListItem {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.address);
        s.append_list::<Hash, _>(&self.storage_keys);
    }
}

impl Decodable for AccessListItem {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 2 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            address: rlp.val_at(0)?,
            storage_keys: rlp.list_at(1)?,
        })
    }
}

/// A signed transaction.
///
/// For [`TxType::DynamicFee`] `gas_price` holds `maxFeePerGas` and
/// `max_priority_fee_per_gas` holds the tip cap. For typed transactions `v`
/// is the y-parity (0 or 1); for legacy transactions it is the raw `v`
/// (27/28, or EIP-155 `35 + 2 * chain_id + parity`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    pub tx_type: TxType,
    /// Chain id of typed transactions. Legacy transactions derive it from `v`.
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: U256,
    pub max_priority_fee_per_gas: U256,
    pub gas_limit: u64,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub access_list: Vec<AccessListItem>,
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

impl Transaction {
    /// Keccak-256 of the canonical envelope.
    pub fn hash(&self) -> Hash {
        keccak256(&self.envelope())
    }

    /// Whether this transaction creates a contract.
    pub fn is_create(&self) -> bool {
        self.to.is_none()
    }

    /// The chain id this transaction is bound to, if any.
    ///
    /// Unprotected legacy transactions (v = 27/28) are not bound to a chain.
    pub fn chain_id(&self) -> Option<u64> {
        match self.tx_type {
            TxType::Legacy if self.v >= 35 => Some((self.v - 35) / 2),
            TxType::Legacy => None,
            TxType::AccessList | TxType::DynamicFee => Some(self.chain_id),
        }
    }

    /// Whether a legacy transaction carries EIP-155 replay protection.
    pub fn is_protected(&self) -> bool {
        match self.tx_type {
            TxType::Legacy => self.v != 27 && self.v != 28,
            TxType::AccessList | TxType::DynamicFee => true,
        }
    }

    /// Canonical EIP-2718 encoding (bare RLP list for legacy).
    pub fn envelope(&self) -> Vec<u8> {
        match self.tx_type {
            TxType::Legacy => {
                let mut s = RlpStream::new();
                self.append_legacy(&mut s);
                s.out().to_vec()
            }
            TxType::AccessList | TxType::DynamicFee => {
                let mut s = RlpStream::new();
                self.append_typed_payload(&mut s, true);
                let mut out = vec![self.tx_type.as_u8()];
                out.extend_from_slice(&s.out());
                out
            }
        }
    }

    fn append_legacy(&self, s: &mut RlpStream) {
        s.begin_list(9);
        s.append(&self.nonce);
        s.append(&self.gas_price);
        s.append(&self.gas_limit);
        append_to(s, &self.to);
        s.append(&self.value);
        s.append(&self.data);
        s.append(&self.v);
        s.append(&self.r);
        s.append(&self.s);
    }

    /// Decode a transaction from its canonical envelope.
    pub fn from_envelope(bytes: &[u8]) -> Result<Self, DecoderError> {
        let first = *bytes.first().ok_or(DecoderError::RlpIsTooShort)?;
        if first >= 0xc0 {
            return Self::decode_legacy(&Rlp::new(bytes));
        }

        let tx_type = match TxType::from_u8(first) {
            Some(TxType::Legacy) | None => {
                return Err(DecoderError::Custom("unknown transaction type"))
            }
            Some(tx_type) => tx_type,
        };
        Self::decode_typed(tx_type, &Rlp::new(&bytes[1..]))
    }

    /// The hash that was signed to produce (`v`, `r`, `s`).
    ///
    /// `chain_id` selects the EIP-155 form for legacy transactions and is
    /// ignored for typed transactions, which always commit to their own id.
    pub fn signing_hash(&self, chain_id: Option<u64>) -> Hash {
        match self.tx_type {
            TxType::Legacy => {
                let mut s = RlpStream::new_list(if chain_id.is_some() { 9 } else { 6 });
                s.append(&self.nonce);
                s.append(&self.gas_price);
                s.append(&self.gas_limit);
                append_to(&mut s, &self.to);
                s.append(&self.value);
                s.append(&self.data);
                if let Some(chain_id) = chain_id {
                    s.append(&chain_id);
                    s.append(&0u8);
                    s.append(&0u8);
                }
                keccak256(&s.out())
            }
            TxType::AccessList | TxType::DynamicFee => {
                let mut s = RlpStream::new();
                self.append_typed_payload(&mut s, false);
                let mut preimage = vec![self.tx_type.as_u8()];
                preimage.extend_from_slice(&s.out());
                keccak256(&preimage)
            }
        }
    }

    fn append_typed_payload(&self, s: &mut RlpStream, with_signature: bool) {
        let base = match self.tx_type {
            TxType::DynamicFee => 9,
            _ => 8,
        };
        s.begin_list(if with_signature { base + 3 } else { base });
        s.append(&self.chain_id);
        s.append(&self.nonce);
        if self.tx_type == TxType::DynamicFee {
            s.append(&self.max_priority_fee_per_gas);
        }
        s.append(&self.gas_price);
        s.append(&self.gas_limit);
        append_to(s, &self.to);
        s.append(&self.value);
        s.append(&self.data);
        s.append_list::<AccessListItem, _>(&self.access_list);
        if with_signature {
            s.append(&self.v);
            s.append(&self.r);
            s.append(&self.s);
        }
    }

    fn decode_legacy(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 9 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            tx_type: TxType::Legacy,
            chain_id: 0,
            nonce: rlp.val_at(0)?,
            gas_price: rlp.val_at(1)?,
            max_priority_fee_per_gas: U256::zero(),
            gas_limit: rlp.val_at(2)?,
            to: decode_to(rlp, 3)?,
            value: rlp.val_at(4)?,
            data: rlp.val_at(5)?,
            access_list: Vec::new(),
            v: rlp.val_at(6)?,
            r: rlp.val_at(7)?,
            s: rlp.val_at(8)?,
        })
    }

    fn decode_typed(tx_type: TxType, rlp: &Rlp) -> Result<Self, DecoderError> {
        let (expected, offset) = match tx_type {
            TxType::DynamicFee => (12, 1),
            _ => (11, 0),
        };
        if rlp.item_count()? != expected {
            return Err(DecoderError::RlpIncorrectListLen);
        }

        let max_priority_fee_per_gas = if tx_type == TxType::DynamicFee {
            rlp.val_at(2)?
        } else {
            U256::zero()
        };

        Ok(Self {
            tx_type,
            chain_id: rlp.val_at(0)?,
            nonce: rlp.val_at(1)?,
            max_priority_fee_per_gas,
            gas_price: rlp.val_at(2 + offset)?,
            gas_limit: rlp.val_at(3 + offset)?,
            to: decode_to(rlp, 4 + offset)?,
            value: rlp.val_at(5 + offset)?,
            data: rlp.val_at(6 + offset)?,
            access_list: rlp.list_at(7 + offset)?,
            v: rlp.val_at(8 + offset)?,
            r: rlp.val_at(9 + offset)?,
            s: rlp.val_at(10 + offset)?,
        })
    }
}

impl Encodable for Transaction {
    fn rlp_append(&self, s: &mut RlpStream) {
        match self.tx_type {
            // Typed envelopes sit in block bodies as opaque byte strings.
            TxType::Legacy => self.append_legacy(s),
            TxType::AccessList | TxType::DynamicFee => {
                s.encoder().encode_value(&self.envelope())
            }
        }
    }
}

impl Decodable for Transaction {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.is_list() {
            Self::decode_legacy(rlp)
        } else {
            let envelope: Vec<u8> = rlp.as_val()?;
            Self::from_envelope(&envelope)
        }
    }
}

/// Append a recipient, encoding contract creation as empty data.
pub(crate) fn append_to(s: &mut RlpStream, to: &Option<Address>) {
    match to {
        Some(address) => s.append(address),
        None => s.append_empty_data(),
    };
}

/// Decode a recipient where empty data means contract creation.
pub(crate) fn decode_to(rlp: &Rlp, index: usize) -> Result<Option<Address>, DecoderError> {
    let item = rlp.at(index)?;
    if item.is_empty() {
        Ok(None)
    } else {
        Ok(Some(item.as_val()?))
    }
}
