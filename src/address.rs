//! Cash address codec: version byte packing and payload validation
//!
//! The version byte self-describes the payload: bits 3-6 carry the address
//! type (0 pubkey hash, 8 script hash), bit 2 a size tier, bits 0-1 a size
//! index. Legal payload sizes are 20/24/28/32 bytes (tier clear, 4-byte
//! steps) and 40/48/56/64 bytes (tier set, 8-byte steps); anything else is
//! rejected, never truncated or padded.

use std::fmt;

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::cashaddr;
use crate::error::AddressError;
use crate::network::Network;
use crate::types::{AddressType, ScriptType};

const TYPE_BITS_MASK: u8 = 0b0111_1000;
const SIZE_TIER_BIT: u8 = 0b0000_0100;
const SIZE_INDEX_MASK: u8 = 0b0000_0011;

/// A validated cash address.
///
/// Constructed only by [`CashAddressCodec`]; immutable afterwards. Equality
/// compares kind, payload and version byte; the display string is derived
/// state.
#[derive(Debug, Clone, Eq)]
pub struct CashAddress {
    kind: AddressType,
    payload: Vec<u8>,
    version: u8,
    string: String,
}

impl CashAddress {
    pub fn kind(&self) -> AddressType {
        self.kind
    }

    /// The hashed public key or script the address commits to.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// The full human-facing string, always carrying the network prefix.
    pub fn as_str(&self) -> &str {
        &self.string
    }

    /// Locking script for the address payload.
    pub fn locking_script(&self) -> Vec<u8> {
        let mut script = Vec::with_capacity(self.payload.len() + 5);
        match self.kind {
            AddressType::PubKeyHash => {
                script.extend_from_slice(&[0x76, 0xa9, self.payload.len() as u8]);
                script.extend_from_slice(&self.payload);
                script.extend_from_slice(&[0x88, 0xac]);
            }
            AddressType::ScriptHash => {
                script.extend_from_slice(&[0xa9, self.payload.len() as u8]);
                script.extend_from_slice(&self.payload);
                script.push(0x87);
            }
        }
        script
    }
}

impl PartialEq for CashAddress {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.payload == other.payload && self.version == other.version
    }
}

impl fmt::Display for CashAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string)
    }
}

/// Bidirectional converter between locking-script payloads and cash address
/// strings for one network prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashAddressCodec {
    prefix: String,
}

impl CashAddressCodec {
    pub fn new(network: Network) -> Self {
        Self::with_prefix(network.address_prefix())
    }

    /// Codec over an explicit prefix, e.g. for a regtest network.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parse an address string, synthesizing the configured prefix when the
    /// separator is absent. The prefix is always validated afterwards, so a
    /// wrong implicit prefix cannot make a foreign address verify.
    pub fn decode(&self, address: &str) -> Result<CashAddress, AddressError> {
        let has_lower = address.chars().any(|c| c.is_lowercase());
        let has_upper = address.chars().any(|c| c.is_uppercase());
        if has_lower && has_upper {
            return Err(AddressError::UnknownAddressType);
        }

        let mut corrected = address.to_lowercase();
        if !corrected.contains(':') {
            corrected = format!("{}:{}", self.prefix, corrected);
        }

        let (prefix, data) = cashaddr::decode(&corrected)?;
        if prefix != self.prefix {
            return Err(AddressError::WrongPrefix {
                expected: self.prefix.clone(),
                found: prefix,
            });
        }

        let (&version, payload) = data
            .split_first()
            .ok_or(AddressError::UnknownAddressType)?;
        let expected_len = payload_len_for_version(version);
        if payload.len() != expected_len {
            return Err(AddressError::InvalidLength(payload.len()));
        }

        Ok(CashAddress {
            kind: address_type_for_bits(version & TYPE_BITS_MASK),
            payload: payload.to_vec(),
            version,
            string: corrected,
        })
    }

    /// Encode a locking-script payload of the given template as an address.
    pub fn encode(
        &self,
        locking_script_payload: &[u8],
        script_type: ScriptType,
    ) -> Result<CashAddress, AddressError> {
        let kind = match script_type {
            ScriptType::P2pkh | ScriptType::P2pk => AddressType::PubKeyHash,
            ScriptType::P2sh => AddressType::ScriptHash,
            _ => return Err(AddressError::UnsupportedScriptType),
        };
        let version = version_byte(kind, locking_script_payload.len())?;

        let mut data = Vec::with_capacity(1 + locking_script_payload.len());
        data.push(version);
        data.extend_from_slice(locking_script_payload);
        let string = cashaddr::encode(&self.prefix, &data)?;

        Ok(CashAddress {
            kind,
            payload: locking_script_payload.to_vec(),
            version,
            string,
        })
    }

    /// Encode the hash160 of a serialized public key as a P2PKH address.
    pub fn encode_public_key(&self, public_key: &[u8]) -> Result<CashAddress, AddressError> {
        self.encode(&hash160(public_key), ScriptType::P2pkh)
    }
}

/// Maps version-byte type bits to an address kind.
///
/// Unrecognized patterns fall back to `PubKeyHash` rather than failing, the
/// behavior inherited from deployed decoders. Tightening that fallback to a
/// hard failure only requires changing this function.
fn address_type_for_bits(type_bits: u8) -> AddressType {
    match type_bits {
        0x08 => AddressType::ScriptHash,
        _ => AddressType::PubKeyHash,
    }
}

/// Payload length promised by a version byte: base 20 bytes, +20 with the
/// tier bit, plus the size index in 4-byte steps (tier clear) or 8-byte
/// steps (tier set).
fn payload_len_for_version(version: u8) -> usize {
    let tier = version & SIZE_TIER_BIT != 0;
    let index = (version & SIZE_INDEX_MASK) as usize;
    let step = if tier { 8 } else { 4 };
    20 + if tier { 20 } else { 0 } + index * step
}

/// Pack kind and payload length into a version byte, rejecting every length
/// outside the eight canonical sizes.
fn version_byte(kind: AddressType, len: usize) -> Result<u8, AddressError> {
    let tier = len >= 40;
    let base = if tier { 40 } else { 20 };
    let step = if tier { 8 } else { 4 };
    let size = len
        .checked_sub(base)
        .ok_or(AddressError::InvalidLength(len))?;
    if size % step != 0 {
        return Err(AddressError::InvalidLength(len));
    }
    let index = size / step;
    if index > 3 {
        return Err(AddressError::InvalidLength(len));
    }
    Ok(kind.type_bits() | u8::from(tier) << 2 | index as u8)
}

/// RIPEMD160(SHA256(data)), the payload hash for key-based addresses.
fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let ripe = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripe);
    out
}
