//! CashAddr base32 layer: polymod checksum, prefix expansion, bit repacking
//!
//! CashAddr shares bech32's 5-bit character set but nothing else: the
//! checksum uses five 40-bit generators instead of the bech32 BCH code, the
//! prefix is expanded as low-5-bits-plus-separator, and leftover padding
//! bits must be zero. Only the `Fe32` charset primitive from the bech32
//! crate is reusable here.

use bech32::Fe32;

use crate::error::AddressError;

/// Checksum length in 5-bit characters (40 bits).
const CHECKSUM_LEN: usize = 8;

/// CashAddr checksum generators.
const GENERATORS: [u64; 5] = [
    0x98f2bc8e61,
    0x79b76d99e2,
    0xf33e5fb3c4,
    0xae2eabe2a8,
    0x1e4f43e470,
];

/// Checksum state over 5-bit values; zero means a valid checksum.
fn polymod(values: &[u8]) -> u64 {
    let mut c: u64 = 1;
    for &d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07ffffffff) << 5) ^ u64::from(d);
        for (i, generator) in GENERATORS.iter().enumerate() {
            if c0 & (1 << i) != 0 {
                c ^= generator;
            }
        }
    }
    c ^ 1
}

/// Prefix expansion: the low 5 bits of each character, then a zero separator.
fn expand_prefix(prefix: &str) -> Vec<u8> {
    let mut expanded = Vec::with_capacity(prefix.len() + 1);
    for byte in prefix.bytes() {
        expanded.push(byte & 0x1f);
    }
    expanded.push(0);
    expanded
}

/// Regroup 8-bit bytes into 5-bit field elements, left-padding the tail.
fn bytes_to_fes(data: &[u8]) -> Result<Vec<Fe32>, AddressError> {
    let mut acc: u32 = 0;
    let mut bits: u8 = 0;
    let mut fes = Vec::with_capacity(data.len() * 8 / 5 + 1);

    for &byte in data {
        acc = (acc << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            let value = ((acc >> bits) & 0x1f) as u8;
            fes.push(Fe32::try_from(value).map_err(|_| AddressError::UnknownAddressType)?);
        }
    }
    if bits > 0 {
        let value = ((acc << (5 - bits)) & 0x1f) as u8;
        fes.push(Fe32::try_from(value).map_err(|_| AddressError::UnknownAddressType)?);
    }
    Ok(fes)
}

/// Regroup 5-bit field elements into bytes. Leftover bits must be fewer
/// than five and all zero; anything else is encoding-level corruption.
fn fes_to_bytes(fes: &[Fe32]) -> Result<Vec<u8>, AddressError> {
    let mut acc: u32 = 0;
    let mut bits: u8 = 0;
    let mut bytes = Vec::with_capacity(fes.len() * 5 / 8);

    for &fe in fes {
        acc = (acc << 5) | u32::from(fe.to_u8());
        bits += 5;
        while bits >= 8 {
            bits -= 8;
            bytes.push(((acc >> bits) & 0xff) as u8);
        }
    }
    if bits >= 5 || (bits > 0 && (acc << (8 - bits)) & 0xff != 0) {
        return Err(AddressError::InvalidChecksum);
    }
    Ok(bytes)
}

/// Encode `data` under `prefix`, producing the full `prefix:body` string.
pub(crate) fn encode(prefix: &str, data: &[u8]) -> Result<String, AddressError> {
    let payload = bytes_to_fes(data)?;

    let mut values = expand_prefix(prefix);
    values.extend(payload.iter().map(|fe| fe.to_u8()));
    values.extend_from_slice(&[0u8; CHECKSUM_LEN]);
    let checksum = polymod(&values);

    let mut encoded = String::with_capacity(prefix.len() + 1 + payload.len() + CHECKSUM_LEN);
    encoded.push_str(prefix);
    encoded.push(':');
    for fe in &payload {
        encoded.push(fe.to_char());
    }
    for i in 0..CHECKSUM_LEN {
        let value = ((checksum >> (5 * (CHECKSUM_LEN - 1 - i))) & 0x1f) as u8;
        let fe = Fe32::try_from(value).map_err(|_| AddressError::UnknownAddressType)?;
        encoded.push(fe.to_char());
    }
    Ok(encoded)
}

/// Decode a full `prefix:body` string into its prefix and data bytes.
///
/// The separator must already be present; synthesizing a missing prefix is
/// the codec's job. Mixed-case input and out-of-charset characters are not
/// parseable; a well-formed body whose polymod does not come out zero fails
/// with `InvalidChecksum`.
pub(crate) fn decode(address: &str) -> Result<(String, Vec<u8>), AddressError> {
    let has_lower = address.chars().any(|c| c.is_lowercase());
    let has_upper = address.chars().any(|c| c.is_uppercase());
    if has_lower && has_upper {
        return Err(AddressError::UnknownAddressType);
    }
    let address = address.to_lowercase();

    let (prefix, body) = address
        .split_once(':')
        .ok_or(AddressError::UnknownAddressType)?;
    if prefix.is_empty() || body.len() <= CHECKSUM_LEN {
        return Err(AddressError::UnknownAddressType);
    }

    let mut fes = Vec::with_capacity(body.len());
    for ch in body.chars() {
        fes.push(Fe32::from_char(ch).map_err(|_| AddressError::UnknownAddressType)?);
    }

    let mut values = expand_prefix(prefix);
    values.extend(fes.iter().map(|fe| fe.to_u8()));
    if polymod(&values) != 0 {
        return Err(AddressError::InvalidChecksum);
    }

    let data = fes_to_bytes(&fes[..fes.len() - CHECKSUM_LEN])?;
    Ok((prefix.to_string(), data))
}
