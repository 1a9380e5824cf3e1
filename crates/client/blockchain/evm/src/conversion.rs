//! Hex conversions used on the JSON-RPC wire.

use client_blockchain_core::{Address, TransportError, TxHash};

/// Encode a quantity as minimal `0x`-prefixed hex.
pub fn to_quantity(value: u64) -> String {
    format!("0x{:x}", value)
}

/// Decode a `0x`-prefixed hex quantity.
pub fn parse_quantity(text: &str) -> Result<u64, TransportError> {
    let digits = strip(text)?;
    if digits.is_empty() {
        return Err(TransportError::SerializationError(format!(
            "empty quantity {:?}",
            text
        )));
    }
    u64::from_str_radix(digits, 16).map_err(|e| {
        TransportError::SerializationError(format!("invalid quantity {:?}: {}", text, e))
    })
}

/// Encode bytes as `0x`-prefixed hex data.
pub fn to_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode `0x`-prefixed hex data.
pub fn parse_data(text: &str) -> Result<Vec<u8>, TransportError> {
    hex::decode(strip(text)?).map_err(|e| {
        TransportError::SerializationError(format!("invalid hex data {:?}: {}", text, e))
    })
}

pub fn parse_address(text: &str) -> Result<Address, TransportError> {
    text.parse().map_err(TransportError::SerializationError)
}

pub fn parse_tx_hash(text: &str) -> Result<TxHash, TransportError> {
    parse_data(text).map(TxHash::from_bytes)
}

pub fn parse_word(text: &str) -> Result<[u8; 32], TransportError> {
    let bytes = parse_data(text)?;
    bytes.as_slice().try_into().map_err(|_| {
        TransportError::SerializationError(format!("expected 32-byte word, got {}", bytes.len()))
    })
}

fn strip(text: &str) -> Result<&str, TransportError> {
    text.strip_prefix("0x").ok_or_else(|| {
        TransportError::SerializationError(format!("missing 0x prefix: {:?}", text))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_round_trip() {
        assert_eq!(to_quantity(84_532), "0x14a34");
        assert_eq!(parse_quantity("0x14a34").unwrap(), 84_532);
        assert_eq!(to_quantity(0), "0x0");
        assert!(parse_quantity("0x").is_err());
        assert!(parse_quantity("12").is_err());
    }

    #[test]
    fn data_requires_prefix_and_valid_hex() {
        assert_eq!(parse_data("0x0a0b").unwrap(), vec![10, 11]);
        assert_eq!(to_data(&[10, 11]), "0x0a0b");
        assert!(parse_data("0a0b").is_err());
        assert!(parse_data("0xzz").is_err());
        assert!(parse_word("0x00").is_err());
    }
}
