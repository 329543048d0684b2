//! Binary-to-decimal decoding of contract return values.
//!
//! Money-market views return big unsigned integers as minimal big-endian byte
//! strings of any width. Zero is encoded as the empty string.
//!
//! # Example
//!
//! ```
//! use money_market_reconciler::decoder::decode_biguint;
//!
//! assert_eq!(decode_biguint(&[0x01, 0x00]), "256");
//! assert_eq!(decode_biguint(&[]), "0");
//! ```

use num_bigint::BigUint;

/// Decode a big-endian unsigned integer into its canonical base-10 string.
///
/// Leading zero bytes are ignored, so the output never has leading zeros
/// except for the value zero itself (`"0"`). Empty input decodes to `"0"`.
#[must_use]
pub fn decode_biguint(bytes: &[u8]) -> String {
    BigUint::from_bytes_be(bytes).to_string()
}

/// Encode a value the way the chain does: minimal big-endian, empty for zero.
#[must_use]
pub fn encode_biguint(value: &BigUint) -> Vec<u8> {
    if value.bits() == 0 {
        return Vec::new();
    }
    value.to_bytes_be()
}
