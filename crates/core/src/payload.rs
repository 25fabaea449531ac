//! Typed access to the opaque payload span.
//!
//! Payload structs are encoded with bincode's fixed-width, little-endian
//! format: integers keep their size, fixed arrays carry no length prefix, so a
//! struct of fixed-size fields always produces the same number of bytes.
//! Avoid `String`, `Vec` and other variable-length fields in payloads.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

/// Number of bytes `value` occupies in a payload span.
pub fn encoded_len<T: Serialize>(value: &T) -> StoreResult<usize> {
    Ok(bincode::serialized_size(value)? as usize)
}

/// Write `value` at the start of `span`. Bytes past the encoded value are
/// left untouched.
pub fn encode_into<T: Serialize>(value: &T, span: &mut [u8]) -> StoreResult<usize> {
    let bytes = bincode::serialize(value)?;
    if bytes.len() > span.len() {
        return Err(StoreError::PayloadTooLarge {
            needed: bytes.len(),
            available: span.len(),
        });
    }
    span[..bytes.len()].copy_from_slice(&bytes);
    Ok(bytes.len())
}

/// Decode a value from the start of `span`; trailing bytes are ignored.
pub fn decode_from<T: DeserializeOwned>(span: &[u8]) -> StoreResult<T> {
    Ok(bincode::deserialize(span)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Wifi {
        channel: u8,
        timeout_ms: u16,
        ssid: [u8; 8],
    }

    #[test]
    fn test_fixed_layout() {
        let w = Wifi { channel: 6, timeout_ms: 0x0102, ssid: *b"home\0\0\0\0" };
        assert_eq!(encoded_len(&w).unwrap(), 11);
        let mut span = [0xEEu8; 12];
        assert_eq!(encode_into(&w, &mut span).unwrap(), 11);
        assert_eq!(&span[..3], &[6, 0x02, 0x01]);
        assert_eq!(&span[3..11], b"home\0\0\0\0");
        assert_eq!(span[11], 0xEE);
        assert_eq!(decode_from::<Wifi>(&span).unwrap(), w);
    }

    #[test]
    fn test_too_large() {
        let mut span = [0u8; 3];
        assert!(matches!(
            encode_into(&0u32, &mut span),
            Err(StoreError::PayloadTooLarge { needed: 4, available: 3 })
        ));
    }

    #[test]
    fn test_decode_short_span() {
        assert!(matches!(decode_from::<u32>(&[1, 2]), Err(StoreError::Payload(_))));
    }
}
