//! Medium image files.
//!
//! Lets an emulated EEPROM outlive the process, the same way a board keeps
//! its EEPROM across resets and power off.
//!
//! ## File format
//!
//! ```text
//! +------------------+
//! | Magic "EEIM"     |  4 bytes
//! +------------------+
//! | Format version   |  u32 little-endian (currently 1)
//! +------------------+
//! | Compressed data  |  deflate-compressed bincode MediumImage
//! +------------------+
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Magic bytes identifying a medium image file.
const MAGIC: &[u8; 4] = b"EEIM";
/// Current image format version.
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 8;

#[derive(Serialize, Deserialize)]
struct MediumImage {
    capacity: u32,
    contents: Vec<u8>,
}

/// Encode medium contents into image bytes.
pub fn encode(contents: &[u8]) -> StoreResult<Vec<u8>> {
    let image = MediumImage {
        capacity: u32::try_from(contents.len())
            .map_err(|_| StoreError::ImageFormat(format!("medium of {} bytes", contents.len())))?,
        contents: contents.to_vec(),
    };
    let payload = bincode::serialize(&image)?;
    let compressed = miniz_oxide::deflate::compress_to_vec(&payload, 6);

    let mut out = Vec::with_capacity(HEADER_LEN + compressed.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Decode image bytes back into medium contents, verifying magic and version.
pub fn decode(data: &[u8]) -> StoreResult<Vec<u8>> {
    if data.len() < HEADER_LEN {
        return Err(StoreError::ImageFormat("file too small".into()));
    }
    if &data[0..4] != MAGIC {
        return Err(StoreError::ImageFormat("bad magic".into()));
    }
    let version = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if version != FORMAT_VERSION {
        return Err(StoreError::ImageFormat(format!(
            "unsupported version {} (expected {})",
            version, FORMAT_VERSION
        )));
    }

    let decompressed = miniz_oxide::inflate::decompress_to_vec(&data[HEADER_LEN..])
        .map_err(|e| StoreError::ImageFormat(format!("decompress: {:?}", e)))?;
    let image: MediumImage = bincode::deserialize(&decompressed)?;

    if image.contents.len() != image.capacity as usize {
        return Err(StoreError::ImageFormat(format!(
            "capacity {} but {} bytes of contents",
            image.capacity,
            image.contents.len()
        )));
    }
    Ok(image.contents)
}

pub fn save_to_file(contents: &[u8], path: &Path) -> StoreResult<()> {
    std::fs::write(path, encode(contents)?)?;
    Ok(())
}

pub fn load_from_file(path: &Path) -> StoreResult<Vec<u8>> {
    decode(&std::fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header() {
        let out = encode(&[0xFF; 64]).unwrap();
        assert_eq!(&out[0..4], b"EEIM");
        assert_eq!(&out[4..8], &[1, 0, 0, 0]);
        // erased pages compress well
        assert!(out.len() < 64);
    }

    #[test]
    fn test_decode_restores_contents() {
        let contents: Vec<u8> = (0..=255).collect();
        assert_eq!(decode(&encode(&contents).unwrap()).unwrap(), contents);
    }

    #[test]
    fn test_bad_magic() {
        let mut out = encode(&[0u8; 4]).unwrap();
        out[0] = b'X';
        assert!(matches!(decode(&out), Err(StoreError::ImageFormat(_))));
    }

    #[test]
    fn test_unsupported_version() {
        let mut out = encode(&[0u8; 4]).unwrap();
        out[4] = 9;
        let err = decode(&out).unwrap_err();
        assert!(err.to_string().contains("unsupported version 9"));
    }

    #[test]
    fn test_truncated() {
        assert!(matches!(decode(b"EEIM"), Err(StoreError::ImageFormat(_))));
        let out = encode(&[1u8; 32]).unwrap();
        assert!(decode(&out[..out.len() - 2]).is_err());
    }
}
