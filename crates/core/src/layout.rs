//! Fixed byte layout of a persisted record.
//!
//! The record is mirrored verbatim to the medium, so its layout is spelled
//! out explicitly instead of relying on platform struct rules:
//!
//! | Offset          | Size              | Field                         |
//! |-----------------|-------------------|-------------------------------|
//! | 0               | `W` (2 or 4)      | version, little-endian        |
//! | `W`             | `T` (optional)    | tag, NUL-terminated, 0-filled |
//! | `W + T`         | rest of record    | payload, opaque to the store  |
//!
//! No padding is ever inserted between fields.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Width of the leading version field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VersionWidth {
    /// 16-bit `unsigned int` (AVR targets)
    U16,
    /// 32-bit `unsigned int` (ESP8266 and other 32-bit targets)
    #[default]
    U32,
}

impl VersionWidth {
    pub fn bytes(self) -> usize {
        match self {
            VersionWidth::U16 => 2,
            VersionWidth::U32 => 4,
        }
    }

    /// Largest version representable in this width.
    pub fn max(self) -> u32 {
        match self {
            VersionWidth::U16 => u16::MAX as u32,
            VersionWidth::U32 => u32::MAX,
        }
    }
}

/// Named field offsets of a record of a given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    version_width: VersionWidth,
    tag_span: Option<usize>,
    record_size: usize,
}

impl RecordLayout {
    /// Build a layout, rejecting records too small for their header.
    /// A tag span of zero means the record has no tag field.
    pub fn new(
        version_width: VersionWidth,
        tag_span: Option<usize>,
        record_size: usize,
    ) -> StoreResult<Self> {
        let layout = RecordLayout {
            version_width,
            tag_span: tag_span.filter(|&span| span > 0),
            record_size,
        };
        if record_size < layout.header_size() {
            return Err(StoreError::RecordTooSmall {
                record_size,
                header_size: layout.header_size(),
            });
        }
        Ok(layout)
    }

    pub fn version_width(&self) -> VersionWidth {
        self.version_width
    }

    pub fn tag_span(&self) -> Option<usize> {
        self.tag_span
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Version plus tag span.
    pub fn header_size(&self) -> usize {
        self.version_width.bytes() + self.tag_span.unwrap_or(0)
    }

    pub fn version_range(&self) -> Range<usize> {
        0..self.version_width.bytes()
    }

    pub fn tag_range(&self) -> Option<Range<usize>> {
        let start = self.version_width.bytes();
        self.tag_span.map(|span| start..start + span)
    }

    pub fn payload_range(&self) -> Range<usize> {
        self.header_size()..self.record_size
    }

    /// Longest tag text that survives a round trip through the tag span.
    pub fn tag_capacity(&self) -> Option<usize> {
        self.tag_span.map(|span| span - 1)
    }

    // ─── Field access over a record buffer ──────────────────────────────────

    /// Decode the version field (little-endian).
    pub fn read_version(&self, record: &[u8]) -> u32 {
        let bytes = &record[self.version_range()];
        match self.version_width {
            VersionWidth::U16 => u16::from_le_bytes([bytes[0], bytes[1]]) as u32,
            VersionWidth::U32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        }
    }

    pub fn write_version(&self, record: &mut [u8], version: u32) -> StoreResult<()> {
        if version > self.version_width.max() {
            return Err(StoreError::VersionOutOfRange {
                version,
                width: self.version_width.bytes(),
            });
        }
        let range = self.version_range();
        match self.version_width {
            VersionWidth::U16 => record[range].copy_from_slice(&(version as u16).to_le_bytes()),
            VersionWidth::U32 => record[range].copy_from_slice(&version.to_le_bytes()),
        }
        Ok(())
    }

    /// Tag bytes up to (not including) the first NUL, never past the span.
    pub fn read_tag<'r>(&self, record: &'r [u8]) -> Option<&'r [u8]> {
        let span = &record[self.tag_range()?];
        let len = span.iter().position(|&b| b == 0).unwrap_or(span.len());
        Some(&span[..len])
    }

    /// Copy `text` into the tag span with `strncpy` semantics: truncated to
    /// the tag capacity, remainder zero-filled, last byte always NUL.
    pub fn write_tag(&self, record: &mut [u8], text: &str) -> StoreResult<()> {
        let range = self.tag_range().ok_or(StoreError::NoTagField)?;
        let truncated = truncate_tag(text, range.len());
        let span = &mut record[range];
        span.fill(0);
        span[..truncated.len()].copy_from_slice(truncated.as_bytes());
        Ok(())
    }
}

/// Cut `text` at its first NUL and to at most `span - 1` bytes, backing off
/// to a UTF-8 character boundary.
pub fn truncate_tag(text: &str, span: usize) -> &str {
    let text = match text.find('\0') {
        Some(nul) => &text[..nul],
        None => text,
    };
    let limit = span.saturating_sub(1);
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
