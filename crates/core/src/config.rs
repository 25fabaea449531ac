//! Store configuration: expected version, default tag and record geometry.

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::layout::{truncate_tag, RecordLayout, VersionWidth};
use crate::TAG_SPAN;

/// Everything a [`crate::VersionedStore`] needs to know before touching the
/// medium. Serializable so firmware build tooling can keep it alongside
/// other board settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Version the running firmware expects to find on the medium
    pub version: u32,
    /// Default tag as given; see [`StoreConfig::default_tag`]
    pub tag: String,
    /// Total record length in bytes
    pub record_size: usize,
    #[serde(default)]
    pub version_width: VersionWidth,
    /// Tag span in bytes, `None` for records without a tag
    #[serde(default = "default_tag_span")]
    pub tag_span: Option<usize>,
}

fn default_tag_span() -> Option<usize> {
    Some(TAG_SPAN)
}

impl StoreConfig {
    /// 32-bit version followed by a [`TAG_SPAN`]-byte tag.
    pub fn new(version: u32, tag: &str, record_size: usize) -> Self {
        StoreConfig {
            version,
            tag: tag.to_owned(),
            record_size,
            version_width: VersionWidth::U32,
            tag_span: Some(TAG_SPAN),
        }
    }

    pub fn with_version_width(mut self, width: VersionWidth) -> Self {
        self.version_width = width;
        self
    }

    pub fn with_tag_span(mut self, span: usize) -> Self {
        self.tag_span = Some(span);
        self
    }

    pub fn without_tag(mut self) -> Self {
        self.tag_span = None;
        self
    }

    /// The tag written by a reset: truncated to the tag capacity, empty when
    /// the record has no tag field.
    pub fn default_tag(&self) -> &str {
        match self.tag_span {
            Some(span) => truncate_tag(&self.tag, span),
            None => "",
        }
    }

    /// Resolve the byte layout, validating the record size.
    pub fn layout(&self) -> StoreResult<RecordLayout> {
        RecordLayout::new(self.version_width, self.tag_span, self.record_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EXTENDED_TAG_SPAN;

    #[test]
    fn test_default_tag_truncated_to_span() {
        let cfg = StoreConfig::new(1, "01234567890123456789xyz", 32);
        assert_eq!(cfg.default_tag(), "0123456789012345678");
        let cfg = cfg.with_tag_span(EXTENDED_TAG_SPAN);
        assert_eq!(cfg.default_tag(), "01234567890123456789");
        assert_eq!(cfg.without_tag().default_tag(), "");
    }

    #[test]
    fn test_layout_validation() {
        assert!(StoreConfig::new(1, "x", 23).layout().is_err());
        assert!(StoreConfig::new(1, "x", 24).layout().is_ok());
        let layout = StoreConfig::new(1, "x", 2)
            .without_tag()
            .with_version_width(VersionWidth::U16)
            .layout()
            .unwrap();
        assert_eq!(layout.payload_range(), 2..2);
    }

    #[test]
    fn test_config_survives_bincode() {
        let cfg = StoreConfig::new(7, "cfg", 40).with_version_width(VersionWidth::U16);
        let bytes = bincode::serialize(&cfg).unwrap();
        let back: StoreConfig = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, cfg);
    }
}
