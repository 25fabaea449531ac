//! The versioned record store.
//!
//! [`VersionedStore::init`] is the whole protocol: read the record from the
//! medium, and if its version is not the one the firmware expects (obsolete
//! layout, or a medium that was never written), rebuild the record from
//! defaults and write it back.
//!
//! ```text
//!              load()            version == expected
//! Uninitialized ──────► compare ─────────────────────► Synced
//!                          │
//!                          │ version != expected
//!                          ▼
//!                  reset_to_default() + save() ──────► Reset
//! ```

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::defaults::{Defaults, KeepPayload};
use crate::error::{StoreError, StoreResult};
use crate::layout::RecordLayout;
use crate::medium::Medium;
use crate::payload;

/// Result of [`VersionedStore::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The medium already held the expected version; nothing was written.
    Synced,
    /// The medium held `found`; defaults were restored and saved.
    Reset { found: u32 },
}

/// Fixed-size record mirrored to a [`Medium`].
///
/// `B` is the record buffer: `Vec<u8>` when the store allocates it,
/// `&mut [u8]` or `[u8; N]` when the caller provides it.
pub struct VersionedStore<B, M, D = KeepPayload> {
    record: B,
    medium: M,
    defaults: D,
    layout: RecordLayout,
    config: StoreConfig,
}

impl<M: Medium> VersionedStore<Vec<u8>, M> {
    /// Store with its own zeroed record buffer.
    pub fn new(config: StoreConfig, medium: M) -> StoreResult<Self> {
        let record = vec![0u8; config.record_size];
        Self::with_buffer(config, record, medium)
    }
}

impl<B, M> VersionedStore<B, M>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
    M: Medium,
{
    /// Store over a caller-provided buffer of exactly `record_size` bytes.
    /// The buffer contents are kept until the first load or reset.
    pub fn with_buffer(config: StoreConfig, record: B, medium: M) -> StoreResult<Self> {
        let layout = config.layout()?;
        let width = layout.version_width();
        if config.version > width.max() {
            return Err(StoreError::VersionOutOfRange {
                version: config.version,
                width: width.bytes(),
            });
        }
        let len = record.as_ref().len();
        if len != layout.record_size() {
            return Err(StoreError::BufferSize {
                buffer: len,
                record_size: layout.record_size(),
            });
        }
        Ok(VersionedStore {
            record,
            medium,
            defaults: KeepPayload,
            layout,
            config,
        })
    }
}

impl<B, M, D> VersionedStore<B, M, D>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
    M: Medium,
    D: Defaults,
{
    /// Replace the payload defaults used by [`VersionedStore::reset_to_default`].
    pub fn with_defaults<D2: Defaults>(self, defaults: D2) -> VersionedStore<B, M, D2> {
        VersionedStore {
            record: self.record,
            medium: self.medium,
            defaults,
            layout: self.layout,
            config: self.config,
        }
    }

    /// Load the record and reconcile it with the expected version.
    pub fn init(&mut self) -> StoreResult<InitOutcome> {
        self.load()?;
        let found = self.version();
        let expected = self.config.version;
        if found == expected {
            info!(version = found, "stored record is up to date");
            return Ok(InitOutcome::Synced);
        }
        warn!(found, expected, "stored record is out of date, restoring defaults");
        self.reset_to_default()?;
        self.save()?;
        Ok(InitOutcome::Reset { found })
    }

    /// Read `record_size` bytes from address 0 of the medium into the record.
    pub fn load(&mut self) -> StoreResult<()> {
        let size = self.layout.record_size();
        self.check_capacity()?;
        self.medium.begin(size)?;
        for (addr, byte) in self.record.as_mut().iter_mut().enumerate() {
            *byte = self.medium.read_byte(addr)?;
        }
        debug!(bytes = size, "loaded record");
        Ok(())
    }

    /// Write the whole record to address 0 of the medium and commit.
    ///
    /// The medium must already be prepared by [`VersionedStore::load`] or
    /// [`VersionedStore::init`].
    pub fn save(&mut self) -> StoreResult<()> {
        self.check_capacity()?;
        for (addr, &byte) in self.record.as_ref().iter().enumerate() {
            self.medium.write_byte(addr, byte)?;
        }
        self.medium.commit()?;
        debug!(bytes = self.layout.record_size(), "saved record");
        Ok(())
    }

    /// Save the record up to byte offset `boundary`.
    ///
    /// Only a boundary at the end of the record (a full save) is supported.
    /// Partial saves fail with [`StoreError::NotImplemented`] rather than
    /// writing more than was asked for.
    pub fn save_through(&mut self, boundary: usize) -> StoreResult<()> {
        let record_size = self.layout.record_size();
        if boundary > record_size {
            return Err(StoreError::BoundaryOutOfRange { boundary, record_size });
        }
        if boundary < record_size {
            return Err(StoreError::NotImplemented("partial save up to a boundary"));
        }
        self.save()
    }

    /// Save the bytes in `from..to`. Not implemented.
    pub fn save_range(&mut self, _from: usize, _to: usize) -> StoreResult<()> {
        Err(StoreError::NotImplemented("ranged save"))
    }

    /// Overwrite version and tag with the configured defaults, then let the
    /// [`Defaults`] capability fill the payload.
    pub fn reset_to_default(&mut self) -> StoreResult<()> {
        let record = self.record.as_mut();
        self.layout.write_version(record, self.config.version)?;
        if self.layout.tag_span().is_some() {
            self.layout.write_tag(record, self.config.default_tag())?;
        }
        let payload = self.layout.payload_range();
        self.defaults.fill_payload(&mut record[payload])
    }

    // ─── Field access ───────────────────────────────────────────────────────

    pub fn version(&self) -> u32 {
        self.layout.read_version(self.record.as_ref())
    }

    pub fn set_version(&mut self, version: u32) -> StoreResult<()> {
        self.layout.write_version(self.record.as_mut(), version)
    }

    /// Raw tag bytes before the terminating NUL; `None` without a tag field.
    pub fn tag_bytes(&self) -> Option<&[u8]> {
        self.layout.read_tag(self.record.as_ref())
    }

    /// Tag text; invalid UTF-8 (e.g. from an erased medium) is replaced.
    pub fn tag(&self) -> Option<Cow<'_, str>> {
        self.tag_bytes().map(String::from_utf8_lossy)
    }

    /// Truncates to the tag capacity; the span always ends with a NUL.
    pub fn set_tag(&mut self, tag: &str) -> StoreResult<()> {
        self.layout.write_tag(self.record.as_mut(), tag)
    }

    pub fn record_size(&self) -> usize {
        self.layout.record_size()
    }

    pub fn expected_version(&self) -> u32 {
        self.config.version
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Whole record, header included.
    pub fn data(&self) -> &[u8] {
        self.record.as_ref()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.record.as_mut()
    }

    pub fn payload(&self) -> &[u8] {
        &self.record.as_ref()[self.layout.payload_range()]
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        let range = self.layout.payload_range();
        &mut self.record.as_mut()[range]
    }

    /// Decode a typed payload (see [`crate::payload`]).
    pub fn read_payload<T: DeserializeOwned>(&self) -> StoreResult<T> {
        payload::decode_from(self.payload())
    }

    /// Encode a typed payload into the record. Not persisted until saved.
    pub fn write_payload<T: Serialize>(&mut self, value: &T) -> StoreResult<()> {
        payload::encode_into(value, self.payload_mut()).map(|_| ())
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }

    /// Give back the record buffer and the medium.
    pub fn into_parts(self) -> (B, M) {
        (self.record, self.medium)
    }

    fn check_capacity(&self) -> StoreResult<()> {
        let required = self.layout.record_size();
        let capacity = self.medium.capacity();
        if capacity < required {
            return Err(StoreError::MediumTooSmall { required, capacity });
        }
        Ok(())
    }
}
