//! In-memory EEPROM emulation.

use tracing::debug;

use super::Medium;
use crate::error::{StoreError, StoreResult};
use crate::{EEPROM_SIZE, ERASED_BYTE};

/// Access counters, reset only by [`MemoryMedium::reset_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediumStats {
    pub reads: u64,
    pub writes: u64,
    /// Commits that actually flushed dirty data
    pub commits: u64,
}

/// Emulated EEPROM: a persisted array plus the RAM cache mapped by `begin`.
pub struct MemoryMedium {
    /// Persisted contents (survive [`MemoryMedium::power_cycle`])
    flash: Vec<u8>,
    /// RAM view of the first `len` bytes, present after `begin`
    cache: Option<Vec<u8>>,
    dirty: bool,
    stats: MediumStats,
}

impl MemoryMedium {
    /// Erased medium of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self::from_bytes(vec![ERASED_BYTE; capacity])
    }

    /// Erased medium of [`EEPROM_SIZE`] bytes.
    pub fn erased() -> Self {
        Self::new(EEPROM_SIZE)
    }

    /// Medium whose persisted contents are `bytes`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        MemoryMedium {
            flash: bytes,
            cache: None,
            dirty: false,
            stats: MediumStats::default(),
        }
    }

    /// Persisted contents; uncommitted writes are not visible here.
    pub fn contents(&self) -> &[u8] {
        &self.flash
    }

    /// Overwrite the persisted contents directly, as an external programmer
    /// would. Drops any mapped cache.
    pub fn program(&mut self, offset: usize, bytes: &[u8]) -> StoreResult<()> {
        let end = match offset.checked_add(bytes.len()) {
            Some(end) if end <= self.flash.len() => end,
            _ => {
                return Err(StoreError::MediumTooSmall {
                    required: offset.saturating_add(bytes.len()),
                    capacity: self.flash.len(),
                })
            }
        };
        self.flash[offset..end].copy_from_slice(bytes);
        self.cache = None;
        self.dirty = false;
        Ok(())
    }

    /// Simulate losing power: the RAM cache and uncommitted writes vanish.
    pub fn power_cycle(&mut self) {
        if self.dirty {
            debug!("power cycle discards uncommitted writes");
        }
        self.cache = None;
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn stats(&self) -> MediumStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = MediumStats::default();
    }

    /// Flag the mapped cache as needing a commit again.
    pub(crate) fn mark_dirty(&mut self) {
        if self.cache.is_some() {
            self.dirty = true;
        }
    }

    /// Commit and report whether anything was flushed.
    pub(crate) fn flush(&mut self) -> StoreResult<bool> {
        let cache = self.cache.as_ref().ok_or(StoreError::MediumUnavailable)?;
        if !self.dirty {
            return Ok(false);
        }
        self.flash[..cache.len()].copy_from_slice(cache);
        self.dirty = false;
        self.stats.commits += 1;
        debug!(bytes = cache.len(), "committed EEPROM cache");
        Ok(true)
    }

    fn cache_slot(&mut self, addr: usize) -> StoreResult<&mut u8> {
        let cache = self.cache.as_mut().ok_or(StoreError::MediumUnavailable)?;
        let limit = cache.len();
        cache
            .get_mut(addr)
            .ok_or(StoreError::AddressOutOfRange { addr, limit })
    }
}

impl Default for MemoryMedium {
    fn default() -> Self {
        Self::erased()
    }
}

impl Medium for MemoryMedium {
    fn capacity(&self) -> usize {
        self.flash.len()
    }

    fn begin(&mut self, size_hint: usize) -> StoreResult<()> {
        if size_hint > self.flash.len() {
            return Err(StoreError::MediumTooSmall {
                required: size_hint,
                capacity: self.flash.len(),
            });
        }
        // Re-mapping keeps pending writes, like a second EEPROM.begin()
        if let Some(cache) = &self.cache {
            if cache.len() >= size_hint {
                return Ok(());
            }
        }
        let mut cache = self.flash[..size_hint].to_vec();
        if let Some(old) = self.cache.take() {
            cache[..old.len()].copy_from_slice(&old);
        }
        self.cache = Some(cache);
        Ok(())
    }

    fn read_byte(&mut self, addr: usize) -> StoreResult<u8> {
        let byte = *self.cache_slot(addr)?;
        self.stats.reads += 1;
        Ok(byte)
    }

    fn write_byte(&mut self, addr: usize, byte: u8) -> StoreResult<()> {
        let slot = self.cache_slot(addr)?;
        let changed = *slot != byte;
        *slot = byte;
        if changed {
            self.dirty = true;
        }
        self.stats.writes += 1;
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.flush().map(|_| ())
    }
}
