//! Byte-addressable persistent media.
//!
//! - [`Medium`] — the collaborator a store reads from and writes to
//! - [`MemoryMedium`] — emulated flash-backed EEPROM with a RAM cache
//! - [`FileMedium`] — [`MemoryMedium`] whose commits land in an image file
//!
//! The access model follows the EEPROM emulation layer of 32-bit
//! microcontrollers: `begin` maps a region into RAM, byte writes are
//! buffered, and only `commit` makes them survive a power cycle.

mod file;
mod memory;

pub use file::FileMedium;
pub use memory::{MediumStats, MemoryMedium};

use crate::error::StoreResult;

/// Persistent store accessed one byte at a time.
pub trait Medium {
    /// Total bytes the medium can hold.
    fn capacity(&self) -> usize;

    /// Prepare at least `size_hint` bytes for access.
    fn begin(&mut self, size_hint: usize) -> StoreResult<()>;

    fn read_byte(&mut self, addr: usize) -> StoreResult<u8>;

    /// May be buffered until [`Medium::commit`].
    fn write_byte(&mut self, addr: usize, byte: u8) -> StoreResult<()>;

    /// Flush buffered writes durably.
    fn commit(&mut self) -> StoreResult<()>;
}

impl<M: Medium + ?Sized> Medium for &mut M {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn begin(&mut self, size_hint: usize) -> StoreResult<()> {
        (**self).begin(size_hint)
    }

    fn read_byte(&mut self, addr: usize) -> StoreResult<u8> {
        (**self).read_byte(addr)
    }

    fn write_byte(&mut self, addr: usize, byte: u8) -> StoreResult<()> {
        (**self).write_byte(addr, byte)
    }

    fn commit(&mut self) -> StoreResult<()> {
        (**self).commit()
    }
}
