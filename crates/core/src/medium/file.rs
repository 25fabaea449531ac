//! Emulated EEPROM persisted to an image file on the host.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Medium, MemoryMedium};
use crate::error::{StoreError, StoreResult};
use crate::image;

pub struct FileMedium {
    path: PathBuf,
    inner: MemoryMedium,
}

impl FileMedium {
    /// Open the image at `path`, or start from an erased medium if there is
    /// none yet. An existing image must have exactly `capacity` bytes.
    pub fn open(path: impl Into<PathBuf>, capacity: usize) -> StoreResult<Self> {
        let path = path.into();
        let inner = if path.exists() {
            let contents = image::load_from_file(&path)?;
            if contents.len() != capacity {
                return Err(StoreError::ImageFormat(format!(
                    "{}: image holds {} bytes, expected {}",
                    path.display(),
                    contents.len(),
                    capacity
                )));
            }
            debug!(path = %path.display(), capacity, "loaded EEPROM image");
            MemoryMedium::from_bytes(contents)
        } else {
            MemoryMedium::new(capacity)
        };
        Ok(FileMedium { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn memory(&self) -> &MemoryMedium {
        &self.inner
    }

    pub fn memory_mut(&mut self) -> &mut MemoryMedium {
        &mut self.inner
    }
}

impl Medium for FileMedium {
    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn begin(&mut self, size_hint: usize) -> StoreResult<()> {
        self.inner.begin(size_hint)
    }

    fn read_byte(&mut self, addr: usize) -> StoreResult<u8> {
        self.inner.read_byte(addr)
    }

    fn write_byte(&mut self, addr: usize, byte: u8) -> StoreResult<()> {
        self.inner.write_byte(addr, byte)
    }

    fn commit(&mut self) -> StoreResult<()> {
        if self.inner.flush()? {
            // keep the data pending so a later commit retries the file write
            if let Err(e) = image::save_to_file(self.inner.contents(), &self.path) {
                self.inner.mark_dirty();
                return Err(e);
            }
            debug!(path = %self.path.display(), "wrote EEPROM image");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_starts_erased() {
        let dir = tempfile::tempdir().unwrap();
        let medium = FileMedium::open(dir.path().join("eeprom.img"), 32).unwrap();
        assert_eq!(medium.capacity(), 32);
        assert!(medium.memory().contents().iter().all(|&b| b == 0xFF));
        assert!(!medium.path().exists());
    }

    #[test]
    fn test_commit_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eeprom.img");
        {
            let mut medium = FileMedium::open(&path, 16).unwrap();
            medium.begin(16).unwrap();
            medium.write_byte(5, 0x5A).unwrap();
            medium.commit().unwrap();
        }
        let mut medium = FileMedium::open(&path, 16).unwrap();
        medium.begin(16).unwrap();
        assert_eq!(medium.read_byte(5).unwrap(), 0x5A);
    }

    #[test]
    fn test_uncommitted_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eeprom.img");
        let mut medium = FileMedium::open(&path, 16).unwrap();
        medium.begin(16).unwrap();
        medium.write_byte(0, 1).unwrap();
        drop(medium);
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_image_write_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("later");
        let path = parent.join("node.eeprom");
        let mut medium = FileMedium::open(&path, 16).unwrap();
        medium.begin(16).unwrap();
        medium.write_byte(2, 0x33).unwrap();
        assert!(matches!(medium.commit(), Err(StoreError::Io(_))));
        assert!(medium.memory().is_dirty());

        std::fs::create_dir_all(&parent).unwrap();
        // same bytes again: the pending image must still be written
        medium.write_byte(2, 0x33).unwrap();
        medium.commit().unwrap();
        assert!(path.exists());
        assert!(!medium.memory().is_dirty());

        let mut reopened = FileMedium::open(&path, 16).unwrap();
        reopened.begin(16).unwrap();
        assert_eq!(reopened.read_byte(2).unwrap(), 0x33);
    }

    #[test]
    fn test_capacity_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eeprom.img");
        image::save_to_file(&[0u8; 8], &path).unwrap();
        assert!(matches!(
            FileMedium::open(&path, 16),
            Err(StoreError::ImageFormat(_))
        ));
    }
}
