//! # eeprom-config
//!
//! Versioned configuration record for microcontroller EEPROM.
//!
//! A firmware keeps its settings in a fixed-size record that is copied byte
//! for byte to and from the start of an EEPROM region. The record starts with
//! a version number; when the firmware boots and finds a different version on
//! the medium (older layout, or a chip that was never written), the record is
//! rebuilt from defaults and saved back.
//!
//! ## Architecture
//!
//! - [`VersionedStore`] — the record buffer and the init/load/save protocol
//! - [`StoreConfig`] — expected version, default tag, record geometry
//! - [`layout`] — explicit little-endian, padding-free field layout
//! - [`Defaults`] — how a reset fills the payload beyond version and tag
//! - [`medium`] — the [`Medium`] trait, in-memory and file-backed EEPROMs
//! - [`payload`] — serde/bincode encoding of typed payload structs
//! - [`image`] — compressed image files for host-side emulated EEPROMs
//!
//! ## Example
//!
//! ```
//! use eeprom_config::{InitOutcome, MemoryMedium, StoreConfig, VersionedStore};
//!
//! let config = StoreConfig::new(3, "sensor-cfg", 32);
//! let mut store = VersionedStore::new(config, MemoryMedium::erased())?;
//! assert!(matches!(store.init()?, InitOutcome::Reset { .. }));
//! assert_eq!(store.version(), 3);
//! assert_eq!(store.init()?, InitOutcome::Synced);
//! # Ok::<(), eeprom_config::StoreError>(())
//! ```

pub mod config;
pub mod defaults;
pub mod error;
pub mod image;
pub mod layout;
pub mod medium;
pub mod payload;
pub mod store;

pub use config::StoreConfig;
pub use defaults::{Defaults, KeepPayload, SerdeDefaults, ZeroPayload};
pub use error::{StoreError, StoreResult};
pub use layout::{RecordLayout, VersionWidth};
pub use medium::{FileMedium, Medium, MediumStats, MemoryMedium};
pub use store::{InitOutcome, VersionedStore};

/// Default emulated EEPROM size: 1 KB
pub const EEPROM_SIZE: usize = 1024;
/// Value of an erased EEPROM/flash byte
pub const ERASED_BYTE: u8 = 0xFF;
/// Tag span of the base record layout (19 characters + NUL)
pub const TAG_SPAN: usize = 20;
/// Tag span of the extended record layout (20 characters + NUL)
pub const EXTENDED_TAG_SPAN: usize = 21;
