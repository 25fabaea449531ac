//! Payload default initialization.
//!
//! A reset always rewrites the version and tag; what happens to the payload
//! is decided by the [`Defaults`] capability the store was built with.

use serde::Serialize;

use crate::error::StoreResult;
use crate::payload;

/// Fills the payload span of a record being reset to defaults.
pub trait Defaults {
    fn fill_payload(&mut self, payload: &mut [u8]) -> StoreResult<()>;
}

/// Leave payload bytes as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepPayload;

impl Defaults for KeepPayload {
    fn fill_payload(&mut self, _payload: &mut [u8]) -> StoreResult<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroPayload;

impl Defaults for ZeroPayload {
    fn fill_payload(&mut self, payload: &mut [u8]) -> StoreResult<()> {
        payload.fill(0);
        Ok(())
    }
}

/// Encode a default value into the payload with [`payload::encode_into`].
/// Bytes past the encoded value are zeroed.
#[derive(Debug, Clone, Default)]
pub struct SerdeDefaults<T>(pub T);

impl<T: Serialize> Defaults for SerdeDefaults<T> {
    fn fill_payload(&mut self, span: &mut [u8]) -> StoreResult<()> {
        let used = payload::encode_into(&self.0, span)?;
        span[used..].fill(0);
        Ok(())
    }
}

impl<F: FnMut(&mut [u8])> Defaults for F {
    fn fill_payload(&mut self, payload: &mut [u8]) -> StoreResult<()> {
        self(payload);
        Ok(())
    }
}
