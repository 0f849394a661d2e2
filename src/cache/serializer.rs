//! Serializer Module
//!
//! Pluggable encoding used by the store to turn values into bytes for size
//! accounting and storage.
//!
//! Round-tripping through a serializer only preserves what the format can
//! express: a JSON round trip turns a `HashMap` and a struct with the same
//! fields into the same bytes, and decoding picks whatever type the caller
//! asks for.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CacheError, Result};

// == Serializer Strategy ==
/// Encodes and decodes cached values.
pub trait CacheSerializer: Send + Sync + 'static {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

// == JSON Serializer ==
/// Default serializer backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl CacheSerializer for JsonSerializer {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(CacheError::from)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(CacheError::from)
    }
}
