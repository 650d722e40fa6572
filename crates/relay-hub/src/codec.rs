//! Message codec
//!
//! Converts application-level message values to and from their wire
//! representation. Codecs are stateless and know nothing about connection
//! identity.

use crate::error::CodecError;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// Encodes and decodes one application message per frame.
///
/// Implementations must be total with respect to well-formed wire bytes
/// produced by their own `encode`: `decode(encode(v))` yields a value equal
/// to `v` for every representable `v`.
pub trait Codec: Send + Sync + 'static {
    /// The application message type.
    type Item: Send + 'static;

    /// Encode a message into wire bytes.
    fn encode(&self, item: &Self::Item) -> Result<Bytes, CodecError>;

    /// Decode one complete frame payload into a message.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Item, CodecError>;
}

/// Default codec: one self-describing JSON document per frame.
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    /// Create a new JSON codec for `T`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Codec for JsonCodec<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    type Item = T;

    fn encode(&self, item: &T) -> Result<Bytes, CodecError> {
        serde_json::to_vec(item)
            .map(Bytes::from)
            .map_err(CodecError::encode)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(CodecError::decode)
    }
}

impl<T> std::fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonCodec").finish()
    }
}
