//! The boundary between in-memory elements and the bytes written to a run file.

use std::sync::Arc;

/// A shared, cheaply-cloneable comparator: `less(a, b)` is `true` when `a` sorts before `b`.
///
/// `E` is never required to implement [`Ord`] itself; the whole ordering lives in this closure,
/// which is expected to be a strict weak ordering (irreflexive, transitive, and with transitive
/// incomparability) -- the same contract a `Comparator` has in any merge sort.
pub type LessFn<E> = Arc<dyn Fn(&E, &E) -> bool + Send + Sync>;

/// Encodes elements to bytes when writing a run, and decodes them back when reading one.
///
/// A `Codec` is cloned freely across worker, writer and reader threads; cloning is an `Arc`
/// bump, not a deep copy of the callbacks.
pub struct Codec<E> {
    encode: Arc<dyn Fn(&E) -> Vec<u8> + Send + Sync>,
    decode: Arc<dyn Fn(&[u8]) -> Result<E, anyhow::Error> + Send + Sync>,
}

impl<E> Codec<E> {
    /// Builds a codec from a pair of callbacks. `decode` should reject malformed payloads with an
    /// error rather than panicking; such a failure surfaces to the caller as
    /// [`crate::error::Error::InputError`].
    pub fn new(
        encode: impl Fn(&E) -> Vec<u8> + Send + Sync + 'static,
        decode: impl Fn(&[u8]) -> Result<E, anyhow::Error> + Send + Sync + 'static,
    ) -> Self {
        Self { encode: Arc::new(encode), decode: Arc::new(decode) }
    }

    pub(crate) fn encode(&self, item: &E) -> Vec<u8> {
        (self.encode)(item)
    }

    pub(crate) fn decode(&self, bytes: &[u8]) -> Result<E, anyhow::Error> {
        (self.decode)(bytes)
    }
}

impl<E> Clone for Codec<E> {
    fn clone(&self) -> Self {
        Self { encode: self.encode.clone(), decode: self.decode.clone() }
    }
}
