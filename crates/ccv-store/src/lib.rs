//! Ordered key-value store abstraction used by the provider keeper, plus an in-memory backend.
//!
//! Keys compare as unsigned byte strings. Prefix iteration yields entries in
//! ascending key order, which the spawn queue relies on for its time ordering.

mod mem_store;

pub use mem_store::MemStore;

use serde::{Serialize, de::DeserializeOwned};

pub type StoreResult<T> = Result<T, StoreError>;
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Iterator over the entries under a prefix, in ascending key order.
///
/// Backends release whatever the iterator holds when it is dropped.
pub type PrefixIter<'a> = Box<dyn Iterator<Item = StoreResult<KvPair>> + 'a>;

/// Trait implemented by every key-value backend.
///
/// Writes made while a [`PrefixIter`] is alive must not invalidate it.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;
    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;
    fn delete(&self, key: &[u8]) -> StoreResult<()>;
    fn prefix_iter(&self, prefix: &[u8]) -> StoreResult<PrefixIter<'_>>;

    fn has(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Typed helpers layered over raw bytes using canonical CBOR.
pub trait KvStoreExt: KvStore {
    fn put_value<T: Serialize>(&self, key: &[u8], value: &T) -> StoreResult<()> {
        let bytes = ccv_cbor::to_canonical_cbor(value)?;
        self.set(key, &bytes)
    }

    fn get_value<T: DeserializeOwned>(&self, key: &[u8]) -> StoreResult<Option<T>> {
        match self.get(key)? {
            Some(bytes) => Ok(Some(ccv_cbor::from_cbor_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl<S: KvStore + ?Sized> KvStoreExt for S {}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("CBOR serialization error: {0}")]
    Cbor(#[from] serde_cbor::Error),
    #[error("empty keys are not allowed")]
    EmptyKey,
}
