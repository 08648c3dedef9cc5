use crate::{KvPair, KvStore, PrefixIter, StoreError, StoreResult};
use std::{
    collections::BTreeMap,
    ops::Bound,
    sync::{
        Arc, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
};

type Entries = RwLock<BTreeMap<Vec<u8>, Vec<u8>>>;

/// In-memory ordered store backed by a shared `BTreeMap`.
///
/// Clones share the same entries.
#[derive(Clone, Default)]
pub struct MemStore {
    entries: Arc<Entries>,
    open_iterators: Arc<AtomicUsize>,
}

impl std::fmt::Debug for MemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemStore")
            .field("entries", &self.entries.read().unwrap().len())
            .field("open_iterators", &self.open_iterators())
            .finish()
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of prefix iterators that have not been dropped yet.
    pub fn open_iterators(&self) -> usize {
        self.open_iterators.load(Ordering::SeqCst)
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        self.entries
            .write()
            .unwrap()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }

    fn prefix_iter(&self, prefix: &[u8]) -> StoreResult<PrefixIter<'_>> {
        self.open_iterators.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemPrefixIter {
            entries: &self.entries,
            open_iterators: &self.open_iterators,
            prefix: prefix.to_vec(),
            cursor: None,
            exhausted: false,
        }))
    }
}

/// Cursor over a key prefix. The read lock is taken per step, never held
/// between calls to `next`, so callers may write while iterating.
struct MemPrefixIter<'a> {
    entries: &'a Entries,
    open_iterators: &'a AtomicUsize,
    prefix: Vec<u8>,
    cursor: Option<Vec<u8>>,
    exhausted: bool,
}

impl Iterator for MemPrefixIter<'_> {
    type Item = StoreResult<KvPair>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let lower = match self.cursor.take() {
            Some(last) => Bound::Excluded(last),
            None => Bound::Included(self.prefix.clone()),
        };
        let guard = self.entries.read().unwrap();
        let next = guard
            .range((lower, Bound::Unbounded))
            .next()
            .filter(|(key, _)| key.starts_with(&self.prefix))
            .map(|(key, value)| (key.clone(), value.clone()));
        drop(guard);
        match next {
            Some((key, value)) => {
                self.cursor = Some(key.clone());
                Some(Ok((key, value)))
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }
}

impl Drop for MemPrefixIter<'_> {
    fn drop(&mut self) {
        self.open_iterators.fetch_sub(1, Ordering::SeqCst);
    }
}
