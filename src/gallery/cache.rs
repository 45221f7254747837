//! Position-keyed picture cache with explicit in-flight marking

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::request::{LoadError, LoadResult};
use super::types::Picture;

/// What the cache knows about one position
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    /// Never requested
    Absent,
    /// Load requested, not complete
    Pending,
    /// Loaded successfully
    Ready(Arc<Picture>),
    /// Load finished with an error; not retried
    Failed(LoadError),
}

impl Entry {
    /// True once the load has finished, successfully or not
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Ready(_) | Self::Failed(_))
    }

    #[must_use]
    pub fn picture(&self) -> Option<&Arc<Picture>> {
        match self {
            Self::Ready(picture) => Some(picture),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
enum Slot {
    Pending,
    Ready(Arc<Picture>),
    Failed(LoadError),
}

/// Cache of loaded pictures keyed by position.
///
/// Entries are never evicted; the map grows with every position that was
/// ever inside the prefetch window.
#[derive(Debug, Default)]
pub struct ImageCache {
    slots: HashMap<usize, Slot>,
}

impl ImageCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, pos: usize) -> Entry {
        match self.slots.get(&pos) {
            None => Entry::Absent,
            Some(Slot::Pending) => Entry::Pending,
            Some(Slot::Ready(picture)) => Entry::Ready(picture.clone()),
            Some(Slot::Failed(err)) => Entry::Failed(err.clone()),
        }
    }

    /// Mark `pos` as in flight. Returns false (and changes nothing) if the
    /// position already has any entry.
    pub fn mark_pending(&mut self, pos: usize) -> bool {
        if self.slots.contains_key(&pos) {
            return false;
        }
        self.slots.insert(pos, Slot::Pending);
        true
    }

    /// Store a finished load, overwriting whatever was there
    pub fn put(&mut self, pos: usize, result: LoadResult) {
        let slot = match result {
            Ok(picture) => Slot::Ready(Arc::new(picture)),
            Err(err) => Slot::Failed(err),
        };
        self.slots.insert(pos, slot);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, Slot::Pending))
            .count()
    }

    #[must_use]
    pub fn ready_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }
}

/// Cache handle shared between the control thread and load workers
#[derive(Clone, Debug, Default)]
pub struct SharedCache {
    inner: Arc<Mutex<ImageCache>>,
}

impl SharedCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the cache, recovering from a poisoned lock
    pub fn lock(&self) -> MutexGuard<'_, ImageCache> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn get(&self, pos: usize) -> Entry {
        self.lock().get(pos)
    }

    pub fn mark_pending(&self, pos: usize) -> bool {
        self.lock().mark_pending(pos)
    }

    pub fn put(&self, pos: usize, result: LoadResult) {
        self.lock().put(pos, result);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn failure(pos: usize) -> LoadError {
        LoadError::Decode {
            path: PathBuf::from(format!("{pos}.jpg")),
            detail: "truncated".to_string(),
        }
    }

    #[test]
    fn unknown_position_is_absent() {
        let cache = ImageCache::new();
        assert_eq!(cache.get(7), Entry::Absent);
        assert!(cache.is_empty());
    }

    #[test]
    fn mark_pending_only_from_absent() {
        let mut cache = ImageCache::new();
        assert!(cache.mark_pending(1));
        assert!(!cache.mark_pending(1));
        assert_eq!(cache.get(1), Entry::Pending);
        assert_eq!(cache.pending_count(), 1);
    }

    #[test]
    fn mark_pending_never_overwrites_ready() {
        let mut cache = ImageCache::new();
        cache.mark_pending(2);
        cache.put(2, Ok(Picture::solid(2, 2, [9, 9, 9])));
        assert!(!cache.mark_pending(2));
        assert!(matches!(cache.get(2), Entry::Ready(_)));
    }

    #[test]
    fn mark_pending_never_overwrites_failed() {
        let mut cache = ImageCache::new();
        cache.mark_pending(4);
        cache.put(4, Err(failure(4)));
        assert!(!cache.mark_pending(4));
        assert_eq!(cache.get(4), Entry::Failed(failure(4)));
    }

    #[test]
    fn put_transitions_pending_to_ready() {
        let mut cache = ImageCache::new();
        cache.mark_pending(3);
        let picture = Picture::solid(4, 2, [1, 2, 3]);
        cache.put(3, Ok(picture.clone()));

        let entry = cache.get(3);
        assert!(entry.is_settled());
        assert_eq!(entry.picture().map(|p| p.as_ref()), Some(&picture));
        assert_eq!(cache.pending_count(), 0);
        assert_eq!(cache.ready_count(), 1);
    }

    #[test]
    fn put_without_pending_is_accepted() {
        let mut cache = ImageCache::new();
        cache.put(0, Ok(Picture::solid(1, 1, [0, 0, 0])));
        assert!(matches!(cache.get(0), Entry::Ready(_)));
    }

    #[test]
    fn repeated_put_overwrites() {
        let mut cache = ImageCache::new();
        cache.put(5, Err(failure(5)));
        cache.put(5, Ok(Picture::solid(1, 1, [7, 7, 7])));
        let entry = cache.get(5);
        assert_eq!(entry.picture().map(|p| p.pixel(0, 0)), Some([7, 7, 7]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn shared_cache_accepts_writes_from_other_threads() {
        let cache = SharedCache::new();
        for pos in 0..8 {
            cache.mark_pending(pos);
        }

        let handles: Vec<_> = (0..8)
            .map(|pos| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    cache.put(pos, Ok(Picture::solid(1, 1, [pos as u8, 0, 0])));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let guard = cache.lock();
        assert_eq!(guard.ready_count(), 8);
        for pos in 0..8 {
            assert_eq!(
                guard.get(pos).picture().map(|p| p.pixel(0, 0)),
                Some([pos as u8, 0, 0])
            );
        }
    }
}
