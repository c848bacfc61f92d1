#![forbid(unsafe_code)]

//! Side table attaching values to screens by identity.
//!
//! Hosts own their screens; the navigation layer cannot add fields to them.
//! A [`ScreenTable`] keeps per-screen data outside the screen, keyed by
//! [`ScreenId`]. The owner prunes it against the live stack so entries do not
//! outlive the screens they describe.
//!
//! # Invariants
//!
//! 1. At most one value per screen; `insert` overwrites.
//! 2. After `retain_live(ids)`, every remaining key is in `ids`.

use ahash::AHashMap;

use crate::screen::ScreenId;

/// Values keyed by screen identity.
#[derive(Debug, Clone)]
pub struct ScreenTable<V> {
    entries: AHashMap<ScreenId, V>,
}

impl<V> Default for ScreenTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ScreenTable<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }

    /// Attach `value` to `screen`, returning the previous value.
    pub fn insert(&mut self, screen: ScreenId, value: V) -> Option<V> {
        self.entries.insert(screen, value)
    }

    #[must_use]
    pub fn get(&self, screen: ScreenId) -> Option<&V> {
        self.entries.get(&screen)
    }

    pub fn remove(&mut self, screen: ScreenId) -> Option<V> {
        self.entries.remove(&screen)
    }

    #[must_use]
    pub fn contains(&self, screen: ScreenId) -> bool {
        self.entries.contains_key(&screen)
    }

    /// Drop entries for screens not in `live`.
    pub fn retain_live(&mut self, live: impl IntoIterator<Item = ScreenId>) {
        let live: ahash::AHashSet<ScreenId> = live.into_iter().collect();
        self.entries.retain(|id, _| live.contains(id));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_overwrites() {
        let mut table = ScreenTable::new();
        let id = ScreenId::next();
        assert_eq!(table.insert(id, 1), None);
        assert_eq!(table.insert(id, 2), Some(1));
        assert_eq!(table.get(id), Some(&2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn retain_live_prunes_dead_screens() {
        let mut table = ScreenTable::new();
        let (a, b, c) = (ScreenId::next(), ScreenId::next(), ScreenId::next());
        table.insert(a, "a");
        table.insert(b, "b");
        table.insert(c, "c");

        table.retain_live([a, c]);
        assert!(table.contains(a));
        assert!(!table.contains(b));
        assert!(table.contains(c));
    }

    #[test]
    fn remove_and_clear() {
        let mut table = ScreenTable::new();
        let id = ScreenId::next();
        table.insert(id, ());
        assert_eq!(table.remove(id), Some(()));
        assert!(table.is_empty());
        table.insert(id, ());
        table.clear();
        assert!(table.is_empty());
    }
}
