//! The live set.

use std::collections::hash_set;
use std::collections::HashSet;

use hoard_types::Key;

/// Keys that must survive a collection pass.
///
/// Membership is by [`Key`] alone: two cids with different codecs but the
/// same digest name the same stored block, so marking one keeps both.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiveSet {
    keys: HashSet<Key>,
}

impl LiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` live. Returns `true` if it was not already marked.
    pub fn insert(&mut self, key: Key) -> bool {
        self.keys.insert(key)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, Key> {
        self.keys.iter()
    }
}

impl FromIterator<Key> for LiveSet {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl Extend<Key> for LiveSet {
    fn extend<I: IntoIterator<Item = Key>>(&mut self, iter: I) {
        self.keys.extend(iter);
    }
}

impl<'a> IntoIterator for &'a LiveSet {
    type Item = &'a Key;
    type IntoIter = hash_set::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
