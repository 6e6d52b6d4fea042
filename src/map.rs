// MIT License
//
// Copyright (c) 2019 Gregory Meyer
//
// Permission is hereby granted, free of charge, to any person
// obtaining a copy of this software and associated documentation files
// (the "Software"), to deal in the Software without restriction,
// including without limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of the Software,
// and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS
// BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN
// ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! A single-threaded open-addressed hash map with a pluggable string hash.

mod table;


use std::{borrow::Borrow, fmt, mem, slice};

use crate::hash::{AHash, StringHash};

use table::Table;

/// Default hasher for `FlatMap`.
///
/// This is [aHash] with its fixed default keys. aHash mixes every input bit
/// into every output bit, so `FlatMap` uses its output directly.
///
/// [aHash]: https://docs.rs/ahash
pub type DefaultHash = AHash;

const MIX_MULTIPLIER: u64 = 0x9E37_79B9_7F4A_7C15;

/// An open-addressed hash map keyed by byte strings.
///
/// Slots are grouped under SIMD-searchable control bytes and probed linearly
/// group by group. Removal leaves a tombstone unless the slot's group still
/// has an empty slot; tombstones are purged by the next rehash.
///
/// The hash function is a [`StringHash`] chosen per map type. Its result is
/// used as-is when [`StringHash::IS_AVALANCHING`] is true, and otherwise is
/// first scrambled by a multiply-xor finalizer, so weak hashes such as
/// polynomial ones still spread over all groups.
///
/// Keys may be any type viewable as bytes, most commonly `String`. Lookups
/// accept any borrowed form `Q` of the key type whose byte view and
/// equality agree with the key's, such as `&str` for `String` keys.
///
/// Cursors ([`begin`], [`advance`], [`erase_at`]) walk the map in bucket
/// order and stay valid across [`erase_at`], but any insertion may rehash
/// and invalidate them.
///
/// [`begin`]: #method.begin
/// [`advance`]: #method.advance
/// [`erase_at`]: #method.erase_at
pub struct FlatMap<K, V, H = DefaultHash> {
    table: Table<K, V>,
    hasher: H,
}

/// A position in a [`FlatMap`], either a live entry or the end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor(usize);

impl<K, V> FlatMap<K, V, DefaultHash> {
    /// Creates an empty `FlatMap`.
    ///
    /// No buckets are allocated until the first insertion.
    pub fn new() -> FlatMap<K, V, DefaultHash> {
        FlatMap::with_hasher(DefaultHash::default())
    }

    /// Creates an empty `FlatMap` that holds at least `capacity` elements
    /// without rehashing.
    pub fn with_capacity(capacity: usize) -> FlatMap<K, V, DefaultHash> {
        FlatMap::with_capacity_and_hasher(capacity, DefaultHash::default())
    }
}

impl<K, V, H> FlatMap<K, V, H> {
    pub fn with_hasher(hasher: H) -> FlatMap<K, V, H> {
        FlatMap {
            table: Table::new(),
            hasher,
        }
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: H) -> FlatMap<K, V, H> {
        FlatMap {
            table: Table::with_capacity(capacity),
            hasher,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of full or tombstoned slots this map can have
    /// before it rehashes.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Returns an iterator over every entry in bucket order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.table.buckets().iter(),
            remaining: self.table.len(),
        }
    }

    /// Removes every entry, keeping the allocated buckets.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns a cursor to the first entry, or [`end`](#method.end) if the
    /// map is empty.
    pub fn begin(&self) -> Cursor {
        Cursor(self.table.next_full(0))
    }

    /// Returns the past-the-end cursor.
    pub fn end(&self) -> Cursor {
        Cursor(self.table.num_buckets())
    }

    /// Returns a cursor to the entry after `at`.
    pub fn advance(&self, at: Cursor) -> Cursor {
        Cursor(self.table.next_full(at.0.saturating_add(1)))
    }

    /// Returns the entry at `at`, or `None` for the end cursor.
    pub fn entry_at(&self, at: Cursor) -> Option<(&K, &V)> {
        self.table.bucket(at.0).map(|(k, v)| (k, v))
    }

    /// Removes the entry at `at` and returns a cursor to the entry after it.
    ///
    /// Removal never moves other entries, so cursors to them stay valid.
    pub fn erase_at(&mut self, at: Cursor) -> Cursor {
        self.table.remove_at(at.0);

        self.advance(at)
    }

    /// Retains only the entries for which `f` returns `true`.
    pub fn retain<F: FnMut(&K, &mut V) -> bool>(&mut self, mut f: F) {
        let mut at = self.begin();

        while let Some((key, value)) = self.table.bucket_mut(at.0) {
            at = if f(key, value) {
                self.advance(at)
            } else {
                self.erase_at(at)
            };
        }
    }
}

impl<K: AsRef<[u8]> + Eq, V, H: StringHash> FlatMap<K, V, H> {
    /// Returns a reference to the value corresponding to `key`.
    pub fn get<Q: ?Sized + AsRef<[u8]> + Eq>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
    {
        let index = self.table.find(hash(&self.hasher, key), key)?;

        self.table.bucket(index).map(|(_, v)| v)
    }

    pub fn get_mut<Q: ?Sized + AsRef<[u8]> + Eq>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
    {
        let index = self.table.find(hash(&self.hasher, key), key)?;

        self.table.bucket_mut(index).map(|(_, v)| v)
    }

    pub fn contains_key<Q: ?Sized + AsRef<[u8]> + Eq>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
    {
        self.table.find(hash(&self.hasher, key), key).is_some()
    }

    /// Returns a cursor to the entry for `key`, or [`end`](#method.end).
    pub fn find<Q: ?Sized + AsRef<[u8]> + Eq>(&self, key: &Q) -> Cursor
    where
        K: Borrow<Q>,
    {
        match self.table.find(hash(&self.hasher, key), key) {
            Some(index) => Cursor(index),
            None => self.end(),
        }
    }

    /// Inserts a key-value pair, returning the previous value for `key` if
    /// there was one.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = hash(&self.hasher, &key);

        if let Some(index) = self.table.find(hash, &key) {
            return self
                .table
                .bucket_mut(index)
                .map(|(_, v)| mem::replace(v, value));
        }

        self.insert_new(hash, key, value);

        None
    }

    /// Inserts a key-value pair only if `key` is not already present.
    ///
    /// Returns `true` if the pair was inserted. An existing value is left
    /// untouched.
    pub fn insert_if_absent(&mut self, key: K, value: V) -> bool {
        let hash = hash(&self.hasher, &key);

        if self.table.find(hash, &key).is_some() {
            return false;
        }

        self.insert_new(hash, key, value);

        true
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove<Q: ?Sized + AsRef<[u8]> + Eq>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
    {
        let index = self.table.find(hash(&self.hasher, key), key)?;

        self.table.remove_at(index).map(|(_, v)| v)
    }

    fn insert_new(&mut self, hash: u64, key: K, value: V) {
        let mut pair = (key, value);

        loop {
            match self.table.try_insert_new(hash, pair.0, pair.1) {
                Ok(_) => return,
                Err(returned) => {
                    pair = returned;
                    self.rehash_for_insert();
                }
            }
        }
    }

    /// Doubles the table once it is more than half full of live entries;
    /// otherwise rebuilds it at the same size to reclaim tombstones.
    fn rehash_for_insert(&mut self) {
        let num_groups = self.table.num_groups();

        let length = if self.table.len() + 1 > self.table.capacity() / 2 {
            (num_groups * 2).max(1)
        } else {
            num_groups
        };

        let hasher = &self.hasher;
        self.table.rehash(length, |key| hash(hasher, key));
    }
}

impl<K, V, H: Default> Default for FlatMap<K, V, H> {
    fn default() -> Self {
        FlatMap::with_hasher(H::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, H> fmt::Debug for FlatMap<K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: AsRef<[u8]> + Eq, V, H: StringHash> Extend<(K, V)> for FlatMap<K, V, H> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: AsRef<[u8]> + Eq, V, H: StringHash> FromIterator<(K, V)> for FlatMap<K, V, H> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FlatMap::default();
        map.extend(iter);

        map
    }
}

impl<'a, K, V, H> IntoIterator for &'a FlatMap<K, V, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// An iterator over the entries of a [`FlatMap`].
pub struct Iter<'a, K, V> {
    buckets: slice::Iter<'a, Option<(K, V)>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let (key, value) = self.buckets.by_ref().find_map(Option::as_ref)?;
        self.remaining -= 1;

        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Hashes `key` and finalizes the result unless `H` avalanches.
fn hash<H: StringHash, Q: ?Sized + AsRef<[u8]>>(hasher: &H, key: &Q) -> u64 {
    let word = hasher.hash_bytes(key.as_ref()) as u64;

    if H::IS_AVALANCHING {
        word
    } else {
        mix(word)
    }
}

fn mix(word: u64) -> u64 {
    let product = u128::from(word) * u128::from(MIX_MULTIPLIER);

    (product as u64) ^ ((product >> 64) as u64)
}
