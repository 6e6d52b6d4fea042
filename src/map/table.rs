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

#[cfg(all(
    target_feature = "sse2",
    any(target_arch = "x86", target_arch = "x86_64")
))]
#[path = "table/arch/sse2.rs"]
mod arch;

#[cfg(not(all(
    target_feature = "sse2",
    any(target_arch = "x86", target_arch = "x86_64")
)))]
#[path = "table/arch/generic.rs"]
mod arch;

use std::{borrow::Borrow, mem};

use arch::{ControlByteGroup, Searcher, BUCKETS_PER_GROUP};

const EMPTY_CONTROL_BYTE: u8 = 0;
const TOMBSTONE_CONTROL_BYTE: u8 = 0b0111_1111;

const MAX_LOAD_FACTOR: f64 = 0.875;

/// Open-addressed storage: groups of control bytes over a parallel array of
/// buckets.
///
/// A control byte is [`EMPTY_CONTROL_BYTE`], [`TOMBSTONE_CONTROL_BYTE`], or
/// the low seven bits of the hash with the high bit set. The slot of a full
/// control byte always holds `Some`.
pub(crate) struct Table<K, V> {
    control_bytes: Box<[ControlByteGroup]>,
    buckets: Box<[Option<(K, V)>]>,
    modulo_mask: usize,
    len: usize,
    num_non_empty: usize,
}

impl<K, V> Table<K, V> {
    pub(crate) fn new() -> Self {
        Self::with_length(0)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            return Self::new();
        }

        let num_buckets = (capacity as f64 / MAX_LOAD_FACTOR).ceil() as usize;

        let length = if num_buckets % BUCKETS_PER_GROUP != 0 {
            num_buckets / BUCKETS_PER_GROUP + 1
        } else {
            num_buckets / BUCKETS_PER_GROUP
        }
        .next_power_of_two();

        Self::with_length(length)
    }

    fn with_length(length: usize) -> Self {
        assert!(length == 0 || length.is_power_of_two());

        let num_buckets = length * BUCKETS_PER_GROUP;
        let mut buckets = Vec::with_capacity(num_buckets);
        buckets.resize_with(num_buckets, || None);

        Self {
            control_bytes: vec![ControlByteGroup::default(); length].into_boxed_slice(),
            buckets: buckets.into_boxed_slice(),
            modulo_mask: length.saturating_sub(1),
            len: 0,
            num_non_empty: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn num_groups(&self) -> usize {
        self.control_bytes.len()
    }

    pub(crate) fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// The number of full or tombstoned slots allowed before a rehash.
    pub(crate) fn capacity(&self) -> usize {
        (self.buckets.len() as f64 * MAX_LOAD_FACTOR).floor() as usize
    }

    #[cfg(test)]
    pub(crate) fn num_tombstones(&self) -> usize {
        self.num_non_empty - self.len
    }

    pub(crate) fn buckets(&self) -> &[Option<(K, V)>] {
        &self.buckets
    }

    pub(crate) fn bucket(&self, index: usize) -> Option<&(K, V)> {
        self.buckets.get(index).and_then(Option::as_ref)
    }

    pub(crate) fn bucket_mut(&mut self, index: usize) -> Option<&mut (K, V)> {
        self.buckets.get_mut(index).and_then(Option::as_mut)
    }

    /// The index of the first full slot at or after `from`, or the number of
    /// buckets if there is none.
    pub(crate) fn next_full(&self, from: usize) -> usize {
        if from >= self.buckets.len() {
            return self.buckets.len();
        }

        self.buckets[from..]
            .iter()
            .position(Option::is_some)
            .map_or(self.buckets.len(), |offset| from + offset)
    }

    pub(crate) fn find<Q: ?Sized + Eq>(&self, hash: u64, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
    {
        self.probe_loop(hash, |index| match &self.buckets[index] {
            Some((this_key, _)) if this_key.borrow() == key => ProbeLoopAction::Return(index),
            _ => ProbeLoopAction::Continue,
        })
        .returned()
    }

    /// Inserts a key that is known to be absent.
    ///
    /// Hands the pair back if there is no room for it without a rehash.
    pub(crate) fn try_insert_new(
        &mut self,
        hash: u64,
        key: K,
        value: V,
    ) -> Result<usize, (K, V)> {
        let index = match self.find_vacant(hash) {
            Some(i) => i,
            None => return Err((key, value)),
        };

        let was_empty = self.control_byte(index) == EMPTY_CONTROL_BYTE;

        if was_empty && self.num_non_empty + 1 > self.capacity() {
            return Err((key, value));
        }

        let (hash_control_byte, _) = split_hash(hash);

        self.set_control_byte(index, hash_control_byte);
        self.buckets[index] = Some((key, value));
        self.len += 1;

        if was_empty {
            self.num_non_empty += 1;
        }

        Ok(index)
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Option<(K, V)> {
        let pair = self.buckets.get_mut(index)?.take()?;

        // a group that still has an empty slot never ended a probe sequence
        // that continued past it
        let control_byte = if self.control_bytes[index / BUCKETS_PER_GROUP].has_empty() {
            self.num_non_empty -= 1;

            EMPTY_CONTROL_BYTE
        } else {
            TOMBSTONE_CONTROL_BYTE
        };

        self.set_control_byte(index, control_byte);
        self.len -= 1;

        Some(pair)
    }

    /// Moves every entry into a fresh table of `length` groups, dropping all
    /// tombstones.
    pub(crate) fn rehash<F: Fn(&K) -> u64>(&mut self, length: usize, hash_of: F) {
        let old = mem::replace(self, Self::with_length(length));
        assert!(old.len <= self.capacity());

        for (key, value) in old.buckets.into_vec().into_iter().flatten() {
            let hash = hash_of(&key);
            self.insert_for_grow(hash, key, value);
        }
    }

    pub(crate) fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            *bucket = None;
        }

        for group in self.control_bytes.iter_mut() {
            *group = ControlByteGroup::default();
        }

        self.len = 0;
        self.num_non_empty = 0;
    }

    fn insert_for_grow(&mut self, hash: u64, key: K, value: V) {
        let index = match self.find_vacant(hash) {
            Some(i) => i,
            None => unreachable!("rehash target has no vacant slot"),
        };

        let (hash_control_byte, _) = split_hash(hash);

        self.set_control_byte(index, hash_control_byte);
        self.buckets[index] = Some((key, value));
        self.len += 1;
        self.num_non_empty += 1;
    }

    fn find_vacant(&self, hash: u64) -> Option<usize> {
        let (_, without_control) = split_hash(hash);
        let initial_group_index = without_control & self.modulo_mask;

        self.group_indices(initial_group_index).find_map(|group_index| {
            match self.control_bytes[group_index].vacant_move_mask() {
                0 => None,
                mask => {
                    Some(group_index * BUCKETS_PER_GROUP + mask.trailing_zeros() as usize)
                }
            }
        })
    }

    fn probe_loop<F: FnMut(usize) -> ProbeLoopAction<T>, T>(
        &self,
        hash: u64,
        mut f: F,
    ) -> ProbeLoopResult<T> {
        let (hash_control_byte, without_control) = split_hash(hash);
        let initial_group_index = without_control & self.modulo_mask;

        let searcher = Searcher::new(hash_control_byte);

        for group_index in self.group_indices(initial_group_index) {
            let (empty_move_mask, mut query_move_mask) =
                searcher.search(self.control_bytes[group_index].load());

            while query_move_mask != 0 {
                let group_offset = query_move_mask.trailing_zeros() as usize;
                query_move_mask &= query_move_mask - 1;

                if let ProbeLoopAction::Return(t) =
                    f(group_index * BUCKETS_PER_GROUP + group_offset)
                {
                    return ProbeLoopResult::Returned(t);
                }
            }

            if empty_move_mask != 0 {
                return ProbeLoopResult::FoundEmpty;
            }
        }

        ProbeLoopResult::LoopEnded
    }

    fn group_indices(&self, initial_group_index: usize) -> impl Iterator<Item = usize> {
        let modulo_mask = self.modulo_mask;

        (0..self.control_bytes.len())
            .map(move |i| i.wrapping_add(initial_group_index) & modulo_mask)
    }

    fn control_byte(&self, index: usize) -> u8 {
        self.control_bytes[index / BUCKETS_PER_GROUP].get(index % BUCKETS_PER_GROUP)
    }

    fn set_control_byte(&mut self, index: usize, value: u8) {
        self.control_bytes[index / BUCKETS_PER_GROUP].set(index % BUCKETS_PER_GROUP, value);
    }
}

enum ProbeLoopAction<T> {
    Continue,
    Return(T),
}

enum ProbeLoopResult<T> {
    LoopEnded,
    FoundEmpty,
    Returned(T),
}

impl<T> ProbeLoopResult<T> {
    fn returned(self) -> Option<T> {
        match self {
            Self::Returned(t) => Some(t),
            Self::LoopEnded | Self::FoundEmpty => None,
        }
    }
}

fn split_hash(hash: u64) -> (u8, usize) {
    (
        (hash & 0b0111_1111) as u8 | 0b1000_0000,
        (hash >> 7) as usize,
    )
}
