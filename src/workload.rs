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

//! The fixed sequence of timed map operations run once per hasher.
//!
//! A trial inserts `n` keys from each corpus, looks up all `2 * n` keys of
//! each corpus `k` times, erases every odd-valued entry while iterating,
//! repeats the lookups, and finally erases the inserted keys one by one.
//! Every phase prints one line through a [`Stopwatch`]:
//!
//! ```text
//! Consecutive lookup: 412 ms (s=1223283712, size=4000000)
//! ```
//!
//! The drivers are `#[inline(never)]` and every lookup phase reports a
//! checksum of the values it found, so the timed loops cannot be merged
//! with their neighbours or optimised away.

use std::{
    hint,
    io::{self, Write},
    time::Instant,
};

use crate::{corpus::Corpus, hash::StringHash, map::Cursor, FlatMap};

/// Keys inserted per corpus in the reference run.
pub const N: usize = 2_000_000;

/// Lookup passes per lookup phase in the reference run.
pub const K: usize = 10;

/// Workload dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Keys inserted from each corpus.
    pub n: usize,
    /// Passes over each corpus per lookup phase.
    pub k: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config { n: N, k: K }
    }
}

/// What a timed trial needs from the map under test.
///
/// Cursors model C++ iterators: `begin` to `end` by `advance`. Maps differ in
/// what erasing through a cursor gives back, which `ERASE_RETURNS_NEXT`
/// declares; see [`test_iteration`].
pub trait BenchMap: Default {
    type Cursor: Copy + PartialEq;

    /// Whether `erase_at` returns a cursor to the following entry.
    const ERASE_RETURNS_NEXT: bool;

    /// Inserts `key` unless it is already present.
    fn insert(&mut self, key: &str, value: u32);

    fn find(&self, key: &str) -> Option<u32>;

    fn erase(&mut self, key: &str);

    fn size(&self) -> usize;

    fn begin(&self) -> Self::Cursor;

    fn end(&self) -> Self::Cursor;

    fn advance(&self, at: Self::Cursor) -> Self::Cursor;

    fn value_at(&self, at: Self::Cursor) -> u32;

    /// Erases the entry at `at`. Returns the next cursor exactly when
    /// `ERASE_RETURNS_NEXT` is true.
    fn erase_at(&mut self, at: Self::Cursor) -> Option<Self::Cursor>;
}

impl<H: StringHash> BenchMap for FlatMap<String, u32, H> {
    type Cursor = Cursor;

    const ERASE_RETURNS_NEXT: bool = true;

    fn insert(&mut self, key: &str, value: u32) {
        self.insert_if_absent(key.to_owned(), value);
    }

    fn find(&self, key: &str) -> Option<u32> {
        self.get(key).copied()
    }

    fn erase(&mut self, key: &str) {
        self.remove(key);
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn begin(&self) -> Cursor {
        FlatMap::begin(self)
    }

    fn end(&self) -> Cursor {
        FlatMap::end(self)
    }

    fn advance(&self, at: Cursor) -> Cursor {
        FlatMap::advance(self, at)
    }

    fn value_at(&self, at: Cursor) -> u32 {
        self.entry_at(at).map_or(0, |(_, v)| *v)
    }

    fn erase_at(&mut self, at: Cursor) -> Option<Cursor> {
        Some(FlatMap::erase_at(self, at))
    }
}

/// Presents a map as one whose cursor erase returns nothing, so the driver
/// has to step past an entry before erasing it.
#[derive(Debug, Default)]
pub struct VoidErase<M>(pub M);

impl<M: BenchMap> BenchMap for VoidErase<M> {
    type Cursor = M::Cursor;

    const ERASE_RETURNS_NEXT: bool = false;

    fn insert(&mut self, key: &str, value: u32) {
        self.0.insert(key, value);
    }

    fn find(&self, key: &str) -> Option<u32> {
        self.0.find(key)
    }

    fn erase(&mut self, key: &str) {
        self.0.erase(key);
    }

    fn size(&self) -> usize {
        self.0.size()
    }

    fn begin(&self) -> M::Cursor {
        self.0.begin()
    }

    fn end(&self) -> M::Cursor {
        self.0.end()
    }

    fn advance(&self, at: M::Cursor) -> M::Cursor {
        self.0.advance(at)
    }

    fn value_at(&self, at: M::Cursor) -> u32 {
        self.0.value_at(at)
    }

    fn erase_at(&mut self, at: M::Cursor) -> Option<M::Cursor> {
        self.0.erase_at(at);

        None
    }
}

/// One timed phase as printed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phase {
    pub label: &'static str,
    pub elapsed_ms: u128,
    pub checksum: u32,
    pub size: usize,
}

/// Times consecutive phases against a running timestamp and prints each.
pub struct Stopwatch<'w, W: Write> {
    out: &'w mut W,
    last: Instant,
    phases: Vec<Phase>,
}

impl<'w, W: Write> Stopwatch<'w, W> {
    pub fn new(out: &'w mut W) -> Self {
        Self::starting_at(out, Instant::now())
    }

    pub fn starting_at(out: &'w mut W, start: Instant) -> Self {
        Stopwatch {
            out,
            last: start,
            phases: Vec::new(),
        }
    }

    /// Ends the current phase, prints it, and starts the next one.
    pub fn lap(&mut self, label: &'static str, checksum: u32, size: usize) -> io::Result<()> {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(self.last).as_millis();

        writeln!(
            self.out,
            "{}: {} ms (s={}, size={})",
            label, elapsed_ms, checksum, size
        )?;

        self.phases.push(Phase {
            label,
            elapsed_ms,
            checksum,
            size,
        });
        self.last = now;

        Ok(())
    }

    /// Separates groups of phases.
    pub fn blank_line(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn into_phases(self) -> Vec<Phase> {
        self.phases
    }

    pub fn out(&mut self) -> &mut W {
        self.out
    }
}

/// The corpus and pass count shared by every phase of a trial.
#[derive(Clone, Copy, Debug)]
pub struct Workload<'c> {
    corpus: &'c Corpus,
    k: usize,
}

impl<'c> Workload<'c> {
    pub fn new(corpus: &'c Corpus, k: usize) -> Self {
        Workload { corpus, k }
    }

    pub fn corpus(&self) -> &'c Corpus {
        self.corpus
    }

    pub fn n(&self) -> usize {
        self.corpus.n()
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

/// Inserts keys `1..=n` of each corpus with their index as the value.
#[inline(never)]
pub fn test_insert<M: BenchMap, W: Write>(
    map: &mut M,
    workload: &Workload<'_>,
    watch: &mut Stopwatch<'_, W>,
) -> io::Result<()> {
    let n = workload.n();

    for (i, key) in workload.corpus.consecutive()[1..=n].iter().enumerate() {
        map.insert(key, i as u32 + 1);
    }

    watch.lap("Consecutive insert", 0, map.size())?;

    for (i, key) in workload.corpus.random()[1..=n].iter().enumerate() {
        map.insert(key, i as u32 + 1);
    }

    watch.lap("Random insert", 0, map.size())?;

    watch.blank_line()
}

/// Looks up keys `1..=2n` of each corpus `k` times, half of them absent.
#[inline(never)]
pub fn test_lookup<M: BenchMap, W: Write>(
    map: &mut M,
    workload: &Workload<'_>,
    watch: &mut Stopwatch<'_, W>,
) -> io::Result<()> {
    let s = lookup_checksum(map, workload.corpus.consecutive(), workload.k);
    watch.lap("Consecutive lookup", s, map.size())?;

    let s = lookup_checksum(map, workload.corpus.random(), workload.k);
    watch.lap("Random lookup", s, map.size())?;

    watch.blank_line()
}

/// Walks the map once, erasing every entry with an odd value.
///
/// Maps whose cursor erase returns the next cursor continue from it; for the
/// others the cursor is advanced before the entry under it is erased.
#[inline(never)]
pub fn test_iteration<M: BenchMap, W: Write>(
    map: &mut M,
    _workload: &Workload<'_>,
    watch: &mut Stopwatch<'_, W>,
) -> io::Result<()> {
    let mut it = map.begin();

    while it != map.end() {
        if map.value_at(it) & 1 == 0 {
            it = map.advance(it);
        } else if M::ERASE_RETURNS_NEXT {
            it = match map.erase_at(it) {
                Some(next) => next,
                None => map.end(),
            };
        } else {
            let erased = it;
            it = map.advance(it);
            map.erase_at(erased);
        }
    }

    watch.lap("Iterate and erase odd elements", 0, map.size())?;

    watch.blank_line()
}

/// Erases keys `1..=n` of each corpus by key.
#[inline(never)]
pub fn test_erase<M: BenchMap, W: Write>(
    map: &mut M,
    workload: &Workload<'_>,
    watch: &mut Stopwatch<'_, W>,
) -> io::Result<()> {
    let n = workload.n();

    for key in &workload.corpus.consecutive()[1..=n] {
        map.erase(key);
    }

    watch.lap("Consecutive erase", 0, map.size())?;

    for key in &workload.corpus.random()[1..=n] {
        map.erase(key);
    }

    watch.lap("Random erase", 0, map.size())?;

    watch.blank_line()
}

fn lookup_checksum<M: BenchMap>(map: &M, keys: &[String], k: usize) -> u32 {
    let mut s: u32 = 0;

    for _ in 0..k {
        for key in &keys[1..] {
            if let Some(v) = map.find(hint::black_box(key.as_str())) {
                s = s.wrapping_add(v);
            }
        }
    }

    s
}
