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

//! A micro-benchmark of string hash functions driving an open-addressed map.
//!
//! Every hasher in [`hash`] is plugged into a [`FlatMap`] and timed over the
//! same fixed workload: bulk insertion of two deterministic key corpora,
//! positive and negative lookups, erasing every odd-valued entry while
//! iterating, the lookups again, and erasure by key. [`report::run_all`] runs
//! one trial per hasher and [`report::TrialLog`] prints the comparison.
//!
//! Hashers implement [`StringHash`]. Those that declare
//! [`StringHash::IS_AVALANCHING`] have their output used as-is by the map;
//! the rest go through a multiply-xor finalizer first.

pub mod corpus;
pub mod hash;
pub mod map;
pub mod report;
pub mod workload;

#[cfg(test)]
mod proptests;

pub use corpus::{Corpus, CorpusError};
pub use hash::StringHash;
pub use map::FlatMap;
pub use report::{TrialLog, TrialRecord};
pub use workload::{BenchMap, Config, VoidErase, Workload};
