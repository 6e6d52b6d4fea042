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

//! Deterministic string key corpora shared by every trial.
//!
//! Two corpora of `2 * n + 1` keys are built: one of structurally similar
//! keys that differ only in a short decimal field, and one of keys derived
//! from a fixed-seed splitmix64 stream. Index 0 of both holds the same
//! sentinel key and is never inserted.

use std::{collections::TryReserveError, error::Error, fmt};

/// A splitmix64 generator starting from the all-zero state.
///
/// Every instance produces the same sequence, which is what makes the random
/// corpus reproducible across runs.
#[derive(Clone, Debug, Default)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: u64) -> Self {
        Self { state }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);

        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);

        z ^ (z >> 31)
    }
}

impl Iterator for SplitMix64 {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        Some(self.next_u64())
    }
}

/// Formats the `i`th consecutive key, `pfx_<i>_sfx`.
pub fn make_index(i: u32) -> String {
    format!("pfx_{}_sfx", i)
}

/// Formats a random key from a 32-bit draw `x`.
///
/// The zero-padded field is `x % 8 + 1` characters wide, so key lengths vary
/// along with their contents.
pub fn make_random_index(x: u32) -> String {
    let width = (x % 8 + 1) as usize;

    format!("pfx_{:0width$}_{}_sfx", 0, x, width = width)
}

/// The pair of immutable key corpora.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Corpus {
    consecutive: Vec<String>,
    random: Vec<String>,
}

impl Corpus {
    /// Builds both corpora with `n` live keys per insert phase.
    ///
    /// Each vector holds `2 * n + 1` keys: the sentinel at index 0, keys
    /// `1..=n` that the workload inserts, and keys `n + 1..=2 * n` that are
    /// only ever probed.
    pub fn build(n: usize) -> Result<Corpus, CorpusError> {
        let len = n
            .checked_mul(2)
            .and_then(|l| l.checked_add(1))
            .ok_or(CorpusError::TooLarge { n })?;

        let mut consecutive = Vec::new();
        consecutive
            .try_reserve_exact(len)
            .map_err(|source| CorpusError::Reserve {
                corpus: "consecutive",
                len,
                source,
            })?;

        consecutive.push(make_index(0));
        consecutive.extend((1..len).map(|i| make_index(i as u32)));

        let mut random = Vec::new();
        random
            .try_reserve_exact(len)
            .map_err(|source| CorpusError::Reserve {
                corpus: "random",
                len,
                source,
            })?;

        random.push(make_index(0));
        random.extend(
            SplitMix64::new()
                .take(len - 1)
                .map(|r| make_random_index(r as u32)),
        );

        Ok(Corpus {
            consecutive,
            random,
        })
    }

    /// The number of keys each insert phase inserts.
    pub fn n(&self) -> usize {
        self.consecutive.len() / 2
    }

    pub fn consecutive(&self) -> &[String] {
        &self.consecutive
    }

    pub fn random(&self) -> &[String] {
        &self.random
    }
}

/// The reason a corpus could not be built.
#[derive(Debug)]
pub enum CorpusError {
    /// `2 * n + 1` does not fit in a `usize`.
    TooLarge { n: usize },
    /// Reserving storage for one of the corpora failed.
    Reserve {
        corpus: &'static str,
        len: usize,
        source: TryReserveError,
    },
}

impl fmt::Display for CorpusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusError::TooLarge { n } => {
                write!(f, "corpus size overflows: n = {}", n)
            }
            CorpusError::Reserve { corpus, len, .. } => {
                write!(f, "could not allocate {} corpus of {} keys", corpus, len)
            }
        }
    }
}

impl Error for CorpusError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CorpusError::TooLarge { .. } => None,
            CorpusError::Reserve { source, .. } => Some(source),
        }
    }
}
