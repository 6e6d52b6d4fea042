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

//! Runs one trial per hasher and prints the comparative summary.

use std::{
    io::{self, Write},
    time::Instant,
};

use crate::{
    hash::{AHash, Fnv1a, Mul31, Mul31x4, Mul31x8, StdHash},
    workload::{self, BenchMap, Phase, Stopwatch, Workload},
    FlatMap,
};

#[cfg(feature = "fxhash")]
use crate::hash::FxHash;
#[cfg(feature = "xxhash")]
use crate::hash::{Xxh3, Xxh64};

/// The outcome of one full pass of the workload for a single hasher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrialRecord {
    pub label: &'static str,
    pub elapsed_ms: u128,
    pub phases: Vec<Phase>,
}

/// Trial records in the order the trials ran.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrialLog {
    records: Vec<TrialRecord>,
}

impl TrialLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TrialRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Prints the separator and one right-aligned row per trial.
    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "---\n\n")?;

        for record in &self.records {
            writeln!(out, "{}", summary_row(record.label, record.elapsed_ms))?;
        }

        Ok(())
    }
}

/// Formats a summary row: `"<label>: "` right-aligned in 22 columns, then
/// the time right-aligned in 5.
pub fn summary_row(label: &str, elapsed_ms: u128) -> String {
    format!("{:>22}{:>5} ms", format!("{}: ", label), elapsed_ms)
}

/// Runs the whole workload against a fresh `M` and prints its section.
pub fn run_trial<M: BenchMap, W: Write>(
    label: &'static str,
    workload: &Workload<'_>,
    out: &mut W,
) -> io::Result<TrialRecord> {
    write!(out, "{}:\n\n", label)?;

    let mut map = M::default();
    let t0 = Instant::now();
    let mut watch = Stopwatch::starting_at(out, t0);

    workload::test_insert(&mut map, workload, &mut watch)?;
    workload::test_lookup(&mut map, workload, &mut watch)?;
    workload::test_iteration(&mut map, workload, &mut watch)?;
    workload::test_lookup(&mut map, workload, &mut watch)?;
    workload::test_erase(&mut map, workload, &mut watch)?;

    let elapsed_ms = t0.elapsed().as_millis();
    write!(watch.out(), "Total: {} ms\n\n", elapsed_ms)?;

    Ok(TrialRecord {
        label,
        elapsed_ms,
        phases: watch.into_phases(),
    })
}

/// Runs every hasher compiled into the catalog, in catalog order.
pub fn run_all<W: Write>(workload: &Workload<'_>, out: &mut W) -> io::Result<TrialLog> {
    let mut log = TrialLog::new();

    log.push(run_trial::<FlatMap<String, u32, AHash>, _>("ahash::AHasher", workload, out)?);
    log.push(run_trial::<FlatMap<String, u32, StdHash>, _>("std::hash", workload, out)?);
    log.push(run_trial::<FlatMap<String, u32, Mul31>, _>("mul31_hash", workload, out)?);
    log.push(run_trial::<FlatMap<String, u32, Mul31x4>, _>("mul31_x4_hash", workload, out)?);
    log.push(run_trial::<FlatMap<String, u32, Mul31x8>, _>("mul31_x8_hash", workload, out)?);
    log.push(run_trial::<FlatMap<String, u32, Fnv1a>, _>("fnv1a_hash", workload, out)?);

    #[cfg(feature = "fxhash")]
    log.push(run_trial::<FlatMap<String, u32, FxHash>, _>("FxHasher", workload, out)?);

    #[cfg(feature = "xxhash")]
    {
        log.push(run_trial::<FlatMap<String, u32, Xxh3>, _>("xxh3_64", workload, out)?);
        log.push(run_trial::<FlatMap<String, u32, Xxh64>, _>("xxh64", workload, out)?);
    }

    Ok(log)
}
