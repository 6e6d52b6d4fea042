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

pub(crate) const BUCKETS_PER_GROUP: usize = 8;

const HIGH_BITS: u64 = 0x8080_8080_8080_8080;

#[derive(Clone, Copy, Default)]
pub(crate) struct ControlByteGroup {
    bytes: u64,
}

impl ControlByteGroup {
    pub(crate) fn load(&self) -> u64 {
        self.bytes
    }

    pub(crate) fn get(&self, offset: usize) -> u8 {
        (self.bytes >> (offset * 8)) as u8
    }

    pub(crate) fn set(&mut self, offset: usize, value: u8) {
        let shift = offset * 8;

        self.bytes = (self.bytes & !(0xff << shift)) | (u64::from(value) << shift);
    }

    pub(crate) fn has_empty(&self) -> bool {
        has_zero_byte(self.bytes)
    }

    /// One bit per empty or tombstoned slot.
    pub(crate) fn vacant_move_mask(&self) -> u32 {
        let vacant = !self.bytes & HIGH_BITS;

        if vacant == 0 {
            return 0;
        }

        (0..BUCKETS_PER_GROUP)
            .filter(|i| vacant & (0x80 << (i * 8)) != 0)
            .fold(0, |mask, i| mask | 1 << i)
    }
}

pub(crate) struct Searcher {
    query: u8,
}

impl Searcher {
    pub(crate) fn new(query: u8) -> Self {
        Self { query }
    }

    /// Returns move masks of the empty slots and of the slots whose control
    /// byte equals the query.
    pub(crate) fn search(&self, bytes: u64) -> (u32, u32) {
        let has_empty = has_zero_byte(bytes);
        let has_query = has_byte(bytes, self.query);

        let mut empty_move_mask = 0;
        let mut query_move_mask = 0;

        if has_empty || has_query {
            for i in 0..BUCKETS_PER_GROUP {
                let b = (bytes >> (i * 8)) as u8;

                if b == super::EMPTY_CONTROL_BYTE {
                    empty_move_mask |= 1 << i;
                } else if b == self.query {
                    query_move_mask |= 1 << i;
                }
            }
        }

        (empty_move_mask, query_move_mask)
    }
}

fn has_zero_byte(v: u64) -> bool {
    (v.wrapping_sub(0x0101_0101_0101_0101) & !v & HIGH_BITS) != 0
}

fn has_byte(v: u64, n: u8) -> bool {
    has_zero_byte(v ^ (u64::MAX / u64::from(u8::MAX) * u64::from(n)))
}
