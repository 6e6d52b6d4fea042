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

#[cfg(target_arch = "x86")]
use std::arch::x86 as stdarch;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64 as stdarch;

use stdarch::__m128i;

pub(crate) const BUCKETS_PER_GROUP: usize = 16;

#[derive(Clone, Copy, Default)]
#[repr(C, align(16))]
pub(crate) struct ControlByteGroup {
    bytes: [u8; BUCKETS_PER_GROUP],
}

impl ControlByteGroup {
    pub(crate) fn load(&self) -> __m128i {
        // aligned by repr(align(16))
        unsafe { stdarch::_mm_load_si128(self.bytes.as_ptr() as *const __m128i) }
    }

    pub(crate) fn get(&self, offset: usize) -> u8 {
        self.bytes[offset]
    }

    pub(crate) fn set(&mut self, offset: usize, value: u8) {
        self.bytes[offset] = value;
    }

    pub(crate) fn has_empty(&self) -> bool {
        let zero_move_mask = unsafe {
            stdarch::_mm_movemask_epi8(stdarch::_mm_cmpeq_epi8(
                self.load(),
                stdarch::_mm_setzero_si128(),
            ))
        };

        zero_move_mask != 0
    }

    /// One bit per empty or tombstoned slot.
    pub(crate) fn vacant_move_mask(&self) -> u32 {
        let full_move_mask = unsafe { stdarch::_mm_movemask_epi8(self.load()) } as u32;

        !full_move_mask & 0xffff
    }
}

pub(crate) struct Searcher {
    empty: __m128i,
    query: __m128i,
}

impl Searcher {
    pub(crate) fn new(query: u8) -> Self {
        Self {
            empty: unsafe { stdarch::_mm_set1_epi8(super::EMPTY_CONTROL_BYTE as i8) },
            query: unsafe { stdarch::_mm_set1_epi8(query as i8) },
        }
    }

    /// Returns move masks of the empty slots and of the slots whose control
    /// byte equals the query.
    pub(crate) fn search(&self, bytes: __m128i) -> (u32, u32) {
        let empty_move_mask =
            unsafe { stdarch::_mm_movemask_epi8(stdarch::_mm_cmpeq_epi8(bytes, self.empty)) }
                as u32;
        let query_move_mask =
            unsafe { stdarch::_mm_movemask_epi8(stdarch::_mm_cmpeq_epi8(bytes, self.query)) }
                as u32;

        (empty_move_mask, query_move_mask)
    }
}
