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

//! String hash functions usable as the hash policy of a
//! [`FlatMap`](crate::FlatMap).
//!
//! Every hasher is a stateless unit struct implementing [`StringHash`]. The
//! word-sized result is pointer width, so the `mul31` and FNV-1a hashers use
//! 32-bit arithmetic on 32-bit targets and 64-bit arithmetic elsewhere; the
//! width-specific functions are exported so both can be checked on any host.

use std::{collections::hash_map::DefaultHasher, hash::Hasher};

/// A hash function over byte strings.
pub trait StringHash: Default {
    /// Whether every bit of the result already depends on every input bit.
    ///
    /// When `false`, [`FlatMap`](crate::FlatMap) runs the result through its
    /// own finalizer before splitting it into a control byte and a group
    /// index. The marker only affects speed, never which keys are found.
    const IS_AVALANCHING: bool = false;

    fn hash_bytes(&self, bytes: &[u8]) -> usize;
}

const MUL31_SEED_32: u32 = 0x811C_9DC5;
const MUL31_SEED_64: u64 = 0xCBF2_9CE4_8422_2325;

const FNV_OFFSET_BASIS_32: u32 = 0x811C_9DC5;
const FNV_PRIME_32: u32 = 0x0100_0193;
const FNV_OFFSET_BASIS_64: u64 = 0xCBF2_9CE4_8422_2325;
const FNV_PRIME_64: u64 = 0x0000_0100_0000_01B3;

pub fn mul31_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(MUL31_SEED_32, |h, &b| {
        h.wrapping_mul(31).wrapping_add(u32::from(b))
    })
}

pub fn mul31_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(MUL31_SEED_64, |h, &b| {
        h.wrapping_mul(31).wrapping_add(u64::from(b))
    })
}

pub fn mul31_x4_32(bytes: &[u8]) -> u32 {
    const P1: u32 = 31;
    const P2: u32 = P1 * 31;
    const P3: u32 = P2 * 31;
    const P4: u32 = P3 * 31;

    let mut h = MUL31_SEED_32;
    let mut chunks = bytes.chunks_exact(4);

    for c in &mut chunks {
        h = h
            .wrapping_mul(P4)
            .wrapping_add(u32::from(c[0]) * P3)
            .wrapping_add(u32::from(c[1]) * P2)
            .wrapping_add(u32::from(c[2]) * P1)
            .wrapping_add(u32::from(c[3]));
    }

    for &b in chunks.remainder() {
        h = h.wrapping_mul(31).wrapping_add(u32::from(b));
    }

    h
}

pub fn mul31_x4_64(bytes: &[u8]) -> u64 {
    const P1: u64 = 31;
    const P2: u64 = P1 * 31;
    const P3: u64 = P2 * 31;
    const P4: u64 = P3 * 31;

    let mut h = MUL31_SEED_64;
    let mut chunks = bytes.chunks_exact(4);

    for c in &mut chunks {
        h = h
            .wrapping_mul(P4)
            .wrapping_add(u64::from(c[0]) * P3)
            .wrapping_add(u64::from(c[1]) * P2)
            .wrapping_add(u64::from(c[2]) * P1)
            .wrapping_add(u64::from(c[3]));
    }

    for &b in chunks.remainder() {
        h = h.wrapping_mul(31).wrapping_add(u64::from(b));
    }

    h
}

/// `mul31` eight bytes at a time, always with a 64-bit accumulator.
pub fn mul31_x8(bytes: &[u8]) -> u64 {
    const P1: u64 = 31;
    const P2: u64 = P1 * 31;
    const P3: u64 = P2 * 31;
    const P4: u64 = P3 * 31;
    const P5: u64 = P4 * 31;
    const P6: u64 = P5 * 31;
    const P7: u64 = P6 * 31;
    const P8: u64 = P7 * 31;

    let mut h = MUL31_SEED_64;
    let mut chunks = bytes.chunks_exact(8);

    for c in &mut chunks {
        h = h
            .wrapping_mul(P8)
            .wrapping_add(u64::from(c[0]) * P7)
            .wrapping_add(u64::from(c[1]) * P6)
            .wrapping_add(u64::from(c[2]) * P5)
            .wrapping_add(u64::from(c[3]) * P4)
            .wrapping_add(u64::from(c[4]) * P3)
            .wrapping_add(u64::from(c[5]) * P2)
            .wrapping_add(u64::from(c[6]) * P1)
            .wrapping_add(u64::from(c[7]));
    }

    for &b in chunks.remainder() {
        h = h.wrapping_mul(31).wrapping_add(u64::from(b));
    }

    h
}

pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS_32, |h, &b| {
        (h ^ u32::from(b)).wrapping_mul(FNV_PRIME_32)
    })
}

pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS_64, |h, &b| {
        (h ^ u64::from(b)).wrapping_mul(FNV_PRIME_64)
    })
}

/// `h = h * 31 + b` over every byte. Not avalanching.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mul31;

impl StringHash for Mul31 {
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> usize {
        #[cfg(target_pointer_width = "64")]
        {
            mul31_64(bytes) as usize
        }

        #[cfg(not(target_pointer_width = "64"))]
        {
            mul31_32(bytes) as usize
        }
    }
}

/// [`Mul31`] unrolled four bytes per step. Produces identical output.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mul31x4;

impl StringHash for Mul31x4 {
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> usize {
        #[cfg(target_pointer_width = "64")]
        {
            mul31_x4_64(bytes) as usize
        }

        #[cfg(not(target_pointer_width = "64"))]
        {
            mul31_x4_32(bytes) as usize
        }
    }
}

/// [`Mul31`] unrolled eight bytes per step over a 64-bit accumulator,
/// truncated to the word.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mul31x8;

impl StringHash for Mul31x8 {
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> usize {
        mul31_x8(bytes) as usize
    }
}

/// FNV-1a with the offset basis and prime matching the word width.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fnv1a;

impl StringHash for Fnv1a {
    const IS_AVALANCHING: bool = true;

    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> usize {
        #[cfg(target_pointer_width = "64")]
        {
            fnv1a_64(bytes) as usize
        }

        #[cfg(not(target_pointer_width = "64"))]
        {
            fnv1a_32(bytes) as usize
        }
    }
}

/// The standard library's string hasher, SipHash-1-3 with zero keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdHash;

impl StringHash for StdHash {
    const IS_AVALANCHING: bool = true;

    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> usize {
        let mut hasher = DefaultHasher::new();

        // same byte stream `str` feeds its hasher
        hasher.write(bytes);
        hasher.write_u8(0xff);

        hasher.finish() as usize
    }
}

/// [aHash] with its fixed default keys.
///
/// [aHash]: https://docs.rs/ahash
#[derive(Clone, Copy, Debug, Default)]
pub struct AHash;

impl StringHash for AHash {
    const IS_AVALANCHING: bool = true;

    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> usize {
        let mut hasher = ahash::AHasher::default();
        hasher.write(bytes);

        hasher.finish() as usize
    }
}

/// [FxHash], the hasher used by rustc. Not avalanching.
///
/// [FxHash]: https://docs.rs/fxhash
#[cfg(feature = "fxhash")]
#[derive(Clone, Copy, Debug, Default)]
pub struct FxHash;

#[cfg(feature = "fxhash")]
impl StringHash for FxHash {
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> usize {
        let mut hasher = fxhash::FxHasher::default();
        hasher.write(bytes);

        hasher.finish() as usize
    }
}

/// XXH3 (64-bit output) with seed 0.
#[cfg(feature = "xxhash")]
#[derive(Clone, Copy, Debug, Default)]
pub struct Xxh3;

#[cfg(feature = "xxhash")]
impl StringHash for Xxh3 {
    const IS_AVALANCHING: bool = true;

    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> usize {
        xxhash_rust::xxh3::xxh3_64_with_seed(bytes, 0) as usize
    }
}

/// XXH64 with seed 0.
#[cfg(feature = "xxhash")]
#[derive(Clone, Copy, Debug, Default)]
pub struct Xxh64;

#[cfg(feature = "xxhash")]
impl StringHash for Xxh64 {
    const IS_AVALANCHING: bool = true;

    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> usize {
        xxhash_rust::xxh64::xxh64(bytes, 0) as usize
    }
}
