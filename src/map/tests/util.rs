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

use std::{
    borrow::Borrow,
    cell::Cell,
    hash::{Hash, Hasher},
    ops::Deref,
    rc::Rc,
};

use crate::hash::StringHash;

#[derive(Debug)]
pub(crate) struct NoisyDropper<T: ?Sized> {
    parent: Rc<DropNotifier>,
    pub elem: T,
}

impl<T> NoisyDropper<T> {
    pub(crate) fn new(parent: Rc<DropNotifier>, elem: T) -> Self {
        Self { parent, elem }
    }
}

impl<T: ?Sized> Drop for NoisyDropper<T> {
    fn drop(&mut self) {
        assert!(!self.parent.dropped.replace(true), "dropped twice");
    }
}

impl<T: ?Sized + PartialEq> PartialEq for NoisyDropper<T> {
    fn eq(&self, other: &Self) -> bool {
        self.elem == other.elem
    }
}

impl<T: ?Sized + PartialEq> PartialEq<T> for NoisyDropper<T> {
    fn eq(&self, other: &T) -> bool {
        &self.elem == other
    }
}

impl<T: ?Sized + Eq> Eq for NoisyDropper<T> {}

impl<T: ?Sized + Hash> Hash for NoisyDropper<T> {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.elem.hash(hasher);
    }
}

impl<T: ?Sized + AsRef<[u8]>> AsRef<[u8]> for NoisyDropper<T> {
    fn as_ref(&self) -> &[u8] {
        self.elem.as_ref()
    }
}

impl Borrow<str> for NoisyDropper<String> {
    fn borrow(&self) -> &str {
        &self.elem
    }
}

impl<T: ?Sized> Deref for NoisyDropper<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.elem
    }
}

#[derive(Debug, Default)]
pub(crate) struct DropNotifier {
    dropped: Cell<bool>,
}

impl DropNotifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn was_dropped(&self) -> bool {
        self.dropped.get()
    }
}

/// Sends every key to the same home group.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Colliding;

impl StringHash for Colliding {
    const IS_AVALANCHING: bool = true;

    fn hash_bytes(&self, bytes: &[u8]) -> usize {
        // distinct control bytes, identical group index
        bytes.iter().fold(0, |h: usize, &b| h.wrapping_add(usize::from(b))) & 0x7f
    }
}

/// [`crate::hash::Mul31`] claiming to avalanche, so the map skips its
/// finalizer.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct RawMul31;

impl StringHash for RawMul31 {
    const IS_AVALANCHING: bool = true;

    fn hash_bytes(&self, bytes: &[u8]) -> usize {
        crate::hash::Mul31.hash_bytes(bytes)
    }
}
