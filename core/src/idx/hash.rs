//! SPDX-License-Identifier: LGPL-3.0-or-later
//!
//! A small multiplicative hasher, grounded on `skyd`'s
//! `engine/idx/meta/hash.rs` (`HasherRawFx`): rotate-xor-multiply over
//! native words, no SIMD, no secret keying — good enough for an
//! in-process index, not for anything adversarial.

use std::hash::{BuildHasher, Hasher};

const ROTATE: u32 = 5;
const PRIME64: u64 = 0x517C_C1B7_2722_0A95; // same constant rustc's fxhash derivative uses

#[inline]
fn mix(state: u64, word: u64) -> u64 {
    (state.rotate_left(ROTATE) ^ word).wrapping_mul(PRIME64)
}

/// `BuildHasher` for [`RbhHashMap`](super::hashmap::RbhHashMap)'s default
/// hasher.
#[derive(Debug, Default, Clone, Copy)]
pub struct RbhHasher(u64);

impl Hasher for RbhHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, mut bytes: &[u8]) {
        let mut state = self.0;
        while bytes.len() >= 8 {
            let (head, tail) = bytes.split_at(8);
            state = mix(state, u64::from_ne_bytes(head.try_into().unwrap()));
            bytes = tail;
        }
        if !bytes.is_empty() {
            let mut buf = [0u8; 8];
            buf[..bytes.len()].copy_from_slice(bytes);
            state = mix(state, u64::from_ne_bytes(buf));
        }
        self.0 = state;
    }

    fn write_u64(&mut self, i: u64) {
        self.0 = mix(self.0, i);
    }

    fn write_usize(&mut self, i: usize) {
        self.0 = mix(self.0, i as u64);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RbhBuildHasher;

impl BuildHasher for RbhBuildHasher {
    type Hasher = RbhHasher;

    fn build_hasher(&self) -> Self::Hasher {
        RbhHasher(0)
    }
}
