//! FNV-1a hashing for the prover's tables.
//!
//! From https://en.wikipedia.org/wiki/Fowler%E2%80%93Noll%E2%80%93Vo_hash_function
//!
//! The hasher has no random state, so iteration order over a table only
//! depends on its insertion history. Binding enumeration relies on that to be
//! repeatable from one run to the next.

use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy)]
pub struct FNV(u64);

const INIT: u64 = 0xcbf29ce484222325;
const PRIME: u64 = 0x100000001b3;

impl FNV {
    #[inline]
    fn new() -> Self {
        FNV(INIT)
    }
}

impl std::hash::Hasher for FNV {
    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 ^= *b as u64;
            self.0 = self.0.wrapping_mul(PRIME);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Default)]
pub struct FNVBuildHasher;

impl std::hash::BuildHasher for FNVBuildHasher {
    type Hasher = FNV;
    fn build_hasher(&self) -> FNV {
        FNV::new()
    }
}

pub type FnvHashMap<K, V> = HashMap<K, V, FNVBuildHasher>;
pub type FnvHashSet<K> = HashSet<K, FNVBuildHasher>;

pub fn new_table<K, V>() -> FnvHashMap<K, V> {
    HashMap::with_hasher(FNVBuildHasher)
}

pub fn new_table_with_cap<K, V>(n: usize) -> FnvHashMap<K, V> {
    HashMap::with_capacity_and_hasher(n, FNVBuildHasher)
}

pub fn new_set<K>() -> FnvHashSet<K> {
    HashSet::with_hasher(FNVBuildHasher)
}

pub fn new_set_with_cap<K>(n: usize) -> FnvHashSet<K> {
    HashSet::with_capacity_and_hasher(n, FNVBuildHasher)
}

/// Hash a string with FNV-1a, truncated to 32 bits.
///
/// Names are hashed this way when computing an expression's value hash.
pub fn hash_str(s: &str) -> u32 {
    use std::hash::Hasher;
    let mut h = FNV::new();
    h.write(s.as_bytes());
    let x = h.finish();
    (x ^ (x >> 32)) as u32
}
