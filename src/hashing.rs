//! This module provides a deterministic hasher and `HashMap` and `HashSet`
//! variants that use it. The hashing data structures in the standard library
//! are randomly seeded per process, which would make iteration order (and
//! anything derived from it) differ from run to run. Simulation results must
//! be reproducible for a fixed seed, so every map in this crate goes through
//! these aliases.
//!
//! The `hash_str` free function is used to derive stable salts for the
//! per-stream random number generators in [`crate::random`].

use std::hash::Hasher;

use rustc_hash::FxHasher;

pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

/// A convenience method to compute the hash of a `&str`.
#[must_use]
pub fn hash_str(data: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_bytes());
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_strings() {
        let a = hash_str("hello");
        let b = hash_str("hello");
        let c = hash_str("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
