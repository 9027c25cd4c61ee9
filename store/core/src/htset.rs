//! Hash set of byte-string members with O(1) random selection.
//!
//! Members live in a dense vector; a hash index maps member bytes to their
//! dense slot. Removal swap-removes from the vector and patches the index of
//! the displaced member, so add/remove/contains stay expected O(1) and a
//! uniform random member is a single index draw. Iteration walks the dense
//! vector and is stable as long as the set is not mutated.

use ahash::RandomState;
use rand::Rng;
use std::collections::HashMap;

/// General (hash) encoding for set members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtSet {
    index: HashMap<Box<[u8]>, usize, RandomState>,
    dense: Vec<Box<[u8]>>,
}

impl HtSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            dense: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    #[inline]
    pub fn contains(&self, member: &[u8]) -> bool {
        self.index.contains_key(member)
    }

    /// Add a member. Returns true if it was new.
    pub fn insert(&mut self, member: &[u8]) -> bool {
        if self.index.contains_key(member) {
            return false;
        }
        self.index.insert(member.into(), self.dense.len());
        self.dense.push(member.into());
        true
    }

    /// Remove a member. Returns true if it was present.
    pub fn remove(&mut self, member: &[u8]) -> bool {
        let Some(slot) = self.index.remove(member) else {
            return false;
        };
        self.dense.swap_remove(slot);
        if slot < self.dense.len() {
            // Patch the index of the member that moved into the vacated slot
            let moved = self.dense[slot].clone();
            self.index.insert(moved, slot);
        }
        true
    }

    /// Fetch by dense position. The position of a member is stable only in
    /// the absence of mutation.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.dense.get(index).map(|m| m.as_ref())
    }

    /// Uniform random member. None when empty.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<&[u8]> {
        if self.dense.is_empty() {
            return None;
        }
        let idx = rng.random_range(0..self.dense.len());
        Some(self.dense[idx].as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.dense.iter().map(|m| m.as_ref())
    }
}
