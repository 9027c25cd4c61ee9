//! Sorted, deduplicated array of signed 64-bit integers.
//!
//! Membership is a binary search, insertion and removal keep the ascending
//! order, and random selection indexes uniformly. This is the compact
//! encoding for sets whose members are all integer-representable.

use rand::Rng;

/// Packed ascending array of distinct i64 values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntSet {
    elems: Vec<i64>,
}

impl IntSet {
    pub fn new() -> Self {
        Self { elems: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elems: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    #[inline]
    pub fn contains(&self, value: i64) -> bool {
        self.elems.binary_search(&value).is_ok()
    }

    /// Insert a value, keeping ascending order. Returns true if it was new.
    pub fn insert(&mut self, value: i64) -> bool {
        match self.elems.binary_search(&value) {
            Ok(_) => false,
            Err(pos) => {
                self.elems.insert(pos, value);
                true
            }
        }
    }

    /// Remove a value. Returns true if it was present.
    pub fn remove(&mut self, value: i64) -> bool {
        match self.elems.binary_search(&value) {
            Ok(pos) => {
                self.elems.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Fetch by position in ascending order.
    #[inline]
    pub fn get(&self, index: usize) -> Option<i64> {
        self.elems.get(index).copied()
    }

    /// Uniform random member. None when empty.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<i64> {
        if self.elems.is_empty() {
            return None;
        }
        let idx = rng.random_range(0..self.elems.len());
        Some(self.elems[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.elems.iter().copied()
    }
}
