//! The set value: a tagged union of the two encodings.
//!
//! A set starts as an [`IntSet`] when its first member is
//! integer-representable and stays there until either a non-integer member
//! arrives or the length bound is exceeded, at which point it is promoted to
//! an [`HtSet`]. Promotion is one-way.
//!
//! Read paths ([`Set::iter`], [`Set::random`]) hand out borrowed
//! [`Element`]s; callers that go on to mutate the set materialize owned
//! bytes first.

use crate::htset::HtSet;
use crate::intset::IntSet;
use crate::value::{format_int64, parse_int64};
use rand::Rng;

/// Which internal representation a set currently uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    IntSet,
    Hash,
}

/// A borrowed set member: either an integer from the intset encoding or a
/// byte string from the hash encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element<'a> {
    Int(i64),
    Str(&'a [u8]),
}

impl Element<'_> {
    /// The member's canonical integer form, if it has one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Element::Int(v) => Some(*v),
            Element::Str(s) => parse_int64(s),
        }
    }

    /// Materialize the member as owned bytes (integers as canonical decimal).
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Element::Int(v) => format_int64(*v),
            Element::Str(s) => s.to_vec(),
        }
    }
}

/// A set value owned by one keyspace entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Set {
    Ints(IntSet),
    Hash(HtSet),
}

impl Set {
    /// Create an empty set able to hold `value`, choosing the encoding the
    /// way the first ADD against a missing key does.
    pub fn for_value(value: &[u8]) -> Self {
        if parse_int64(value).is_some() {
            Set::Ints(IntSet::new())
        } else {
            Set::Hash(HtSet::new())
        }
    }

    /// Empty intset-encoded set. Used for operation results so an
    /// all-integer outcome keeps the compact encoding.
    pub fn new_intset() -> Self {
        Set::Ints(IntSet::new())
    }

    #[inline]
    pub fn encoding(&self) -> Encoding {
        match self {
            Set::Ints(_) => Encoding::IntSet,
            Set::Hash(_) => Encoding::Hash,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Set::Ints(ints) => ints.len(),
            Set::Hash(ht) => ht.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a member. Returns true if it was newly inserted.
    ///
    /// Promotes intset → hash when the member is not integer-representable,
    /// or when a successful insert pushes the length past
    /// `max_intset_entries`.
    pub fn add(&mut self, member: &[u8], max_intset_entries: usize) -> bool {
        match self {
            Set::Hash(ht) => ht.insert(member),
            Set::Ints(ints) => match parse_int64(member) {
                Some(value) => {
                    if !ints.insert(value) {
                        return false;
                    }
                    if ints.len() > max_intset_entries {
                        self.promote_to_hash();
                    }
                    true
                }
                None => {
                    // The member was absent by invariant: an intset holds
                    // only integer-representable values.
                    let mut ht = ints_to_hash(ints);
                    ht.insert(member);
                    *self = Set::Hash(ht);
                    true
                }
            },
        }
    }

    /// Add an already-borrowed element, materializing integers only when the
    /// target is hash-encoded.
    pub fn add_element(&mut self, element: &Element<'_>, max_intset_entries: usize) -> bool {
        match element {
            Element::Str(s) => self.add(s, max_intset_entries),
            Element::Int(v) => match self {
                Set::Ints(ints) => {
                    if !ints.insert(*v) {
                        return false;
                    }
                    if ints.len() > max_intset_entries {
                        self.promote_to_hash();
                    }
                    true
                }
                Set::Hash(ht) => {
                    let mut buf = itoa::Buffer::new();
                    ht.insert(buf.format(*v).as_bytes())
                }
            },
        }
    }

    /// Remove an already-borrowed element, materializing integers only when
    /// the target is hash-encoded.
    pub fn remove_element(&mut self, element: &Element<'_>) -> bool {
        match element {
            Element::Str(s) => self.remove(s),
            Element::Int(v) => match self {
                Set::Ints(ints) => ints.remove(*v),
                Set::Hash(ht) => {
                    let mut buf = itoa::Buffer::new();
                    ht.remove(buf.format(*v).as_bytes())
                }
            },
        }
    }

    /// Remove a member. Returns true if it was present.
    pub fn remove(&mut self, member: &[u8]) -> bool {
        match self {
            Set::Ints(ints) => match parse_int64(member) {
                Some(value) => ints.remove(value),
                None => false,
            },
            Set::Hash(ht) => ht.remove(member),
        }
    }

    #[inline]
    pub fn contains(&self, member: &[u8]) -> bool {
        match self {
            Set::Ints(ints) => match parse_int64(member) {
                Some(value) => ints.contains(value),
                None => false,
            },
            Set::Hash(ht) => ht.contains(member),
        }
    }

    /// Membership probe for a borrowed element, taking the integer fast path
    /// when both sides allow it.
    pub fn contains_element(&self, element: &Element<'_>) -> bool {
        match (self, element) {
            (Set::Ints(ints), Element::Int(v)) => ints.contains(*v),
            (Set::Ints(ints), Element::Str(s)) => match parse_int64(s) {
                Some(value) => ints.contains(value),
                None => false,
            },
            (Set::Hash(ht), Element::Int(v)) => {
                let mut buf = itoa::Buffer::new();
                ht.contains(buf.format(*v).as_bytes())
            }
            (Set::Hash(ht), Element::Str(s)) => ht.contains(s),
        }
    }

    /// Uniform random member without copying the payload. None when empty.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<Element<'_>> {
        match self {
            Set::Ints(ints) => ints.random(rng).map(Element::Int),
            Set::Hash(ht) => ht.random(rng).map(Element::Str),
        }
    }

    /// Convert to the hash encoding. No-op if already hash-encoded.
    pub fn promote_to_hash(&mut self) {
        if let Set::Ints(ints) = self {
            let ht = ints_to_hash(ints);
            *self = Set::Hash(ht);
        }
    }

    /// Lazy iteration over members. Must not be interleaved with mutation.
    pub fn iter(&self) -> SetIter<'_> {
        SetIter { set: self, pos: 0 }
    }

    /// One page of a cursor scan.
    ///
    /// The intset encoding is small enough to return in full (cursor comes
    /// back 0); the hash encoding pages through dense positions, `count` at
    /// a time. Positions are stable only absent mutation.
    pub fn scan(&self, cursor: u64, count: usize) -> (u64, Vec<Element<'_>>) {
        match self {
            Set::Ints(_) => (0, self.iter().collect()),
            Set::Hash(ht) => {
                let start = cursor as usize;
                if start >= ht.len() {
                    return (0, Vec::new());
                }
                let end = start.saturating_add(count).min(ht.len());
                let page = (start..end)
                    .filter_map(|i| ht.get(i).map(Element::Str))
                    .collect();
                let next = if end >= ht.len() { 0 } else { end as u64 };
                (next, page)
            }
        }
    }
}

fn ints_to_hash(ints: &IntSet) -> HtSet {
    let mut ht = HtSet::with_capacity(ints.len());
    let mut buf = itoa::Buffer::new();
    for value in ints.iter() {
        ht.insert(buf.format(value).as_bytes());
    }
    ht
}

/// Iterator yielding tagged elements from either encoding.
pub struct SetIter<'a> {
    set: &'a Set,
    pos: usize,
}

impl<'a> Iterator for SetIter<'a> {
    type Item = Element<'a>;

    fn next(&mut self) -> Option<Element<'a>> {
        let item = match self.set {
            Set::Ints(ints) => ints.get(self.pos).map(Element::Int),
            Set::Hash(ht) => ht.get(self.pos).map(Element::Str),
        };
        if item.is_some() {
            self.pos += 1;
        }
        item
    }
}
