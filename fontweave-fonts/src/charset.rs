//! Sparse code-point sets.

use std::collections::BTreeMap;
use std::fmt;

/// A set of Unicode code points stored as 256-bit leaves keyed by page
/// (`code point >> 8`).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Charset {
    pages: BTreeMap<u32, [u64; 4]>,
    len: usize,
}

impl Charset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a code point, returning `false` when it was already present.
    pub fn insert(&mut self, cp: u32) -> bool {
        let leaf = self.pages.entry(cp >> 8).or_insert([0; 4]);
        let (word, bit) = Self::slot(cp);
        if leaf[word] & bit != 0 {
            return false;
        }
        leaf[word] |= bit;
        self.len += 1;
        true
    }

    pub fn contains(&self, cp: u32) -> bool {
        let (word, bit) = Self::slot(cp);
        self.pages
            .get(&(cp >> 8))
            .is_some_and(|leaf| leaf[word] & bit != 0)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether every code point of `other` is in `self`.
    pub fn is_superset(&self, other: &Charset) -> bool {
        if other.len > self.len {
            return false;
        }
        other.pages.iter().all(|(page, theirs)| match self.pages.get(page) {
            Some(ours) => ours.iter().zip(theirs).all(|(o, t)| o & t == *t),
            None => theirs.iter().all(|w| *w == 0),
        })
    }

    /// Whether at least one of `cps` is in the set.
    pub fn contains_any(&self, cps: &[u32]) -> bool {
        cps.iter().any(|cp| self.contains(*cp))
    }

    /// Code points in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.iter().flat_map(|(page, leaf)| {
            leaf.iter().enumerate().flat_map(move |(word, bits)| {
                (0..64u32)
                    .filter(move |bit| bits & (1u64 << bit) != 0)
                    .map(move |bit| (page << 8) | ((word as u32) << 6) | bit)
            })
        })
    }

    fn slot(cp: u32) -> (usize, u64) {
        let low = cp & 0xFF;
        ((low >> 6) as usize, 1u64 << (low & 63))
    }
}

impl FromIterator<u32> for Charset {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = Charset::new();
        set.extend(iter);
        set
    }
}

impl Extend<u32> for Charset {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        for cp in iter {
            self.insert(cp);
        }
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Charset")
            .field("len", &self.len)
            .field("pages", &self.pages.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_contains() {
        let mut set = Charset::new();
        assert!(set.insert(0x41));
        assert!(!set.insert(0x41), "second insert reports existing member");
        assert!(set.insert(0x1F600));
        assert!(set.contains(0x41));
        assert!(set.contains(0x1F600));
        assert!(!set.contains(0x42));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_iter_is_sorted() {
        let set: Charset = [0x300, 0x41, 0xFF, 0x100].into_iter().collect();
        let cps: Vec<u32> = set.iter().collect();
        assert_eq!(cps, vec![0x41, 0xFF, 0x100, 0x300]);
    }

    #[test]
    fn test_superset() {
        let big: Charset = (0x20..0x80).collect();
        let small: Charset = [0x41, 0x61].into_iter().collect();
        let outside: Charset = [0x41, 0xE9].into_iter().collect();
        assert!(big.is_superset(&small));
        assert!(!big.is_superset(&outside), "0xE9 is not covered");
        assert!(big.is_superset(&Charset::new()), "empty set is always covered");
    }

    #[test]
    fn test_contains_any() {
        let set: Charset = [0x5B57].into_iter().collect();
        assert!(set.contains_any(&[0x6F22, 0x5B57]));
        assert!(!set.contains_any(&[0x6F22]));
        assert!(!set.contains_any(&[]));
    }
}
