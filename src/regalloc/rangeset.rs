//! Instructions selected for range encoding.

use std::collections::HashSet;

use crate::ir::InsnId;

/// An insertion-ordered set of instructions that should take their `/range`
/// encoding.
///
/// Membership queries are O(1); iteration follows first insertion so range
/// instructions are always allocated in the same order for the same input.
///
/// ```rust
/// use regraph::{ir::InsnId, regalloc::RangeSet};
///
/// let mut set = RangeSet::new();
/// set.insert(InsnId::new(4));
/// set.insert(InsnId::new(1));
/// set.insert(InsnId::new(4));
///
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.iter().collect::<Vec<_>>(), vec![InsnId::new(4), InsnId::new(1)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RangeSet {
    order: Vec<InsnId>,
    members: HashSet<InsnId>,
}

impl RangeSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `insn` unless already present. Returns `true` if it was added.
    pub fn insert(&mut self, insn: InsnId) -> bool {
        if !self.members.insert(insn) {
            return false;
        }
        self.order.push(insn);
        true
    }

    /// Returns `true` if `insn` is a member.
    #[must_use]
    pub fn contains(&self, insn: InsnId) -> bool {
        self.members.contains(&insn)
    }

    /// Iterates over members in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = InsnId> + '_ {
        self.order.iter().copied()
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl FromIterator<InsnId> for RangeSet {
    fn from_iter<T: IntoIterator<Item = InsnId>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<InsnId> for RangeSet {
    fn extend<T: IntoIterator<Item = InsnId>>(&mut self, iter: T) {
        for insn in iter {
            self.insert(insn);
        }
    }
}

impl<'a> IntoIterator for &'a RangeSet {
    type Item = InsnId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, InsnId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter().copied()
    }
}
