//! Register liveness as consumed by the graph builder.
//!
//! Liveness is computed elsewhere. The builder only needs, for every
//! instruction, the set of registers live immediately after it executes. That
//! contract is the [`Liveness`] trait; [`LivenessMap`] is a plain store that
//! implements it.
//!
//! The live-in set of an instruction follows from its live-out set by the
//! usual backward transfer function, see [`live_in`]:
//!
//! - `IN[i]` = `USE[i]` ∪ (`OUT[i]` - `DEF[i]`)

use std::{collections::HashMap, fmt, hash::BuildHasher};

use crate::{
    ir::{InsnId, Instruction, VReg},
    utils::BitSet,
};

/// A set of live virtual registers.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LiveRegs {
    bits: BitSet,
}

impl LiveRegs {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `reg` live. Returns `true` if it was not already live.
    pub fn insert(&mut self, reg: VReg) -> bool {
        self.bits.insert(reg.as_usize())
    }

    /// Marks `reg` dead. Returns `true` if it was live.
    pub fn remove(&mut self, reg: VReg) -> bool {
        self.bits.remove(reg.as_usize())
    }

    /// Returns `true` if `reg` is live.
    #[must_use]
    pub fn contains(&self, reg: VReg) -> bool {
        self.bits.contains(reg.as_usize())
    }

    /// Iterates over live registers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = VReg> + '_ {
        // BitSet indices originate from VReg::as_usize, so they fit in u16.
        self.bits.iter().map(|idx| VReg::new(idx as u16))
    }

    /// Returns the number of live registers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.count()
    }

    /// Returns `true` if no register is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Adds every register of `other`.
    pub fn union_with(&mut self, other: &LiveRegs) -> bool {
        self.bits.union_with(&other.bits)
    }

    /// Returns `true` if every register live in `self` is live in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &LiveRegs) -> bool {
        self.bits.is_subset(&other.bits)
    }
}

impl FromIterator<VReg> for LiveRegs {
    fn from_iter<T: IntoIterator<Item = VReg>>(iter: T) -> Self {
        let mut regs = Self::new();
        for reg in iter {
            regs.insert(reg);
        }
        regs
    }
}

impl fmt::Debug for LiveRegs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Source of per-instruction live-out sets.
///
/// Implementations must answer for every instruction of the method being
/// built. `Sync` implementations can be shared by parallel builds.
pub trait Liveness {
    /// Registers live immediately after `insn`, or `None` if unknown.
    fn live_out(&self, insn: InsnId) -> Option<&LiveRegs>;
}

/// Live-out sets stored densely by instruction index.
#[derive(Debug, Clone, Default)]
pub struct LivenessMap {
    live_out: Vec<Option<LiveRegs>>,
}

impl LivenessMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the live-out set of `insn`, replacing any previous one.
    pub fn set_live_out(&mut self, insn: InsnId, regs: LiveRegs) {
        let idx = insn.index();
        if idx >= self.live_out.len() {
            self.live_out.resize(idx + 1, None);
        }
        self.live_out[idx] = Some(regs);
    }

    /// Returns the number of instructions with a recorded set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_out.iter().filter(|entry| entry.is_some()).count()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_out.iter().all(Option::is_none)
    }
}

impl Liveness for LivenessMap {
    fn live_out(&self, insn: InsnId) -> Option<&LiveRegs> {
        self.live_out.get(insn.index())?.as_ref()
    }
}

impl<S: BuildHasher> Liveness for HashMap<InsnId, LiveRegs, S> {
    fn live_out(&self, insn: InsnId) -> Option<&LiveRegs> {
        self.get(&insn)
    }
}

/// Registers live immediately before `insn`, given those live after it.
#[must_use]
pub fn live_in(insn: &Instruction, live_out: &LiveRegs) -> LiveRegs {
    let mut regs = live_out.clone();
    if let Some(dest) = insn.dest_reg() {
        regs.remove(dest);
    }
    for &src in insn.src_regs() {
        regs.insert(src);
    }
    regs
}
