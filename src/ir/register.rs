//! Virtual register identifiers.

use std::fmt;

/// A method-local virtual register.
///
/// Registers are plain slot indices into the method's register frame prior to
/// physical assignment. The allocator never owns registers; it only uses them
/// as keys.
///
/// # Examples
///
/// ```rust
/// use regraph::ir::VReg;
///
/// let reg = VReg::new(3);
/// assert_eq!(reg.index(), 3);
/// assert_eq!(reg.to_string(), "v3");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct VReg(u16);

impl VReg {
    /// Largest register index addressable by any encoding.
    pub const MAX: VReg = VReg(u16::MAX);

    /// Creates a register identifier from its frame index.
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the frame index.
    #[must_use]
    pub const fn index(self) -> u16 {
        self.0
    }

    /// Returns the frame index as a `usize` for table lookups.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u16> for VReg {
    fn from(index: u16) -> Self {
        Self(index)
    }
}

impl fmt::Debug for VReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for VReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
