//! Per-register type lattice.
//!
//! Every live range is assumed to carry exactly one storage type. The builder
//! meets the type of every definition and use of a register into a
//! [`TypeDomain`]; reaching [`TypeDomain::Conflict`] means the input violates
//! that assumption and the method cannot be allocated.
//!
//! ```text
//!                Unknown           (top: no information yet)
//!       /      /    |     \     \
//!    Zero  Const Normal Object Wide  (concrete, see RegisterType::refine)
//!       \      \    |     /     /
//!                Conflict          (bottom)
//! ```

use std::fmt::{self, Debug};

use crate::ir::RegisterType;

/// A meet semi-lattice.
///
/// The meet must be idempotent, commutative and associative.
pub trait MeetSemiLattice: Clone + Debug + PartialEq {
    /// Greatest lower bound of two elements.
    #[must_use]
    fn meet(&self, other: &Self) -> Self;

    /// Returns `true` for the bottom element. Meeting bottom with anything
    /// yields bottom.
    fn is_bottom(&self) -> bool;
}

/// Merged storage type of one register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeDomain {
    /// No definition or use has been seen.
    #[default]
    Unknown,
    /// All definitions and uses agree on this type.
    Type(RegisterType),
    /// Two incompatible types reached the same live range.
    Conflict,
}

impl TypeDomain {
    /// Returns the concrete type, or `None` for `Unknown` and `Conflict`.
    #[must_use]
    pub fn element(&self) -> Option<RegisterType> {
        match self {
            Self::Type(ty) => Some(*ty),
            _ => None,
        }
    }

    /// Returns `true` if no type has been merged in yet.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns `true` if the domain reached `Conflict`.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict)
    }

    /// Meets `ty` into this domain in place and returns the new value.
    pub fn merge(&mut self, ty: RegisterType) -> TypeDomain {
        *self = self.meet(&Self::Type(ty));
        *self
    }

    /// Returns `true` if meeting the two domains would not conflict.
    #[must_use]
    pub fn is_compatible(&self, other: &Self) -> bool {
        !self.meet(other).is_bottom()
    }
}

impl MeetSemiLattice for TypeDomain {
    fn meet(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Unknown, x) | (x, Self::Unknown) => *x,
            (Self::Type(a), Self::Type(b)) => a.refine(*b).map_or(Self::Conflict, Self::Type),
            _ => Self::Conflict,
        }
    }

    fn is_bottom(&self) -> bool {
        self.is_conflict()
    }
}

impl From<RegisterType> for TypeDomain {
    fn from(ty: RegisterType) -> Self {
        Self::Type(ty)
    }
}

impl fmt::Display for TypeDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("UNKNOWN"),
            Self::Type(ty) => write!(f, "{ty}"),
            Self::Conflict => f.write_str("CONFLICT"),
        }
    }
}
