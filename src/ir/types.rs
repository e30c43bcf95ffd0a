//! Operand types as seen by the register allocator.
//!
//! The allocator does not need a full type system. It only needs to know how
//! many slots a value occupies and whether two values can ever share a
//! register. [`RegisterType`] captures exactly that classification.

use std::fmt;

use strum::{EnumIter, IntoStaticStr};

/// Storage classification of a value held in a virtual register.
///
/// `Zero` and `Const` describe literals whose final interpretation is decided
/// by their uses: a literal zero may later be used as a null reference or as
/// an integer, a 32-bit constant may be an int or a float bit pattern. They
/// refine into the concrete use type instead of conflicting with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RegisterType {
    /// The literal `0`. Usable as a null reference or as a narrow primitive.
    Zero,
    /// A 32-bit literal other than zero.
    Const,
    /// A narrow (single slot) primitive value.
    Normal,
    /// A wide (two slot) primitive value: `long` or `double`.
    Wide,
    /// A reference.
    Object,
}

impl RegisterType {
    /// Number of contiguous register slots a value of this type occupies.
    #[must_use]
    pub const fn width(self) -> u8 {
        match self {
            Self::Wide => 2,
            _ => 1,
        }
    }

    /// Returns `true` for the two-slot type.
    #[must_use]
    pub const fn is_wide(self) -> bool {
        matches!(self, Self::Wide)
    }

    /// Returns `true` for literal types that still refine into a use type.
    #[must_use]
    pub const fn is_polymorphic_constant(self) -> bool {
        matches!(self, Self::Zero | Self::Const)
    }

    /// Greatest lower bound of two concrete types, or `None` if they can never
    /// describe the same live range.
    ///
    /// ```text
    ///        Normal   Object   Wide
    ///          |        |
    ///        Const      |
    ///          \       /
    ///            Zero
    /// ```
    #[must_use]
    pub fn refine(self, other: Self) -> Option<Self> {
        use RegisterType::{Const, Normal, Wide, Zero};

        if self == other {
            return Some(self);
        }
        match (self, other) {
            (Zero, t) | (t, Zero) if t != Wide => Some(t),
            (Const, Normal) | (Normal, Const) => Some(Normal),
            _ => None,
        }
    }
}

impl fmt::Display for RegisterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &'static str = self.into();
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_width() {
        assert_eq!(RegisterType::Wide.width(), 2);
        assert_eq!(RegisterType::Object.width(), 1);
        assert_eq!(RegisterType::Zero.width(), 1);
    }

    #[test]
    fn test_refine_identity() {
        for ty in RegisterType::iter() {
            assert_eq!(ty.refine(ty), Some(ty));
        }
    }

    #[test]
    fn test_refine_constants() {
        assert_eq!(
            RegisterType::Zero.refine(RegisterType::Object),
            Some(RegisterType::Object)
        );
        assert_eq!(
            RegisterType::Zero.refine(RegisterType::Const),
            Some(RegisterType::Const)
        );
        assert_eq!(
            RegisterType::Normal.refine(RegisterType::Const),
            Some(RegisterType::Normal)
        );
        assert_eq!(RegisterType::Zero.refine(RegisterType::Wide), None);
        assert_eq!(RegisterType::Const.refine(RegisterType::Object), None);
    }

    #[test]
    fn test_refine_commutative() {
        for a in RegisterType::iter() {
            for b in RegisterType::iter() {
                assert_eq!(a.refine(b), b.refine(a), "{a} / {b}");
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(RegisterType::Object.to_string(), "OBJECT");
        assert_eq!(RegisterType::Wide.to_string(), "WIDE");
    }
}
