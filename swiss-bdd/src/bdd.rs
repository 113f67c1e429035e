//! BDD handles.
//!
//! A [`Bdd`] names a function interned in a [`Manager`](crate::Manager):
//! the slot of its complement pair shifted left by one, with bit 0 marking
//! the complemented member. Negation therefore never touches the manager,
//! and a function and its negation share the same regular handle.

use std::fmt;
use std::ops::Not;

/// Slot of a complement pair in the manager's handle table.
pub type NodeIndex = u32;

/// A Boolean function, as a (possibly complemented) interned slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bdd(u32);

impl Bdd {
    /// The constant true function.
    pub const TRUE: Bdd = Bdd(0);

    /// The constant false function.
    pub const FALSE: Bdd = Bdd(1);

    /// Create a handle to `index`, complemented or not.
    #[must_use]
    pub(crate) const fn from_parts(index: NodeIndex, complemented: bool) -> Self {
        Self((index << 1) | complemented as u32)
    }

    /// Slot this handle points to.
    #[must_use]
    pub const fn index(self) -> NodeIndex {
        self.0 >> 1
    }

    /// Check if this handle carries a complement mark.
    #[must_use]
    pub const fn is_complemented(self) -> bool {
        (self.0 & 1) != 0
    }

    /// The uncomplemented handle of the same pair.
    ///
    /// `f` and `!f` have the same regular handle, which makes it the natural
    /// key for caches that can recover the polarity afterwards.
    #[must_use]
    pub const fn regular(self) -> Self {
        Self(self.0 & !1)
    }

    /// Check if this is one of the two constants.
    #[must_use]
    pub const fn is_constant(self) -> bool {
        self.index() == 0
    }

    /// Check if this is the constant true function.
    #[must_use]
    pub const fn is_true(self) -> bool {
        self.0 == Self::TRUE.0
    }

    /// Check if this is the constant false function.
    #[must_use]
    pub const fn is_false(self) -> bool {
        self.0 == Self::FALSE.0
    }

    /// Raw encoding, stable for the lifetime of the manager.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl Not for Bdd {
    type Output = Bdd;

    fn not(self) -> Bdd {
        Bdd(self.0 ^ 1)
    }
}

impl fmt::Display for Bdd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_constant(), self.is_true()) {
            (true, true) => write!(f, "true"),
            (true, false) => write!(f, "false"),
            _ if self.is_complemented() => write!(f, "~@{}", self.index()),
            _ => write!(f, "@{}", self.index()),
        }
    }
}
