//! AIGER literals.
//!
//! A literal is twice a variable index, plus one when negated. Literal `0`
//! is the constant false and `1` the constant true.

use std::fmt;
use std::ops::Not;

/// An AIGER variable index (a literal shifted right by one).
pub type Var = u32;

/// A literal (possibly negated AIGER variable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Lit(u32);

impl Lit {
    /// The constant false literal.
    pub const FALSE: Lit = Lit(0);

    /// The constant true literal.
    pub const TRUE: Lit = Lit(1);

    /// Create a positive literal from a variable.
    #[must_use]
    pub const fn positive(var: Var) -> Self {
        Self(var << 1)
    }

    /// Create a negative literal from a variable.
    #[must_use]
    pub const fn negative(var: Var) -> Self {
        Self((var << 1) | 1)
    }

    /// Get the variable of this literal.
    #[must_use]
    pub const fn var(self) -> Var {
        self.0 >> 1
    }

    /// Check if this literal is negated.
    #[must_use]
    pub const fn is_negated(self) -> bool {
        (self.0 & 1) != 0
    }

    /// Get the negation of this literal.
    #[must_use]
    pub const fn negate(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// The positive literal of the same variable.
    #[must_use]
    pub const fn strip(self) -> Self {
        Self(self.0 & !1)
    }

    /// Negate the literal iff `negated` holds.
    #[must_use]
    pub const fn with_sign(self, negated: bool) -> Self {
        Self(self.0 ^ negated as u32)
    }

    /// Check if this is one of the two constants.
    #[must_use]
    pub const fn is_constant(self) -> bool {
        self.0 < 2
    }

    /// Index of the "next-state" copy of this literal's variable, as used by
    /// relational encodings: the stripped literal plus one.
    #[must_use]
    pub const fn primed(self) -> u32 {
        (self.0 & !1) + 1
    }

    /// Get the raw value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Create from raw value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

impl Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        self.negate()
    }
}

impl From<bool> for Lit {
    fn from(value: bool) -> Self {
        if value { Lit::TRUE } else { Lit::FALSE }
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
