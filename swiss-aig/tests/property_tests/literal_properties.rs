//! Property-based tests for the literal algebra
//!
//! Tests:
//! - Negation is an involution
//! - Stripping ignores polarity
//! - Primed indices are odd and shared by both polarities

use proptest::prelude::*;
use swiss_aig::Lit;

proptest! {
    /// Test that negating twice gives the original literal
    #[test]
    fn negation_involution(raw in 0u32..u32::MAX) {
        let lit = Lit::from_raw(raw);
        prop_assert_eq!(lit.negate().negate(), lit);
        prop_assert_ne!(lit.negate(), lit);
    }

    /// Test that stripping a literal and its negation agree
    #[test]
    fn strip_ignores_polarity(raw in 0u32..u32::MAX) {
        let lit = Lit::from_raw(raw);
        prop_assert_eq!(lit.negate().strip(), lit.strip());
        prop_assert!(!lit.strip().is_negated());
        prop_assert_eq!(lit.strip().var(), lit.var());
    }

    /// Test that the primed index is odd and one above the stripped literal
    #[test]
    fn primed_is_odd(raw in 0u32..(u32::MAX - 1)) {
        let lit = Lit::from_raw(raw);
        prop_assert_eq!(lit.primed() % 2, 1);
        prop_assert_eq!(lit.primed(), lit.strip().raw() + 1);
        prop_assert_eq!(lit.negate().primed(), lit.primed());
    }

    /// Test that positive/negative constructors agree with negation
    #[test]
    fn constructors_agree(var in 0u32..(u32::MAX >> 1)) {
        prop_assert_eq!(Lit::negative(var), Lit::positive(var).negate());
        prop_assert_eq!(Lit::positive(var).var(), var);
    }
}
