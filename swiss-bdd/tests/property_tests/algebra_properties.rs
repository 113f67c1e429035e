//! Property-based tests for the Boolean connectives
//!
//! Tests:
//! - BDDs evaluate like the expressions they were built from
//! - Canonicity: equivalent expressions give equal handles
//! - Order independence of the represented function
//! - Shannon decomposition

use super::*;
use proptest::prelude::*;
use swiss_bdd::{Bdd, Manager};

proptest! {
    /// Test that a built BDD agrees with the expression on every assignment
    #[test]
    fn build_matches_eval(e in expr_strategy()) {
        let mgr = Manager::new(NUM_VARS);
        let f = e.build(&mgr);
        for mask in all_masks() {
            prop_assert_eq!(eval_mask(&mgr, f, mask), e.eval(mask));
        }
    }

    /// Test that double negation is the identity on handles
    #[test]
    fn double_negation(e in expr_strategy()) {
        let mgr = Manager::new(NUM_VARS);
        let f = e.build(&mgr);
        prop_assert_eq!(!!f, f);
        prop_assert_eq!(mgr.node_count(f), mgr.node_count(!f));
    }

    /// Test that equivalent functions share a handle
    #[test]
    fn canonical_de_morgan(a in expr_strategy(), b in expr_strategy()) {
        let mgr = Manager::new(NUM_VARS);
        let (f, g) = (a.build(&mgr), b.build(&mgr));
        prop_assert_eq!(!mgr.or(f, g), mgr.and(!f, !g));
        prop_assert_eq!(mgr.and(f, g), mgr.and(g, f));
        prop_assert_eq!(mgr.ite(f, g, Bdd::FALSE), mgr.and(f, g));
    }

    /// Test that the support is exactly the set of variables the function depends on
    #[test]
    fn support_is_semantic(e in expr_strategy()) {
        let mgr = Manager::new(NUM_VARS);
        let f = e.build(&mgr);
        let support = mgr.support(f);
        for v in 0..NUM_VARS {
            let depends = all_masks().any(|m| e.eval(m) != e.eval(m ^ (1 << v)));
            prop_assert_eq!(support.contains(&v), depends);
        }
    }

    /// Test that the variable order changes sizes but not the function
    #[test]
    fn order_independence(e in expr_strategy()) {
        let natural = Manager::new(NUM_VARS);
        let reversed = Manager::with_order((0..NUM_VARS).rev().collect()).unwrap();
        let f = e.build(&natural);
        let g = e.build(&reversed);
        for mask in all_masks() {
            prop_assert_eq!(eval_mask(&natural, f, mask), eval_mask(&reversed, g, mask));
        }
        prop_assert_eq!(natural.support(f), reversed.support(g));
    }

    /// Test that decompose splits on the top variable of the support
    #[test]
    fn decompose_is_shannon(e in expr_strategy()) {
        let mgr = Manager::new(NUM_VARS);
        let f = e.build(&mgr);
        match mgr.decompose(f) {
            None => prop_assert!(f.is_constant()),
            Some((var, low, high)) => {
                prop_assert_eq!(Some(&var), mgr.support(f).first());
                prop_assert_eq!(mgr.ite(mgr.var(var), high, low), f);
                prop_assert!(!mgr.support(low).contains(&var));
                prop_assert!(!mgr.support(high).contains(&var));
            }
        }
    }
}
