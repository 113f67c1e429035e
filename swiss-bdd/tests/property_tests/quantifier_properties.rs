//! Property-based tests for quantification, cofactors and substitution
//!
//! Tests:
//! - Quantifiers against brute-force expansion
//! - Relational product against its two-step definition
//! - Restrict agrees with the original function on the care set
//! - Vector composition against evaluation

use super::*;
use proptest::prelude::*;
use swiss_bdd::{Bdd, Manager};

/// Brute-force quantification of the variables in `vars` over `mask`
fn quantified(e: &Expr, mask: u32, vars: &[u32], universal: bool) -> bool {
    let mut values = (0..(1u32 << vars.len())).map(|bits| {
        let mut m = mask;
        for (i, v) in vars.iter().enumerate() {
            if bits & (1 << i) != 0 {
                m |= 1 << v;
            } else {
                m &= !(1 << v);
            }
        }
        e.eval(m)
    });
    if universal {
        values.all(|b| b)
    } else {
        values.any(|b| b)
    }
}

proptest! {
    /// Test that exists and forall match brute-force expansion
    #[test]
    fn quantifiers_match_expansion(e in expr_strategy(), set in var_set_strategy()) {
        let mgr = Manager::new(NUM_VARS);
        let f = e.build(&mgr);
        let vars = vars_of(set);
        let cube = mgr.cube(vars.iter().copied());
        let ex = mgr.exists(f, cube);
        let all = mgr.forall(f, cube);
        for mask in all_masks() {
            prop_assert_eq!(eval_mask(&mgr, ex, mask), quantified(&e, mask, &vars, false));
            prop_assert_eq!(eval_mask(&mgr, all, mask), quantified(&e, mask, &vars, true));
        }
        for v in &vars {
            prop_assert!(!mgr.support(ex).contains(v));
        }
    }

    /// Test that the relational product equals quantifying the conjunction
    #[test]
    fn and_exists_is_relational_product(
        a in expr_strategy(),
        b in expr_strategy(),
        set in var_set_strategy()
    ) {
        let mgr = Manager::new(NUM_VARS);
        let (f, g) = (a.build(&mgr), b.build(&mgr));
        let cube = mgr.cube(vars_of(set));
        prop_assert_eq!(mgr.and_exists(f, g, cube), mgr.exists(mgr.and(f, g), cube));
    }

    /// Test that restrict agrees with the function wherever the care set holds
    #[test]
    fn restrict_agrees_on_care(a in expr_strategy(), b in expr_strategy()) {
        let mgr = Manager::new(NUM_VARS);
        let (f, care) = (a.build(&mgr), b.build(&mgr));
        let r = mgr.restrict(f, care);
        prop_assert_eq!(mgr.and(r, care), mgr.and(f, care));
        let fs = mgr.support(f);
        for v in mgr.support(r) {
            prop_assert!(fs.contains(&v));
        }
    }

    /// Test that cofactoring by a literal fixes that variable
    #[test]
    fn cofactor_fixes_variable(e in expr_strategy(), v in 0..NUM_VARS, value in any::<bool>()) {
        let mgr = Manager::new(NUM_VARS);
        let f = e.build(&mgr);
        let c = mgr.cofactor_var(f, v, value);
        for mask in all_masks() {
            let fixed = if value { mask | (1 << v) } else { mask & !(1 << v) };
            prop_assert_eq!(eval_mask(&mgr, c, mask), e.eval(fixed));
        }
    }

    /// Test that vector composition evaluates like substituting values
    #[test]
    fn vector_compose_matches_eval(
        e in expr_strategy(),
        subs in proptest::collection::vec(expr_strategy(), NUM_VARS as usize)
    ) {
        let mgr = Manager::new(NUM_VARS);
        let f = e.build(&mgr);
        let vector: Vec<Bdd> = subs.iter().map(|s| s.build(&mgr)).collect();
        let composed = mgr.vector_compose(f, &vector);
        for mask in all_masks() {
            let inner = (0..NUM_VARS)
                .filter(|&v| subs[v as usize].eval(mask))
                .fold(0u32, |m, v| m | (1 << v));
            prop_assert_eq!(eval_mask(&mgr, composed, mask), e.eval(inner));
        }
    }
}
