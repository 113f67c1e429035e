//! Property-based tests for circuits
//!
//! Tests:
//! - Dependency closures are idempotent and closed
//! - ASCII and binary round trips preserve behaviour
//! - Gate construction folds constants soundly
//! - Wide-AND flattening preserves the conjunction

use super::*;
use proptest::prelude::*;
use swiss_aig::{Circuit, Lit};

proptest! {
    /// Test that dependencies of dependencies stay inside the original set
    #[test]
    fn lit_deps_closed(shape in shape_strategy()) {
        let mut c = shape.build();
        c.push_error_latch().unwrap();
        let root = c.error_latch().unwrap().next;
        let deps = c.lit_deps(root);
        prop_assert_eq!(&*c.lit_deps(root), &*deps);
        for &d in deps.iter() {
            let inner = c.lit_deps(d);
            prop_assert!(inner.is_subset(&deps));
        }
        for &d in deps.iter() {
            prop_assert!(c.input(d).is_some() || c.latch(d).is_some() || c.is_error_latch(d));
        }
    }

    /// Test that flipping a base variable outside the closure never changes the output
    #[test]
    fn lit_deps_covers_support(shape in shape_strategy(), mask in any::<u32>()) {
        let c = shape.build();
        let out = c.output().unwrap();
        let deps = c.lit_deps(out);
        let n = shape.num_base();
        let mask = mask & ((1u32 << n) - 1);
        for v in (1..=n).filter(|&v| !deps.contains(&Lit::positive(v))) {
            prop_assert_eq!(eval_mask(&c, out, mask), eval_mask(&c, out, mask ^ (1 << (v - 1))));
        }
    }

    /// Test that writing and reading ASCII keeps the circuit identical
    #[test]
    fn ascii_round_trip(shape in shape_strategy()) {
        let c = shape.build();
        let text = c.to_ascii().unwrap();
        let d = Circuit::from_bytes(text.as_bytes()).unwrap();
        prop_assert_eq!(d.to_ascii().unwrap(), text);
        prop_assert_eq!(d.controllable_inputs().count(), c.controllable_inputs().count());
    }

    /// Test that binary round trips preserve the output and next functions
    #[test]
    fn binary_round_trip(shape in shape_strategy()) {
        let c = shape.build();
        let d = Circuit::from_bytes(&c.to_binary().unwrap()).unwrap();
        prop_assert_eq!(d.inputs().len(), c.inputs().len());
        prop_assert_eq!(d.latches().len(), c.latches().len());
        for mask in 0..(1u32 << shape.num_base()) {
            prop_assert_eq!(
                eval_mask(&c, c.output().unwrap(), mask),
                eval_mask(&d, d.output().unwrap(), mask)
            );
            for (lc, ld) in c.latches().iter().zip(d.latches()) {
                prop_assert_eq!(eval_mask(&c, lc.next, mask), eval_mask(&d, ld.next, mask));
            }
        }
    }

    /// Test that optimized gates compute the conjunction
    #[test]
    fn optimized_gate_is_and(shape in shape_strategy(), a in any::<u32>(), b in any::<u32>(),
                             na in any::<bool>(), nb in any::<bool>()) {
        let mut c = shape.build();
        let n = shape.num_base();
        let pick = |x: u32, neg: bool| {
            if x % 5 == 0 { Lit::from(neg) } else { Lit::positive(x % n + 1).with_sign(neg) }
        };
        let (la, lb) = (pick(a, na), pick(b, nb));
        let g = c.optimized_gate(la, lb);
        for mask in 0..(1u32 << n) {
            prop_assert_eq!(
                eval_mask(&c, g, mask),
                eval_mask(&c, la, mask) && eval_mask(&c, lb, mask)
            );
        }
    }

    /// Test that a flattened wide AND evaluates like the gate it came from
    #[test]
    fn n_input_and_preserves_conjunction(shape in shape_strategy()) {
        let c = shape.build();
        for gate in c.gates() {
            let flat = c.n_input_and(gate.lhs).unwrap();
            for mask in 0..(1u32 << shape.num_base()) {
                let wide = flat.operands.iter().all(|&o| eval_mask(&c, o, mask));
                prop_assert_eq!(wide, eval_mask(&c, gate.lhs, mask));
            }
            for b in &flat.negated_ands {
                prop_assert!(!b.is_negated());
                prop_assert!(c.gate(*b).is_some());
                prop_assert!(flat.operands.contains(&b.negate()));
            }
        }
    }
}
