//! Property-based tests for swiss-aig
//!
//! Random layered circuits are generated and checked for literal algebra,
//! dependency closure and AIGER round-trip properties.

mod circuit_properties;
mod literal_properties;

use proptest::prelude::*;
use swiss_aig::{Circuit, Lit};

/// Description of a random circuit: inputs, latches, and gates whose
/// operands index into everything defined before them
#[derive(Debug, Clone)]
pub struct Shape {
    pub inputs: u32,
    pub latches: u32,
    pub gates: Vec<(u32, bool, u32, bool)>,
    pub nexts: Vec<(u32, bool)>,
    pub output: (u32, bool),
}

impl Shape {
    /// Build the circuit, naming every other input `controllable_*`
    pub fn build(&self) -> Circuit {
        let mut c = Circuit::new();
        for k in 0..self.inputs {
            let name = if k % 2 == 0 {
                format!("controllable_{k}")
            } else {
                format!("env_{k}")
            };
            c.add_input(Lit::positive(k + 1), Some(name)).unwrap();
        }
        let base = self.inputs + self.latches;
        let pick = |index: u32, negated: bool, limit: u32| {
            Lit::positive(index % limit + 1).with_sign(negated)
        };
        for (k, &(a, na, b, nb)) in self.gates.iter().enumerate() {
            let limit = base + k as u32;
            c.add_and(
                Lit::positive(base + k as u32 + 1),
                pick(a, na, limit),
                pick(b, nb, limit),
            )
            .unwrap();
        }
        let total = base + self.gates.len() as u32;
        for k in 0..self.latches {
            let (n, neg) = self.nexts[k as usize];
            c.add_latch(
                Lit::positive(self.inputs + k + 1),
                pick(n, neg, total),
                None,
            )
            .unwrap();
        }
        let (o, neg) = self.output;
        c.add_output(pick(o, neg, total), None);
        c
    }

    /// Number of base (input and latch) variables
    pub fn num_base(&self) -> u32 {
        self.inputs + self.latches
    }
}

/// Strategy for generating small circuits
pub fn shape_strategy() -> impl Strategy<Value = Shape> {
    (1u32..4, 0u32..3).prop_flat_map(|(inputs, latches)| {
        (
            Just(inputs),
            Just(latches),
            proptest::collection::vec(
                (any::<u32>(), any::<bool>(), any::<u32>(), any::<bool>()),
                0..8,
            ),
            proptest::collection::vec((any::<u32>(), any::<bool>()), latches as usize),
            (any::<u32>(), any::<bool>()),
        )
            .prop_map(|(inputs, latches, gates, nexts, output)| Shape {
                inputs,
                latches,
                gates,
                nexts,
                output,
            })
    })
}

/// Evaluate with base variable `v` set to bit `v - 1` of `mask`
pub fn eval_mask(c: &Circuit, lit: Lit, mask: u32) -> bool {
    c.eval(lit, |l| mask & (1 << (l.var() - 1)) != 0)
}
