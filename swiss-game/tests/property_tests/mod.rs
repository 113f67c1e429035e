//! Property-based tests for swiss-game
//!
//! Random small safety games are solved under every strategy and checked
//! against each other and against exhaustive simulation.

mod solver_properties;
mod synthesis_properties;

use proptest::prelude::*;
use swiss_aig::{Circuit, Lit};

/// Description of a random game: inputs, latches, and gates whose operands
/// index into everything defined before them
#[derive(Debug, Clone)]
pub struct GameShape {
    pub inputs: u32,
    pub latches: u32,
    pub gates: Vec<(u32, bool, u32, bool)>,
    pub nexts: Vec<(u32, bool)>,
    pub output: (u32, bool),
}

impl GameShape {
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
            c.add_latch(Lit::positive(self.inputs + k + 1), pick(n, neg, total), None)
                .unwrap();
        }
        let (o, neg) = self.output;
        c.add_output(pick(o, neg, total), None);
        c
    }
}

/// Strategy for generating small games
pub fn game_strategy() -> impl Strategy<Value = GameShape> {
    (1u32..4, 0u32..4).prop_flat_map(|(inputs, latches)| {
        (
            Just(inputs),
            Just(latches),
            proptest::collection::vec(
                (any::<u32>(), any::<bool>(), any::<u32>(), any::<bool>()),
                0..10,
            ),
            proptest::collection::vec((any::<u32>(), any::<bool>()), latches as usize),
            (any::<u32>(), any::<bool>()),
        )
            .prop_map(|(inputs, latches, gates, nexts, output)| GameShape {
                inputs,
                latches,
                gates,
                nexts,
                output,
            })
    })
}

/// Latches guarded by one shared controllable input: `l_i' = c^p_i ∧ u_i^q_i`,
/// optionally sticky (`∨ l_i`), with the output `∨ l_i`
#[derive(Debug, Clone)]
pub struct SharedControlShape {
    pub guards: Vec<(bool, bool, bool)>,
}

impl SharedControlShape {
    pub fn build(&self) -> Circuit {
        let k = self.guards.len() as u32;
        let mut c = Circuit::new();
        let shared = Lit::positive(1);
        c.add_input(shared, Some("controllable_shared".into())).unwrap();
        for i in 0..k {
            c.add_input(Lit::positive(i + 2), Some(format!("env_{i}"))).unwrap();
        }
        let latch = |i: u32| Lit::positive(k + i + 2);
        let mut var = 2 * k + 1;
        let mut gate = |c: &mut Circuit, a: Lit, b: Lit| {
            var += 1;
            c.add_and(Lit::positive(var), a, b).unwrap();
            Lit::positive(var)
        };
        let mut nexts = Vec::new();
        for (i, &(p, q, sticky)) in self.guards.iter().enumerate() {
            let i = i as u32;
            let env = Lit::positive(i + 2);
            let guarded = gate(&mut c, shared.with_sign(p), env.with_sign(q));
            let next = if sticky {
                !gate(&mut c, !guarded, !latch(i))
            } else {
                guarded
            };
            nexts.push(next);
        }
        let mut none = !latch(0);
        for i in 1..k {
            none = gate(&mut c, none, !latch(i));
        }
        for (i, next) in nexts.into_iter().enumerate() {
            c.add_latch(latch(i as u32), next, None).unwrap();
        }
        c.add_output(!none, None);
        c
    }
}

/// Strategy for games whose sub-games all share their control
pub fn shared_control_strategy() -> impl Strategy<Value = SharedControlShape> {
    proptest::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 2..5)
        .prop_map(|guards| SharedControlShape { guards })
}

/// Check that `lit` is false for every assignment of the inputs of `c`
pub fn never_true(c: &Circuit, lit: Lit) -> bool {
    let bases: Vec<Lit> = c.inputs().iter().map(|i| i.lit).collect();
    (0u32..(1 << bases.len())).all(|mask| {
        !c.eval(lit, |l| {
            bases
                .iter()
                .position(|&b| b == l)
                .is_some_and(|k| mask & (1 << k) != 0)
        })
    })
}
