//! Property-based tests for synthesis
//!
//! Tests:
//! - Compiled diagrams evaluate like the diagrams
//! - Synthesized controllers come with unsatisfiable certificates
//! - Synthesized circuits have no controllable inputs left

use super::*;
use proptest::prelude::*;
use swiss_bdd::Manager;
use swiss_game::certificate::inductive_certificate;
use swiss_game::strategy::finalize;
use swiss_game::{AigCompiler, SolverConfig, SolverStrategy, solve_circuit};

proptest! {
    /// Test that compilation reproduces every function of four variables
    #[test]
    fn compile_matches_truth_table(table in any::<u16>()) {
        let mgr = Manager::new(10);
        let mut circuit = Circuit::new();
        for v in 1..=4 {
            circuit.add_input(Lit::positive(v), None).unwrap();
        }
        let value = |mask: u32, v: u32| mask & (1 << (v / 2 - 1)) != 0;
        let f = mgr.or_all((0u32..16).filter(|m| table & (1 << m) != 0).map(|m| {
            mgr.and_all((1..=4).map(|v| {
                let var = mgr.var(2 * v);
                if value(m, 2 * v) { var } else { !var }
            }))
        }));
        let mut compiler = AigCompiler::identity(&mgr, &circuit);
        let lit = compiler.compile(&mut circuit, f).unwrap();
        for mask in 0u32..16 {
            let expected = table & (1 << mask) != 0;
            prop_assert_eq!(mgr.eval(f, |v| value(mask, v)), expected);
            prop_assert_eq!(circuit.eval(lit, |l| value(mask, l.raw())), expected);
        }
    }

    /// Test that certificates of realizable runs have no satisfying assignment
    #[test]
    fn certificates_are_unsatisfiable(shape in game_strategy()) {
        for strategy in SolverStrategy::ALL {
            let mut circuit = shape.build();
            let config = SolverConfig { abs_threshold: 2, ..SolverConfig::default() }
                .with_strategy(strategy);
            let solved = solve_circuit(&mut circuit, &config, true).unwrap();
            let Some(winning) = solved.verdict().winning() else {
                continue;
            };
            let region = winning.region.unwrap();
            finalize(&mut circuit, solved.manager(), &winning.controller).unwrap();
            prop_assert_eq!(circuit.controllable_inputs().count(), 0);
            let cert = inductive_certificate(solved.manager(), &circuit, region).unwrap();
            prop_assert!(never_true(&cert, cert.output().unwrap()), "{:?}", strategy);
        }
    }

    /// Test that every strategy certifies its region when sub-games share control
    #[test]
    fn shared_control_certificates(shape in shared_control_strategy()) {
        for strategy in SolverStrategy::ALL {
            let mut circuit = shape.build();
            let config = SolverConfig::default().with_strategy(strategy);
            let solved = solve_circuit(&mut circuit, &config, true).unwrap();
            let Some(winning) = solved.verdict().winning() else {
                continue;
            };
            let region = winning.region.unwrap();
            finalize(&mut circuit, solved.manager(), &winning.controller).unwrap();
            let cert = inductive_certificate(solved.manager(), &circuit, region).unwrap();
            prop_assert!(never_true(&cert, cert.output().unwrap()), "{:?}", strategy);
        }
    }
}
