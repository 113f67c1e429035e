//! Fuzz target for the solvers
//!
//! Parses small specifications and checks that every strategy reaches the
//! monolithic verdict without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use swiss_aig::Circuit;
use swiss_game::{SolverConfig, SolverStrategy, solve_circuit};

/// Larger specifications make each run too slow to be useful
const MAX_VARS: usize = 24;

fuzz_target!(|data: &[u8]| {
    let Ok(mut circuit) = Circuit::from_bytes(data) else {
        return;
    };
    if circuit.maxvar() as usize > MAX_VARS {
        return;
    }

    let Ok(expected) = solve_circuit(&mut circuit, &SolverConfig::default(), false) else {
        return;
    };
    for strategy in SolverStrategy::ALL {
        let config = SolverConfig::default().with_strategy(strategy);
        let solved = solve_circuit(&mut circuit, &config, true).expect("solving a parsed circuit");
        assert_eq!(solved.is_realizable(), expected.is_realizable(), "{:?}", strategy);
    }
});
