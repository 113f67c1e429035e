//! Property-based tests for solving
//!
//! Tests:
//! - Every strategy and substitution mode reaches the same verdict
//! - Shared control across sub-games does not change the verdict
//! - Attractor steps are monotone and terminate
//! - Decomposition preserves the error function
//! - The circuit is unchanged by solving

use super::*;
use proptest::prelude::*;
use swiss_game::decompose::split_error;
use swiss_game::{
    Attractor, Game, Session, SolverConfig, SolverStrategy, Step, Substitution, VarOrdering,
    solve_circuit,
};

proptest! {
    /// Test that all strategies agree with the monolithic solver
    #[test]
    fn strategies_agree(shape in game_strategy(), n_folds in 0usize..3) {
        let mut circuit = shape.build();
        let expected = solve_circuit(&mut circuit, &SolverConfig::default(), false)
            .unwrap()
            .is_realizable();
        for strategy in SolverStrategy::ALL {
            let config = SolverConfig {
                strategy,
                n_folds,
                abs_threshold: 2,
                ..SolverConfig::default()
            };
            let solved = solve_circuit(&mut circuit, &config, false).unwrap();
            prop_assert_eq!(solved.is_realizable(), expected, "{:?}", strategy);
        }
    }

    /// Test that all strategies agree when every sub-game reads the same
    /// controllable input
    #[test]
    fn strategies_agree_on_shared_control(shape in shared_control_strategy(), n_folds in 0usize..3) {
        let mut circuit = shape.build();
        let expected = solve_circuit(&mut circuit, &SolverConfig::default(), false)
            .unwrap()
            .is_realizable();
        let polarities: Vec<bool> = shape.guards.iter().map(|g| g.0).collect();
        prop_assert_eq!(expected, polarities.windows(2).all(|w| w[0] == w[1]));
        for strategy in SolverStrategy::ALL {
            let config = SolverConfig {
                strategy,
                n_folds,
                ..SolverConfig::default()
            };
            let solved = solve_circuit(&mut circuit, &config, false).unwrap();
            prop_assert_eq!(solved.is_realizable(), expected, "{:?}", strategy);
        }
    }

    /// Test that relational and functional substitution agree under every ordering
    #[test]
    fn substitution_modes_agree(shape in game_strategy()) {
        let mut circuit = shape.build();
        let mut verdicts = Vec::new();
        for ordering in VarOrdering::ALL {
            for substitution in [Substitution::Functional, Substitution::Relational] {
                let config = SolverConfig::default()
                    .with_ordering(ordering)
                    .with_substitution(substitution);
                verdicts.push(solve_circuit(&mut circuit, &config, false).unwrap().is_realizable());
            }
        }
        prop_assert!(verdicts.windows(2).all(|w| w[0] == w[1]));
    }

    /// Test that the losing region only grows and the fixpoint terminates
    #[test]
    fn attractor_monotone(shape in game_strategy()) {
        let mut circuit = shape.build();
        circuit.push_error_latch().unwrap();
        let session = Session::new(&circuit, VarOrdering::Natural).unwrap();
        let game = Game::new(&circuit, &session, Substitution::Functional).unwrap();
        let mgr = game.manager();
        let bound = 1usize << (shape.latches + 1);
        let mut attractor = Attractor::new(&game, None);
        let mut previous = attractor.losing();
        let mut steps = 0;
        while attractor.step() == Step::Grew {
            prop_assert!(mgr.leq(previous, attractor.losing()));
            prop_assert_ne!(previous, attractor.losing());
            previous = attractor.losing();
            steps += 1;
            prop_assert!(steps <= bound);
        }
        prop_assert!(mgr.leq(previous, attractor.losing()));
    }

    /// Test that the disjunction of the split errors is the error function
    #[test]
    fn decomposition_round_trip(shape in game_strategy(), n_folds in 0usize..3) {
        let mut circuit = shape.build();
        circuit.push_error_latch().unwrap();
        let session = Session::new(&circuit, VarOrdering::Natural).unwrap();
        let game = Game::new(&circuit, &session, Substitution::Functional).unwrap();
        let errors = split_error(&game, n_folds);
        if !errors.is_empty() {
            let error = game.lit2bdd(circuit.error_latch().unwrap().next);
            prop_assert_eq!(game.manager().or_all(errors), error);
        }
    }

    /// Test that solving leaves the circuit as it was
    #[test]
    fn solving_restores_circuit(shape in game_strategy()) {
        let mut circuit = shape.build();
        let before = circuit.to_ascii().unwrap();
        for strategy in SolverStrategy::ALL {
            let config = SolverConfig::default().with_strategy(strategy);
            solve_circuit(&mut circuit, &config, true).unwrap();
            prop_assert_eq!(circuit.to_ascii().unwrap(), before.clone());
        }
    }
}
