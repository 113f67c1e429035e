//! swiss-game: Symbolic safety games and controller synthesis
//!
//! Given a circuit whose single output flags an error, this crate decides
//! whether the controllable inputs can keep the output low forever against
//! every behavior of the uncontrollable inputs, and if so builds a
//! controller.
//!
//! - **Games**: [`Game`] encodes a circuit with its error latch as decision
//!   diagrams; [`Game::subgame`] restricts it to the cone of a smaller error
//! - **Fixpoints**: [`Attractor`] computes the environment's attractor to
//!   the error states step by step
//! - **Strategies**: [`SolverStrategy`] selects monolithic solving,
//!   abstraction refinement, or one of three ways of recombining the
//!   sub-games found by [`decompose`]
//! - **Synthesis**: [`strategy::extract`] determinizes the winning moves and
//!   [`AigCompiler`] writes them back as AND gates
//! - **Certificates**: winning-region and inductive-certificate circuits
//!
//! # Examples
//!
//! ```rust
//! use swiss_aig::{Circuit, Lit};
//! use swiss_game::{SolverConfig, solve_circuit};
//!
//! // latch' = controllable input, output = latch
//! let text = "aag 2 1 1 1 0\n2\n4 2\n4\ni0 controllable_c\n";
//! let mut circuit = Circuit::from_bytes(text.as_bytes()).unwrap();
//!
//! let solved = solve_circuit(&mut circuit, &SolverConfig::default(), true).unwrap();
//! assert!(solved.is_realizable());
//! assert_eq!(solved.verdict().exit_code(), 10);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

/// Abstraction refinement over visible latches
pub mod abstraction;

/// Sub-game recombination strategies
pub mod aggregate;

/// Backward fixpoints
pub mod attractor;

/// Winning-region and certificate circuits
pub mod certificate;

/// Solver configuration
pub mod config;

/// Error-function decomposition
pub mod decompose;

/// Errors
pub mod error;

/// Games and sub-games
pub mod game;

/// End-to-end solving
pub mod pipeline;

/// Diagram manager and caches for one run
pub mod session;

/// Controller extraction and compilation
pub mod strategy;

/// Solver outcomes
pub mod verdict;

pub use attractor::{Attractor, Solution, Step};
pub use config::{
    DEFAULT_ABS_THRESHOLD, SolverConfig, SolverStrategy, Substitution, VarOrdering,
};
pub use error::{Result, SynthError};
pub use game::{Game, StateLatch, safe_restrict};
pub use pipeline::{Outputs, Solved, solve_circuit};
pub use session::{Session, SymbolicCache};
pub use strategy::AigCompiler;
pub use verdict::{Controller, Verdict, Winning};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
