//! Synthesis errors.

use swiss_aig::AigerError;
use swiss_bdd::BddError;
use thiserror::Error;

/// Error type for solving and synthesis.
#[derive(Error, Debug)]
pub enum SynthError {
    /// Reading or writing a circuit failed
    #[error(transparent)]
    Aiger(#[from] AigerError),

    /// The decision-diagram manager could not be configured
    #[error(transparent)]
    Bdd(#[from] BddError),

    /// A diagram refers to a variable with no input or latch behind it
    #[error("BDD variable {0} has no counterpart in the circuit")]
    UnknownVariable(u32),

    /// A game was built over a circuit without the error latch
    #[error("the circuit has no error latch attached")]
    MissingErrorLatch,

    /// A certificate was requested from a strategy that keeps no winning region
    #[error("the solver did not produce a winning region")]
    MissingRegion,
}

/// Result type for synthesis operations
pub type Result<T> = std::result::Result<T, SynthError>;
