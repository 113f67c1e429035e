//! swiss-aig: And-Inverter Graphs for safety-game synthesis
//!
//! This crate provides the circuit side of the synthesis pipeline:
//! - **Literals**: AIGER literal algebra ([`Lit`])
//! - **Circuits**: an append-only AND-inverter graph with latches and
//!   controllable/uncontrollable inputs ([`Circuit`])
//! - **AIGER I/O**: ASCII and binary readers and writers
//! - **Cone analysis**: one-step dependency closures
//!   ([`Circuit::lit_deps`]) and wide-AND flattening
//!   ([`Circuit::n_input_and`])
//!
//! Inputs whose symbol starts with `controllable` are driven by the
//! controller, every other input by the environment.
//!
//! # Examples
//!
//! ```rust
//! use swiss_aig::{Circuit, Lit};
//!
//! let text = "aag 3 2 0 1 1\n2\n4\n6\n6 2 5\ni0 controllable_x\ni1 y\n";
//! let mut circuit = Circuit::from_bytes(text.as_bytes()).unwrap();
//! assert_eq!(circuit.controllable_inputs().count(), 1);
//!
//! // Reify the output as a latch, then detach it again
//! let error = circuit.push_error_latch().unwrap();
//! assert_eq!(error, Lit::from_raw(8));
//! circuit.pop_error_latch();
//! assert_eq!(circuit.maxvar(), 3);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

/// AIGER reader and writer
pub mod aiger;

/// The AND-inverter graph
pub mod circuit;

/// Errors
pub mod error;

/// Literals
pub mod literal;

pub use aiger::{Format, parse};
pub use circuit::{
    AndGate, CONTROLLABLE_PREFIX, Circuit, Conjuncts, ERROR_LATCH_NAME, Input, Latch, LitSet,
    Output,
};
pub use error::{AigerError, Result};
pub use literal::{Lit, Var};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
