//! Errors raised while configuring a manager.

use thiserror::Error;

/// Error type for manager construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BddError {
    /// A variable in an order is not below the number of variables.
    #[error("variable {var} is out of range for an order of {num_vars} variables")]
    VariableOutOfRange {
        /// Offending variable.
        var: u32,
        /// Length of the order.
        num_vars: usize,
    },
    /// A variable appears twice in an order.
    #[error("variable {0} appears more than once in the order")]
    DuplicateVariable(u32),
    /// The node store cannot hold the requested variables.
    #[error("no room for {num_vars} variables in the node store")]
    OutOfMemory {
        /// Requested number of variables.
        num_vars: usize,
    },
}

/// Result type for BDD operations.
pub type Result<T> = std::result::Result<T, BddError>;
