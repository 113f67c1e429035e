//! Circuit and AIGER errors.

use thiserror::Error;

/// Error type for circuit construction and AIGER I/O.
#[derive(Error, Debug)]
pub enum AigerError {
    /// IO error when reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The header line is missing or malformed
    #[error("invalid AIGER header: {0}")]
    InvalidHeader(String),

    /// A body line could not be parsed
    #[error("line {line}: {message}")]
    Malformed {
        /// One-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// The file ended before all declared entries were read
    #[error("unexpected end of file while reading {0}")]
    UnexpectedEof(&'static str),

    /// A literal exceeds the declared maximum variable index
    #[error("literal {lit} exceeds maximum variable index {maxvar}")]
    LiteralOutOfRange {
        /// Offending literal
        lit: u32,
        /// Declared maximum variable index
        maxvar: u32,
    },

    /// A variable is defined twice, or an input/latch/gate is negated
    #[error("literal {0} cannot be defined here")]
    InvalidDefinition(u32),

    /// A synthesis specification must have exactly one output
    #[error("expected exactly one output, found {0}")]
    OutputCount(usize),

    /// Bad-state, constraint, justice or fairness sections are not supported
    #[error("unsupported AIGER section: {0}")]
    UnsupportedSection(String),

    /// Latches must reset to zero
    #[error("latch {0} has a non-zero reset value")]
    NonZeroReset(u32),

    /// A literal is referenced but never defined
    #[error("literal {0} is not defined in this circuit")]
    UnknownLiteral(u32),

    /// An AND gate reaches itself through its operands
    #[error("AND gate {0} depends on itself")]
    CyclicGate(u32),

    /// A literal expected to be an input is something else
    #[error("literal {0} is not an input")]
    NotAnInput(u32),

    /// The synthetic error latch must be removed before writing
    #[error("the error latch is still attached")]
    ErrorLatchAttached,
}

/// Result type for circuit operations
pub type Result<T> = std::result::Result<T, AigerError>;
