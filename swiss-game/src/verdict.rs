//! Solver outcomes.

use swiss_aig::Lit;
use swiss_bdd::Bdd;

/// One diagram per controllable input, over latches and uncontrollable
/// inputs.
pub type Controller = Vec<(Lit, Bdd)>;

/// What a realizable game leaves behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Winning {
    /// Controller functions; empty when synthesis was not requested
    pub controller: Controller,
    /// Inductive winning region, when the strategy keeps one
    pub region: Option<Bdd>,
}

/// Outcome of a solver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The controller can keep the error output low forever
    Realizable(Box<Winning>),
    /// The environment can force the error output high
    Unrealizable,
}

impl Verdict {
    pub(crate) fn realizable(controller: Controller, region: Option<Bdd>) -> Self {
        Verdict::Realizable(Box::new(Winning { controller, region }))
    }

    /// Check if the controller wins.
    #[must_use]
    pub fn is_realizable(&self) -> bool {
        matches!(self, Verdict::Realizable(_))
    }

    /// The winning data, if realizable.
    #[must_use]
    pub fn winning(&self) -> Option<&Winning> {
        match self {
            Verdict::Realizable(winning) => Some(winning),
            Verdict::Unrealizable => None,
        }
    }

    /// Process exit status: `10` when realizable, `20` otherwise.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Verdict::Realizable(_) => 10,
            Verdict::Unrealizable => 20,
        }
    }
}
