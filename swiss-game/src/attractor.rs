//! Backward reachability: the environment's attractor to the error states.

use swiss_bdd::{Bdd, Manager};
use tracing::{debug, info, trace};

use crate::error::Result;
use crate::game::Game;
use crate::strategy;
use crate::verdict::Verdict;

/// Outcome of a single fixpoint step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The losing region grew and still misses the initial state
    Grew,
    /// The losing region is a fixpoint
    Stable,
    /// The losing region contains the initial state
    HitInit,
}

type Operator<'g> = Box<dyn FnMut(Bdd) -> (Bdd, Bdd) + 'g>;

/// A least fixpoint `L ∪ op(L)` computed one step at a time.
///
/// The operator returns the predecessors of `L` and the transitions it
/// substituted to find them; the last transitions seen are kept as the
/// losing transitions.
pub struct Attractor<'g> {
    mgr: &'g Manager,
    op: Operator<'g>,
    init: Bdd,
    losing: Bdd,
    losing_transitions: Bdd,
    iterations: usize,
    state: Option<Step>,
}

impl<'g> Attractor<'g> {
    /// The attractor of `game` through [`Game::upre`], started from `start`
    /// or the error states.
    pub fn new(game: &'g Game<'_>, start: Option<Bdd>) -> Self {
        let start = start.unwrap_or_else(|| game.error_states());
        Self::with_operator(game.manager(), game.init_state(), start, move |l| game.upre(l))
    }

    /// A fixpoint with a custom predecessor operator.
    pub fn with_operator(
        mgr: &'g Manager,
        init: Bdd,
        start: Bdd,
        op: impl FnMut(Bdd) -> (Bdd, Bdd) + 'g,
    ) -> Self {
        let state = mgr.intersects(init, start).then_some(Step::HitInit);
        Self {
            mgr,
            op: Box::new(op),
            init,
            losing: start,
            losing_transitions: Bdd::FALSE,
            iterations: 0,
            state,
        }
    }

    /// Current losing region.
    #[must_use]
    pub fn losing(&self) -> Bdd {
        self.losing
    }

    /// Number of steps that grew the region.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Advance one step. Once `Stable` or `HitInit`, further calls return
    /// the same outcome without work.
    pub fn step(&mut self) -> Step {
        if let Some(done) = self.state {
            return done;
        }
        let (pre, trans) = (self.op)(self.losing);
        self.losing_transitions = trans;
        let next = self.mgr.or(self.losing, pre);
        if next == self.losing {
            self.state = Some(Step::Stable);
            return Step::Stable;
        }
        self.losing = next;
        self.iterations += 1;
        trace!(
            iteration = self.iterations,
            nodes = self.mgr.node_count(next),
            "losing region grew"
        );
        if self.mgr.intersects(self.init, next) {
            self.state = Some(Step::HitInit);
            return Step::HitInit;
        }
        Step::Grew
    }

    /// Step to the end.
    pub fn run(mut self) -> Solution {
        let last = loop {
            match self.step() {
                Step::Grew => continue,
                done => break done,
            }
        };
        Solution {
            realizable: last == Step::Stable,
            losing: self.losing,
            losing_transitions: self.losing_transitions,
            iterations: self.iterations,
        }
    }
}

/// Result of a complete fixpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    /// The fixpoint missed the initial state
    pub realizable: bool,
    /// The losing region reached
    pub losing: Bdd,
    /// Transitions into `losing` from the last step
    pub losing_transitions: Bdd,
    /// Number of steps that grew the region
    pub iterations: usize,
}

/// Run the attractor of `game` from `start` (default: the error states).
pub fn solve(game: &Game<'_>, start: Option<Bdd>) -> Solution {
    let solution = Attractor::new(game, start).run();
    debug!(
        realizable = solution.realizable,
        iterations = solution.iterations,
        "fixpoint done"
    );
    solution
}

/// Solve `game` in one fixpoint and extract a controller if asked.
pub fn solve_monolithic(game: &Game<'_>, synthesize: bool) -> Result<Verdict> {
    let solution = solve(game, None);
    info!(
        realizable = solution.realizable,
        iterations = solution.iterations,
        "monolithic game solved"
    );
    if !solution.realizable {
        return Ok(Verdict::Unrealizable);
    }
    let controller = if synthesize {
        strategy::extract(game, !solution.losing_transitions, !solution.losing)
    } else {
        Vec::new()
    };
    Ok(Verdict::realizable(controller, Some(!solution.losing)))
}
