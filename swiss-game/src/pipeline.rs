//! End-to-end solving of one circuit.

use std::path::PathBuf;

use swiss_aig::{Circuit, Lit};
use swiss_bdd::Manager;
use tracing::info;

use crate::config::{SolverConfig, SolverStrategy};
use crate::error::{Result, SynthError};
use crate::game::Game;
use crate::session::Session;
use crate::verdict::Verdict;
use crate::{abstraction, aggregate, attractor, certificate, strategy};

impl SolverStrategy {
    /// Solve `game` with this strategy.
    ///
    /// Controllers are only extracted when `synthesize` is set.
    pub fn solve(self, game: &Game<'_>, config: &SolverConfig, synthesize: bool) -> Result<Verdict> {
        info!(strategy = self.name(), "solving");
        match self {
            SolverStrategy::Monolithic => attractor::solve_monolithic(game, synthesize),
            SolverStrategy::Abstraction => {
                abstraction::solve(game, config.abs_threshold, synthesize)
            }
            SolverStrategy::Aggregate => aggregate::solve_aggregate(game, config.n_folds, synthesize),
            SolverStrategy::Greedy => aggregate::solve_greedy(game, config.n_folds, synthesize),
            SolverStrategy::LocalGlobal => {
                aggregate::solve_local_global(game, config.n_folds, synthesize)
            }
        }
    }
}

/// Where to write the results of a realizable run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outputs {
    /// Circuit with the controller spliced in
    pub controller: Option<PathBuf>,
    /// Winning region over the latches
    pub winning_region: Option<PathBuf>,
    /// Inductive certificate of the winning region
    pub certificate: Option<PathBuf>,
    /// Write the controller circuit with the controllable signals as its
    /// outputs instead of the error monitor
    pub only_transducer: bool,
}

impl Outputs {
    /// Check if anything is to be written.
    #[must_use]
    pub fn any(&self) -> bool {
        self.controller.is_some() || self.winning_region.is_some() || self.certificate.is_some()
    }
}

/// A solved circuit: its verdict and the session its diagrams live in.
#[derive(Debug)]
pub struct Solved {
    session: Session,
    verdict: Verdict,
}

/// Solve `circuit` according to `config`.
///
/// The error latch is attached for the run and detached again, so the
/// circuit is unchanged on return. A returned winning region no longer
/// mentions the error latch.
pub fn solve_circuit(
    circuit: &mut Circuit,
    config: &SolverConfig,
    synthesize: bool,
) -> Result<Solved> {
    let error_latch = circuit.push_error_latch()?;
    let session = Session::new(circuit, config.ordering)?;
    let verdict = Game::new(circuit, &session, config.substitution)
        .and_then(|game| config.strategy.solve(&game, config, synthesize));
    circuit.pop_error_latch();
    let verdict = match verdict? {
        Verdict::Realizable(mut winning) => {
            winning.region = winning
                .region
                .map(|r| session.manager().cofactor_var(r, error_latch.raw(), false));
            Verdict::Realizable(winning)
        }
        Verdict::Unrealizable => Verdict::Unrealizable,
    };
    info!(
        realizable = verdict.is_realizable(),
        nodes = session.manager().stats().nodes,
        "circuit solved"
    );
    Ok(Solved { session, verdict })
}

impl Solved {
    /// The verdict.
    #[must_use]
    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// Check if the controller wins.
    #[must_use]
    pub fn is_realizable(&self) -> bool {
        self.verdict.is_realizable()
    }

    /// The manager the verdict's diagrams belong to.
    #[must_use]
    pub fn manager(&self) -> &Manager {
        self.session.manager()
    }

    /// Splice the controller into `circuit` and write what `outputs` asks
    /// for. Does nothing for an unrealizable verdict.
    pub fn emit(&self, circuit: &mut Circuit, outputs: &Outputs) -> Result<()> {
        let Some(winning) = self.verdict.winning() else {
            return Ok(());
        };
        let mgr = self.session.manager();
        if let Some(path) = &outputs.winning_region {
            let region = winning.region.ok_or(SynthError::MissingRegion)?;
            certificate::winning_region_circuit(mgr, circuit, region)?.write(path)?;
            info!(path = %path.display(), "winning region written");
        }
        if outputs.controller.is_none() && outputs.certificate.is_none() {
            return Ok(());
        }
        let controls: Vec<(Lit, Option<String>)> = circuit
            .controllable_inputs()
            .map(|i| (i.lit, i.name.clone()))
            .collect();
        strategy::finalize(circuit, mgr, &winning.controller)?;
        if let Some(path) = &outputs.certificate {
            let region = winning.region.ok_or(SynthError::MissingRegion)?;
            certificate::inductive_certificate(mgr, circuit, region)?.write(path)?;
            info!(path = %path.display(), "inductive certificate written");
        }
        if let Some(path) = &outputs.controller {
            if outputs.only_transducer {
                keep_transducer(circuit, controls);
            }
            circuit.write(path)?;
            info!(path = %path.display(), "controller written");
        }
        Ok(())
    }
}

/// Replace the outputs of a finalized circuit by the former controllable
/// inputs, now driven by the controller.
fn keep_transducer(circuit: &mut Circuit, controls: Vec<(Lit, Option<String>)>) {
    circuit.remove_outputs();
    for (lit, name) in controls {
        circuit.add_output(lit, name);
    }
}
