//! Portfolio solving with parallel strategy execution
//!
//! Several solver configurations race on the same specification, each in
//! its own thread with its own circuit and diagram manager. The first
//! worker to finish claims the win and alone writes the output files; the
//! losers are abandoned and die with the process.
//!
//! Portfolios include:
//! - Every solver strategy under the configured ordering and substitution
//! - The monolithic solver under every static variable ordering

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::{Duration, Instant};

use swiss_aig::Circuit;
use swiss_game::{
    Outputs, SolverConfig, SolverStrategy, SynthError, VarOrdering, solve_circuit,
};
use tracing::debug;

use crate::CliError;

/// Strategy configuration for portfolio solving
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    /// Name of the strategy
    pub name: String,
    /// Solver configuration the worker runs
    pub config: SolverConfig,
}

impl StrategyConfig {
    /// A portfolio of one: the configuration as given
    pub fn single(config: SolverConfig) -> Self {
        Self {
            name: config.strategy.name().to_string(),
            config,
        }
    }
}

/// Result from a portfolio solver strategy
#[derive(Debug, Clone)]
pub struct PortfolioResult {
    /// Name of the strategy that found the result
    pub strategy_name: String,
    /// Process exit status for the verdict
    pub exit_code: i32,
    /// Time taken in milliseconds
    pub time_ms: u128,
}

/// Every solver strategy, sharing the rest of `base`
pub fn default_strategies(base: &SolverConfig) -> Vec<StrategyConfig> {
    SolverStrategy::ALL
        .into_iter()
        .map(|strategy| StrategyConfig::single(base.with_strategy(strategy)))
        .collect()
}

/// The monolithic solver under every variable ordering
pub fn ordering_strategies(base: &SolverConfig) -> Vec<StrategyConfig> {
    VarOrdering::ALL
        .into_iter()
        .map(|ordering| StrategyConfig {
            name: format!("monolithic-{:?}", ordering).to_lowercase(),
            config: base
                .with_strategy(SolverStrategy::Monolithic)
                .with_ordering(ordering),
        })
        .collect()
}

/// Run portfolio solving with the given strategies in parallel.
///
/// A `timeout_secs` of zero waits for the first answer however long it
/// takes.
pub fn solve_portfolio(
    spec: &Path,
    strategies: Vec<StrategyConfig>,
    outputs: &Outputs,
    timeout_secs: u64,
) -> Result<PortfolioResult, CliError> {
    if strategies.is_empty() {
        return Err(CliError::NoAnswer);
    }

    let spec: Arc<PathBuf> = Arc::new(spec.to_path_buf());
    let outputs = Arc::new(outputs.clone());
    type Report = Result<PortfolioResult, SynthError>;
    let (tx, rx): (Sender<Report>, Receiver<Report>) = channel();
    let solved = Arc::new(AtomicBool::new(false));

    for strategy in strategies {
        let tx = tx.clone();
        let spec = Arc::clone(&spec);
        let outputs = Arc::clone(&outputs);
        let solved = Arc::clone(&solved);

        thread::spawn(move || {
            let start = Instant::now();
            let attempt = Circuit::load(spec.as_path())
                .map_err(SynthError::from)
                .and_then(|mut circuit| {
                    solve_circuit(&mut circuit, &strategy.config, outputs.any())
                        .map(|result| (circuit, result))
                });

            // Only the first finisher writes files and reports
            if solved.swap(true, Ordering::SeqCst) {
                debug!(strategy = %strategy.name, "finished after the winner");
                return;
            }
            let report = attempt.and_then(|(mut circuit, result)| {
                result.emit(&mut circuit, &outputs)?;
                Ok(PortfolioResult {
                    strategy_name: strategy.name.clone(),
                    exit_code: result.verdict().exit_code(),
                    time_ms: start.elapsed().as_millis(),
                })
            });
            let _ = tx.send(report);
        });
    }

    // Drop the original sender so the channel closes when all threads finish
    drop(tx);

    let report = if timeout_secs > 0 {
        rx.recv_timeout(Duration::from_secs(timeout_secs))
            .map_err(|e| match e {
                std::sync::mpsc::RecvTimeoutError::Timeout => CliError::Timeout(timeout_secs),
                std::sync::mpsc::RecvTimeoutError::Disconnected => CliError::NoAnswer,
            })?
    } else {
        rx.recv().map_err(|_| CliError::NoAnswer)?
    };
    Ok(report?)
}
