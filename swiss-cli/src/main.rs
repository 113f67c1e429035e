//! AbsSynthe CLI - safety-game realizability and controller synthesis for
//! AIGER specifications

mod portfolio;

use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{Shell, generate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use swiss_aig::Circuit;
use swiss_game::{
    DEFAULT_ABS_THRESHOLD, Outputs, SolverConfig, SolverStrategy, Substitution, SynthError,
    VarOrdering, solve_circuit,
};
use thiserror::Error;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use portfolio::{StrategyConfig, solve_portfolio};

/// Exit status for fatal errors
const EXIT_STATUS_ERROR: i32 = 1;

/// Errors reported by the command line front end
#[derive(Error, Debug)]
pub enum CliError {
    /// Solving or writing failed
    #[error(transparent)]
    Synth(#[from] SynthError),
    /// No specification file was given
    #[error("no specification file given")]
    MissingSpec,
    /// No worker answered within the time limit
    #[error("no answer within {0} seconds")]
    Timeout(u64),
    /// Every worker stopped without answering
    #[error("all solver workers stopped without an answer")]
    NoAnswer,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CliConfig {
    /// Default verbosity level
    #[serde(default)]
    verbosity: Option<String>,
    /// Default compositional algorithm (1, 2 or 3)
    #[serde(default)]
    comp_algo: Option<u8>,
    /// Use abstraction by default
    #[serde(default)]
    use_abs: Option<bool>,
    /// Default number of decomposition folds
    #[serde(default)]
    n_folds: Option<usize>,
    /// Default abstraction threshold
    #[serde(default)]
    abs_threshold: Option<usize>,
    /// Default variable ordering
    #[serde(default)]
    ordering: Option<String>,
    /// Enable the parallel portfolio by default
    #[serde(default)]
    parallel: Option<bool>,
}

impl CliConfig {
    /// Load configuration from file
    fn load() -> Self {
        let config_path = dirs::home_dir()
            .map(|mut p| {
                p.push(".abssyntherc");
                p
            })
            .filter(|p| p.exists())
            .or_else(|| {
                dirs::config_dir().map(|mut p| {
                    p.push("abssynthe");
                    p.push("config.yaml");
                    p
                })
            });

        if let Some(path) = config_path
            && path.exists()
            && let Ok(contents) = fs::read_to_string(&path)
            && let Ok(config) = serde_yaml::from_str(&contents)
        {
            return config;
        }

        Self::default()
    }

    /// Merge configuration with command-line arguments
    fn merge_with_args(&self, args: &mut Args) {
        // Only apply config if arg is not explicitly set
        if args.verbosity == Verbosity::Normal
            && let Some(ref v) = self.verbosity
            && let Ok(level) = Verbosity::from_str(v, true)
        {
            args.verbosity = level;
        }

        if args.comp_algo.is_none()
            && !args.use_abs
            && let Some(algo) = self.comp_algo
        {
            args.comp_algo = CompAlgo::from_str(&algo.to_string(), false).ok();
        }

        if args.comp_algo.is_none() && !args.use_abs {
            args.use_abs = self.use_abs.unwrap_or(false);
        }

        if args.n_folds == 0 {
            args.n_folds = self.n_folds.unwrap_or(0);
        }

        if args.abs_threshold == DEFAULT_ABS_THRESHOLD {
            args.abs_threshold = self.abs_threshold.unwrap_or(DEFAULT_ABS_THRESHOLD);
        }

        if args.ordering == OrderingArg::Natural
            && let Some(ref o) = self.ordering
            && let Ok(ordering) = OrderingArg::from_str(o, true)
        {
            args.ordering = ordering;
        }

        if !args.parallel {
            args.parallel = self.parallel.unwrap_or(false);
        }
    }
}

/// Verbosity level
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, PartialOrd, Ord)]
enum Verbosity {
    /// No output except the exit status
    Quiet,
    /// Warnings and the verdict
    Normal,
    /// Phase summaries
    Verbose,
    /// Per-step detail
    Debug,
    /// Per-iteration diagram sizes
    Trace,
}

/// Compositional algorithm
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum CompAlgo {
    /// Solve sub-games, then aggregate their results
    #[value(name = "1")]
    Aggregate,
    /// Greedily merge the cheapest pair of sub-games
    #[value(name = "2")]
    Greedy,
    /// Alternate local and global fixpoint steps
    #[value(name = "3")]
    LocalGlobal,
}

impl From<CompAlgo> for SolverStrategy {
    fn from(algo: CompAlgo) -> Self {
        match algo {
            CompAlgo::Aggregate => SolverStrategy::Aggregate,
            CompAlgo::Greedy => SolverStrategy::Greedy,
            CompAlgo::LocalGlobal => SolverStrategy::LocalGlobal,
        }
    }
}

/// Static variable ordering
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OrderingArg {
    /// Variables in literal order
    Natural,
    /// Variables in reverse literal order
    Reverse,
    /// Latches above inputs
    LatchesFirst,
    /// Inputs above latches
    InputsFirst,
}

impl From<OrderingArg> for VarOrdering {
    fn from(ordering: OrderingArg) -> Self {
        match ordering {
            OrderingArg::Natural => VarOrdering::Natural,
            OrderingArg::Reverse => VarOrdering::Reverse,
            OrderingArg::LatchesFirst => VarOrdering::LatchesFirst,
            OrderingArg::InputsFirst => VarOrdering::InputsFirst,
        }
    }
}

/// AbsSynthe - decide safety games given as AIGER circuits and synthesize
/// controllers for the realizable ones
#[derive(Parser, Debug, Clone)]
#[command(name = "abssynthe")]
#[command(version)]
#[command(about = "Safety-game realizability checker and controller synthesizer")]
struct Args {
    /// Input specification in extended AIGER format (aag or aig)
    #[arg(value_name = "SPEC", required_unless_present = "completions")]
    spec: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, value_enum, default_value = "normal")]
    verbosity: Verbosity,

    /// Enable quiet mode (equivalent to --verbosity quiet)
    #[arg(short, long)]
    quiet: bool,

    /// Compute a transition relation instead of composing next functions
    #[arg(short = 't', long)]
    use_trans: bool,

    /// Race several solver configurations in parallel
    #[arg(short, long)]
    parallel: bool,

    /// Race the monolithic solver under several variable orderings instead
    #[arg(short = 's', long, requires = "parallel")]
    ordering_strategies: bool,

    /// Compositional algorithm
    #[arg(short, long, value_enum)]
    comp_algo: Option<CompAlgo>,

    /// Solve by abstraction refinement over the latches
    #[arg(short = 'a', long, conflicts_with = "comp_algo")]
    use_abs: bool,

    /// Number of visible latches past which abstraction gives way to exact solving
    #[arg(long, default_value_t = DEFAULT_ABS_THRESHOLD)]
    abs_threshold: usize,

    /// Number of rounds merging adjacent error groups during decomposition
    #[arg(long, default_value_t = 0)]
    n_folds: usize,

    /// Variable ordering
    #[arg(long, value_enum, default_value = "natural")]
    ordering: OrderingArg,

    /// Output file for the synthesized circuit (.aig for binary, ASCII otherwise)
    #[arg(short, long, value_name = "FILE")]
    out_file: Option<PathBuf>,

    /// Write only the synthesized transducer: the controllable signals
    /// become the outputs and the error monitor is dropped
    #[arg(long)]
    only_transducer: bool,

    /// Output file for the winning-region circuit
    #[arg(long, value_name = "FILE")]
    win_region: Option<PathBuf>,

    /// Output file for the inductive-certificate circuit
    #[arg(long, value_name = "FILE")]
    ind_cert: Option<PathBuf>,

    /// Timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0")]
    timeout: u64,

    /// Generate shell completions
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Args {
    /// Solver configuration selected by the flags
    fn solver_config(&self) -> SolverConfig {
        let strategy = match (self.comp_algo, self.use_abs) {
            (Some(algo), _) => algo.into(),
            (None, true) => SolverStrategy::Abstraction,
            (None, false) => SolverStrategy::Monolithic,
        };
        let substitution = if self.use_trans {
            Substitution::Relational
        } else {
            Substitution::Functional
        };
        SolverConfig {
            strategy,
            substitution,
            ordering: self.ordering.into(),
            n_folds: self.n_folds,
            abs_threshold: self.abs_threshold,
        }
    }

    /// Files to write when the specification is realizable
    fn outputs(&self) -> Outputs {
        Outputs {
            controller: self.out_file.clone(),
            winning_region: self.win_region.clone(),
            certificate: self.ind_cert.clone(),
            only_transducer: self.only_transducer,
        }
    }
}

/// Install the stderr logger for `verbosity`
fn init_logging(verbosity: Verbosity) -> Result<(), String> {
    let level = match verbosity {
        Verbosity::Quiet => return Ok(()),
        Verbosity::Normal => Level::WARN,
        Verbosity::Verbose => Level::INFO,
        Verbosity::Debug => Level::DEBUG,
        Verbosity::Trace => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(|e| e.to_string())
}

/// Solve the specification and write the requested files; returns the
/// exit status
fn run(args: &Args) -> Result<i32, CliError> {
    let spec = args.spec.as_ref().ok_or(CliError::MissingSpec)?;
    let config = args.solver_config();
    let outputs = args.outputs();

    if args.parallel || args.timeout > 0 {
        let strategies = if args.ordering_strategies {
            portfolio::ordering_strategies(&config)
        } else if args.parallel {
            portfolio::default_strategies(&config)
        } else {
            vec![StrategyConfig::single(config)]
        };
        let result = solve_portfolio(spec, strategies, &outputs, args.timeout)?;
        info!(
            strategy = %result.strategy_name,
            time_ms = result.time_ms as u64,
            "portfolio answered"
        );
        return Ok(result.exit_code);
    }

    let mut circuit = Circuit::load(spec).map_err(SynthError::from)?;
    info!(
        inputs = circuit.inputs().len(),
        latches = circuit.latches().len(),
        gates = circuit.gates().len(),
        "specification loaded"
    );
    let solved = solve_circuit(&mut circuit, &config, outputs.any())?;
    solved.emit(&mut circuit, &outputs)?;
    Ok(solved.verdict().exit_code())
}

fn main() {
    let mut args = Args::parse();

    // Handle completion generation
    if let Some(shell) = args.completions {
        let mut cmd = Args::command();
        let bin_name = cmd.get_name().to_string();
        generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        return;
    }

    // Load configuration file and merge with args
    let config = CliConfig::load();
    config.merge_with_args(&mut args);

    let verbosity = if args.quiet {
        Verbosity::Quiet
    } else {
        args.verbosity
    };

    if let Err(e) = init_logging(verbosity) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(EXIT_STATUS_ERROR);
    }

    let code = match run(&args) {
        Ok(code) => {
            if verbosity > Verbosity::Quiet {
                println!("{}", if code == 10 { "realizable" } else { "unrealizable" });
            }
            code
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_STATUS_ERROR
        }
    };
    std::process::exit(code);
}
