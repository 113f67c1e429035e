//! Timed benchmarks for Swiss AbsSynthe performance regression testing
//!
//! This module times the main phases of a run:
//! - AIGER parsing and writing
//! - Exact fixpoint computation under both substitution modes
//! - Abstraction refinement and the compositional strategies
//! - Controller synthesis and certificate construction

use std::time::Instant;

use swiss_aig::Circuit;
use swiss_game::certificate::inductive_certificate;
use swiss_game::strategy::finalize;
use swiss_game::{SolverConfig, SolverStrategy, Substitution, solve_circuit};

use crate::families;

/// Result of a single benchmark run
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkResult {
    /// Name of the benchmark
    pub name: String,
    /// Category of the benchmark
    pub category: BenchmarkCategory,
    /// Average time in microseconds
    pub avg_time_us: f64,
    /// Minimum time in microseconds
    pub min_time_us: f64,
    /// Maximum time in microseconds
    pub max_time_us: f64,
    /// Number of iterations
    pub iterations: u32,
}

/// Benchmark categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BenchmarkCategory {
    /// AIGER reading and writing
    Aiger,
    /// Exact attractor computation
    Fixpoint,
    /// Abstraction and sub-game strategies
    Compositional,
    /// Controller extraction and certificates
    Synthesis,
}

impl std::fmt::Display for BenchmarkCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BenchmarkCategory::Aiger => write!(f, "aiger"),
            BenchmarkCategory::Fixpoint => write!(f, "fixpoint"),
            BenchmarkCategory::Compositional => write!(f, "compositional"),
            BenchmarkCategory::Synthesis => write!(f, "synthesis"),
        }
    }
}

/// Time `f` over `iterations` runs after a short warmup
fn run_benchmark<F>(name: &str, category: BenchmarkCategory, iterations: u32, mut f: F) -> BenchmarkResult
where
    F: FnMut(),
{
    for _ in 0..2 {
        f();
    }

    let times_us: Vec<f64> = (0..iterations.max(1))
        .map(|_| {
            let start = Instant::now();
            f();
            start.elapsed().as_secs_f64() * 1_000_000.0
        })
        .collect();
    let avg = times_us.iter().sum::<f64>() / times_us.len() as f64;
    let min = times_us.iter().copied().fold(f64::INFINITY, f64::min);
    let max = times_us.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    BenchmarkResult {
        name: name.to_string(),
        category,
        avg_time_us: avg,
        min_time_us: min,
        max_time_us: max,
        iterations: times_us.len() as u32,
    }
}

/// Solve a fresh copy of `circuit` with `config`
fn solve(circuit: &Circuit, config: &SolverConfig, synthesize: bool) -> bool {
    let mut circuit = circuit.clone();
    solve_circuit(&mut circuit, config, synthesize).is_ok_and(|s| s.is_realizable())
}

/// Run the AIGER benchmarks
pub fn run_aiger_benchmarks() -> Vec<BenchmarkResult> {
    let Ok(circuit) = families::counter(10, true) else {
        return Vec::new();
    };
    let (Ok(ascii), Ok(binary)) = (circuit.to_ascii(), circuit.to_binary()) else {
        return Vec::new();
    };

    vec![
        run_benchmark("aiger_parse_ascii", BenchmarkCategory::Aiger, 50, || {
            let _ = Circuit::from_bytes(ascii.as_bytes());
        }),
        run_benchmark("aiger_parse_binary", BenchmarkCategory::Aiger, 50, || {
            let _ = Circuit::from_bytes(&binary);
        }),
        run_benchmark("aiger_write_binary", BenchmarkCategory::Aiger, 50, || {
            let _ = circuit.to_binary();
        }),
    ]
}

/// Run the exact fixpoint benchmarks
pub fn run_fixpoint_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();
    let specs = [
        ("counter_6_unrealizable", families::counter(6, false)),
        ("delay_chain_12", families::delay_chain(12)),
    ];

    for (name, spec) in specs {
        let Ok(circuit) = spec else { continue };
        for (mode, substitution) in [
            ("functional", Substitution::Functional),
            ("relational", Substitution::Relational),
        ] {
            let config = SolverConfig::default().with_substitution(substitution);
            results.push(run_benchmark(
                &format!("fixpoint_{name}_{mode}"),
                BenchmarkCategory::Fixpoint,
                10,
                || {
                    solve(&circuit, &config, false);
                },
            ));
        }
    }

    results
}

/// Run the abstraction and compositional benchmarks
pub fn run_compositional_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();
    let specs = [
        ("parallel_guards_8", families::parallel_guards(8)),
        ("shared_guards_8", families::shared_guards(8)),
        ("delay_chain_16", families::delay_chain(16)),
    ];

    for (name, spec) in specs {
        let Ok(circuit) = spec else { continue };
        for strategy in SolverStrategy::ALL {
            let config = SolverConfig::default().with_strategy(strategy);
            results.push(run_benchmark(
                &format!("{}_{name}", strategy.name()),
                BenchmarkCategory::Compositional,
                10,
                || {
                    solve(&circuit, &config, false);
                },
            ));
        }
    }

    results
}

/// Run the synthesis benchmarks
pub fn run_synthesis_benchmarks() -> Vec<BenchmarkResult> {
    let Ok(circuit) = families::counter(6, true) else {
        return Vec::new();
    };

    vec![
        run_benchmark("synthesis_counter_6", BenchmarkCategory::Synthesis, 10, || {
            let mut circuit = circuit.clone();
            if let Ok(solved) = solve_circuit(&mut circuit, &SolverConfig::default(), true)
                && let Some(winning) = solved.verdict().winning()
            {
                let _ = finalize(&mut circuit, solved.manager(), &winning.controller);
            }
        }),
        run_benchmark("certificate_counter_6", BenchmarkCategory::Synthesis, 10, || {
            let mut circuit = circuit.clone();
            if let Ok(solved) = solve_circuit(&mut circuit, &SolverConfig::default(), true)
                && let Some(winning) = solved.verdict().winning()
                && let Some(region) = winning.region
                && finalize(&mut circuit, solved.manager(), &winning.controller).is_ok()
            {
                let _ = inductive_certificate(solved.manager(), &circuit, region);
            }
        }),
    ]
}

/// Run all benchmarks and return results
pub fn run_all_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();

    results.extend(run_aiger_benchmarks());
    results.extend(run_fixpoint_benchmarks());
    results.extend(run_compositional_benchmarks());
    results.extend(run_synthesis_benchmarks());

    results
}
