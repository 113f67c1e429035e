//! Swiss AbsSynthe Performance Regression Runner
//!
//! Times the solver phases, compares them with a stored baseline and exits
//! with status 1 when any benchmark slowed down past the threshold.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use swiss_regression::benchmarks::{BenchmarkCategory, BenchmarkResult, run_all_benchmarks};

/// Baseline performance data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Baseline {
    /// Version of the baseline
    pub version: String,
    /// Seconds since the epoch when the baseline was recorded
    pub timestamp: u64,
    /// Average time in microseconds per benchmark
    pub benchmarks: BTreeMap<String, BaselineEntry>,
}

/// Single baseline entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineEntry {
    /// Average time in microseconds
    pub avg_time_us: f64,
    /// Category of the benchmark
    pub category: BenchmarkCategory,
}

/// Status of a benchmark comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonStatus {
    /// Slower than the baseline beyond the threshold
    Regression,
    /// Faster than the baseline beyond the threshold
    Improvement,
    /// Within the threshold
    Unchanged,
    /// Not in the baseline
    New,
}

impl std::fmt::Display for ComparisonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonStatus::Regression => write!(f, "FAIL"),
            ComparisonStatus::Improvement => write!(f, "GOOD"),
            ComparisonStatus::Unchanged => write!(f, " OK "),
            ComparisonStatus::New => write!(f, "NEW "),
        }
    }
}

/// Comparison of a single benchmark against baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    /// Benchmark name
    pub name: String,
    /// Category
    pub category: BenchmarkCategory,
    /// Current time in microseconds
    pub current_us: f64,
    /// Baseline time in microseconds (if available)
    pub baseline_us: Option<f64>,
    /// Percentage change (positive = slower)
    pub change_percent: Option<f64>,
    /// Outcome
    pub status: ComparisonStatus,
}

/// Regression report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionReport {
    /// Regression threshold percentage
    pub threshold_percent: f64,
    /// Individual benchmark comparisons
    pub comparisons: Vec<BenchmarkComparison>,
}

impl RegressionReport {
    fn count(&self, status: ComparisonStatus) -> usize {
        self.comparisons.iter().filter(|c| c.status == status).count()
    }

    /// Whether any benchmark regressed
    pub fn has_regression(&self) -> bool {
        self.count(ComparisonStatus::Regression) > 0
    }
}

/// Configuration for the regression runner
#[derive(Debug, Clone)]
struct Config {
    baseline_path: PathBuf,
    threshold_percent: f64,
    update_baseline: bool,
    json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            baseline_path: PathBuf::from("baseline.json"),
            threshold_percent: 10.0,
            update_baseline: false,
            json: false,
        }
    }
}

/// Load baseline from file
fn load_baseline(path: &Path) -> Result<Option<Baseline>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read baseline file: {}", path.display()))?;
    let baseline = serde_json::from_str(&content).context("Failed to parse baseline JSON")?;
    Ok(Some(baseline))
}

/// Save baseline to file
fn save_baseline(path: &Path, results: &[BenchmarkResult]) -> Result<()> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let baseline = Baseline {
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp,
        benchmarks: results
            .iter()
            .map(|r| {
                (
                    r.name.clone(),
                    BaselineEntry {
                        avg_time_us: r.avg_time_us,
                        category: r.category,
                    },
                )
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&baseline).context("Failed to serialize baseline")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write baseline file: {}", path.display()))
}

/// Compare results against baseline
fn compare_results(
    results: &[BenchmarkResult],
    baseline: Option<&Baseline>,
    threshold_percent: f64,
) -> RegressionReport {
    let comparisons = results
        .iter()
        .map(|result| {
            let baseline_us = baseline
                .and_then(|b| b.benchmarks.get(&result.name))
                .map(|e| e.avg_time_us);
            let change_percent = baseline_us
                .filter(|&b| b > 0.0)
                .map(|b| (result.avg_time_us - b) / b * 100.0);
            let status = match change_percent {
                None => ComparisonStatus::New,
                Some(c) if c > threshold_percent => ComparisonStatus::Regression,
                Some(c) if c < -threshold_percent => ComparisonStatus::Improvement,
                Some(_) => ComparisonStatus::Unchanged,
            };
            BenchmarkComparison {
                name: result.name.clone(),
                category: result.category,
                current_us: result.avg_time_us,
                baseline_us,
                change_percent,
                status,
            }
        })
        .collect();
    RegressionReport {
        threshold_percent,
        comparisons,
    }
}

/// Print report in text format
fn print_text_report(report: &RegressionReport) {
    println!("=== Swiss AbsSynthe Performance Regression Report ===\n");
    println!(
        "Regressions: {} (threshold {:.1}%), improvements: {}, unchanged: {}, new: {}\n",
        report.count(ComparisonStatus::Regression),
        report.threshold_percent,
        report.count(ComparisonStatus::Improvement),
        report.count(ComparisonStatus::Unchanged),
        report.count(ComparisonStatus::New),
    );

    let mut by_category: BTreeMap<String, Vec<&BenchmarkComparison>> = BTreeMap::new();
    for comp in &report.comparisons {
        by_category.entry(comp.category.to_string()).or_default().push(comp);
    }
    for (category, comps) in by_category {
        println!("--- {} ---", category);
        for comp in comps {
            let change = comp
                .change_percent
                .map_or_else(|| "N/A".to_string(), |c| format!("{:+.1}%", c));
            println!(
                "  [{}] {:40} {:>12.1}us  {:>8}",
                comp.status, comp.name, comp.current_us, change
            );
        }
        println!();
    }

    if report.has_regression() {
        println!("RESULT: FAILED - Performance regressions detected!");
    } else {
        println!("RESULT: PASSED - No performance regressions detected.");
    }
}

/// Parse command line arguments
fn parse_args() -> Config {
    let args: Vec<String> = std::env::args().collect();
    let mut config = Config::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--baseline" | "-b" => {
                i += 1;
                if let Some(path) = args.get(i) {
                    config.baseline_path = PathBuf::from(path);
                }
            }
            "--threshold" | "-t" => {
                i += 1;
                if let Some(pct) = args.get(i) {
                    config.threshold_percent = pct.parse().unwrap_or(10.0);
                }
            }
            "--update" | "-u" => config.update_baseline = true,
            "--json" => config.json = true,
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn print_help() {
    println!("Swiss AbsSynthe Performance Regression Tester");
    println!();
    println!("Usage: regression [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -b, --baseline <FILE>   Path to baseline file (default: baseline.json)");
    println!("  -t, --threshold <PCT>   Regression threshold percentage (default: 10)");
    println!("  -u, --update            Update baseline with current results");
    println!("      --json              Output in JSON format");
    println!("  -h, --help              Print help information");
}

fn main() -> Result<()> {
    let config = parse_args();

    let baseline_path = if config.baseline_path.is_relative() {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(&config.baseline_path)
    } else {
        config.baseline_path.clone()
    };

    let baseline = load_baseline(&baseline_path)?;
    if baseline.is_none() && !config.update_baseline {
        eprintln!(
            "Warning: No baseline file found at {}. Running benchmarks anyway.",
            baseline_path.display()
        );
    }

    eprintln!("Running benchmarks...");
    let results = run_all_benchmarks();
    eprintln!("Completed {} benchmarks.", results.len());

    let report = compare_results(&results, baseline.as_ref(), config.threshold_percent);
    if config.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print_text_report(&report);
    }

    if config.update_baseline {
        save_baseline(&baseline_path, &results)?;
        eprintln!("Baseline updated at: {}", baseline_path.display());
    }

    if report.has_regression() {
        std::process::exit(1);
    }

    Ok(())
}
