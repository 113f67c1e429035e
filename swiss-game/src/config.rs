//! Solver configuration.

use serde::{Deserialize, Serialize};
use swiss_aig::{Circuit, Lit};

/// Abstraction gives up and solves the exact game once this many latches
/// are visible.
pub const DEFAULT_ABS_THRESHOLD: usize = 64;

/// How the game is solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolverStrategy {
    /// One backward fixpoint over the whole game
    #[default]
    Monolithic,
    /// Fixpoints over a growing set of visible latches
    Abstraction,
    /// Solve sub-games, then one aggregated game over their losing moves
    Aggregate,
    /// Solve sub-games, then merge them pairwise by a cost heuristic
    Greedy,
    /// Alternate local sub-game fixpoints with a global one
    LocalGlobal,
}

impl SolverStrategy {
    /// Every strategy, in portfolio order.
    pub const ALL: [SolverStrategy; 5] = [
        SolverStrategy::Monolithic,
        SolverStrategy::Abstraction,
        SolverStrategy::Aggregate,
        SolverStrategy::Greedy,
        SolverStrategy::LocalGlobal,
    ];

    /// Short name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SolverStrategy::Monolithic => "monolithic",
            SolverStrategy::Abstraction => "abstraction",
            SolverStrategy::Aggregate => "aggregate",
            SolverStrategy::Greedy => "greedy",
            SolverStrategy::LocalGlobal => "local-global",
        }
    }

    /// Check if this strategy splits the game into sub-games.
    #[must_use]
    pub const fn is_compositional(self) -> bool {
        matches!(
            self,
            SolverStrategy::Aggregate | SolverStrategy::Greedy | SolverStrategy::LocalGlobal
        )
    }
}

/// How latch variables are replaced by their next-state functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Substitution {
    /// Simultaneous functional composition
    #[default]
    Functional,
    /// Relational product with a transition relation over primed variables
    Relational,
}

/// Initial order of the decision-diagram variables.
///
/// Every order keeps each current-state variable directly above its primed
/// copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VarOrdering {
    /// Ascending literal order
    #[default]
    Natural,
    /// Descending literal order
    Reverse,
    /// Latches (and the error latch) on top
    LatchesFirst,
    /// Inputs on top
    InputsFirst,
}

impl VarOrdering {
    /// Every ordering, in portfolio order.
    pub const ALL: [VarOrdering; 4] = [
        VarOrdering::Natural,
        VarOrdering::Reverse,
        VarOrdering::LatchesFirst,
        VarOrdering::InputsFirst,
    ];

    /// Level-to-variable permutation over `num_vars` variables for `circuit`.
    ///
    /// Variable `2k` is the literal of AIGER variable `k` and `2k + 1` its
    /// primed copy.
    #[must_use]
    pub fn order(self, circuit: &Circuit, num_vars: u32) -> Vec<u32> {
        let bases = num_vars / 2;
        let ascending = 0..bases;
        let priority: Vec<u32> = match self {
            VarOrdering::Natural => ascending.collect(),
            VarOrdering::Reverse => ascending.rev().collect(),
            VarOrdering::LatchesFirst => {
                with_priority(circuit.state_latches().map(|l| l.lit), bases)
            }
            VarOrdering::InputsFirst => with_priority(circuit.inputs().iter().map(|i| i.lit), bases),
        };
        let mut order: Vec<u32> = priority
            .into_iter()
            .flat_map(|base| [2 * base, 2 * base + 1])
            .collect();
        if num_vars % 2 == 1 {
            order.push(num_vars - 1);
        }
        order
    }
}

fn with_priority(first: impl Iterator<Item = Lit>, bases: u32) -> Vec<u32> {
    let mut placed = vec![false; bases as usize];
    let mut result = Vec::with_capacity(bases as usize);
    for lit in first {
        let base = lit.var();
        if base < bases && !placed[base as usize] {
            placed[base as usize] = true;
            result.push(base);
        }
    }
    result.extend((0..bases).filter(|&b| !placed[b as usize]));
    result
}

/// Configuration for one solver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Solving strategy
    pub strategy: SolverStrategy,
    /// Latch substitution mode
    pub substitution: Substitution,
    /// Initial variable order
    pub ordering: VarOrdering,
    /// Pairwise folding rounds applied when decomposing the error function
    pub n_folds: usize,
    /// Visible-latch count above which abstraction falls back to the exact game
    pub abs_threshold: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            strategy: SolverStrategy::default(),
            substitution: Substitution::default(),
            ordering: VarOrdering::default(),
            n_folds: 0,
            abs_threshold: DEFAULT_ABS_THRESHOLD,
        }
    }
}

impl SolverConfig {
    /// Use `strategy`.
    #[must_use]
    pub fn with_strategy(mut self, strategy: SolverStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Use `substitution`.
    #[must_use]
    pub fn with_substitution(mut self, substitution: Substitution) -> Self {
        self.substitution = substitution;
        self
    }

    /// Use `ordering`.
    #[must_use]
    pub fn with_ordering(mut self, ordering: VarOrdering) -> Self {
        self.ordering = ordering;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Circuit {
        let mut c = Circuit::new();
        c.add_input(Lit::positive(1), None).unwrap();
        c.add_latch(Lit::positive(2), Lit::positive(1), None).unwrap();
        c.add_input(Lit::positive(3), None).unwrap();
        c.add_output(Lit::positive(2), None);
        c
    }

    fn is_paired_permutation(order: &[u32]) -> bool {
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        sorted.iter().enumerate().all(|(i, &v)| v == i as u32)
            && order.chunks(2).all(|pair| pair.len() == 2 && pair[1] == pair[0] + 1)
    }

    #[test]
    fn test_every_order_is_a_paired_permutation() {
        let circuit = sample();
        for ordering in VarOrdering::ALL {
            let order = ordering.order(&circuit, 10);
            assert!(is_paired_permutation(&order), "{ordering:?}: {order:?}");
        }
    }

    #[test]
    fn test_latches_first_puts_latch_on_top() {
        let order = VarOrdering::LatchesFirst.order(&sample(), 10);
        assert_eq!(&order[..2], &[4, 5]);
    }

    #[test]
    fn test_inputs_first() {
        let order = VarOrdering::InputsFirst.order(&sample(), 10);
        assert_eq!(&order[..4], &[2, 3, 6, 7]);
    }

    #[test]
    fn test_reverse() {
        let order = VarOrdering::Reverse.order(&sample(), 6);
        assert_eq!(order, vec![4, 5, 2, 3, 0, 1]);
    }

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert_eq!(config.strategy, SolverStrategy::Monolithic);
        assert_eq!(config.n_folds, 0);
        assert_eq!(config.abs_threshold, DEFAULT_ABS_THRESHOLD);
        let config = config.with_strategy(SolverStrategy::Greedy);
        assert!(config.strategy.is_compositional());
    }
}
