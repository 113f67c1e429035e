//! Splitting the error function into independent sub-games.
//!
//! The error latch's next literal is read structurally. A negated wide AND
//! is a wide OR: every disjunct can become its own error. A positive wide
//! AND with a negated AND operand `¬b` reads as `cube ∧ (¬c₁ ∨ … ∨ ¬cₖ)`
//! where `b = c₁ ∧ … ∧ cₖ`, so each `cube ∧ ¬cᵢ` can.

use swiss_aig::{Lit, LitSet};
use swiss_bdd::Bdd;
use tracing::{debug, info};

use crate::game::Game;

/// Error functions whose disjunction is the error function of `game`, or
/// an empty vector when the error has no usable structure.
pub fn split_error(game: &Game<'_>, n_folds: usize) -> Vec<Bdd> {
    let circuit = game.circuit();
    let Some(error) = circuit.error_latch() else {
        return Vec::new();
    };
    let next = error.next;
    if next.is_negated() {
        let Some(disjuncts) = circuit.n_input_and(next.strip()) else {
            return Vec::new();
        };
        debug!(disjuncts = disjuncts.operands.len(), "error is a wide OR");
        return merge_some_signals(game, Bdd::TRUE, &disjuncts.operands, n_folds);
    }
    let Some(conj) = circuit.n_input_and(next) else {
        return Vec::new();
    };
    let Some((&last, rest)) = conj.negated_ands.split_last() else {
        return Vec::new();
    };
    let Some(mut best) = circuit.n_input_and(last) else {
        return Vec::new();
    };
    let mut chosen = last;
    for &candidate in rest {
        if let Some(flat) = circuit.n_input_and(candidate)
            && flat.operands.len() > best.operands.len()
        {
            chosen = candidate;
            best = flat;
        }
    }
    let mgr = game.manager();
    let cube = mgr.and_all(
        conj.operands
            .iter()
            .filter(|a| a.strip() != chosen)
            .map(|&a| game.lit2bdd(a)),
    );
    debug!(
        %chosen,
        candidates = best.operands.len(),
        "error is a wide AND over a wide OR"
    );
    merge_some_signals(game, cube, &best.operands, n_folds)
}

/// The sub-games of [`split_error`].
pub fn decompose<'a>(game: &Game<'a>, n_folds: usize) -> Vec<Game<'a>> {
    let errors = split_error(game, n_folds);
    let subgames: Vec<Game<'a>> = errors.into_iter().map(|e| game.subgame(e)).collect();
    info!(subgames = subgames.len(), n_folds, "error function decomposed");
    subgames
}

/// Group `candidates` by nested dependency closures and return one error
/// `cube ∧ ¬f` per group conjunction `f`.
///
/// A candidate whose closure fits in an existing group joins it; a group
/// whose closure fits in the candidate's absorbs it and takes its closure.
/// Each of the `n_folds` rounds then conjoins adjacent groups whose closures
/// intersect.
pub fn merge_some_signals(
    game: &Game<'_>,
    cube: Bdd,
    candidates: &[Lit],
    n_folds: usize,
) -> Vec<Bdd> {
    let mgr = game.manager();
    let circuit = game.circuit();
    let cube_deps = game.bdd_deps(cube);
    let mut groups: Vec<(LitSet, Bdd)> = Vec::new();
    for &candidate in candidates {
        let mut deps: LitSet = (*cube_deps).clone();
        deps.extend(circuit.lit_deps(candidate).iter().copied());
        let f = game.lit2bdd(candidate);
        let mut found = false;
        for (group_deps, group) in &mut groups {
            if deps.is_subset(group_deps) {
                *group = mgr.and(*group, f);
                found = true;
                break;
            }
            if group_deps.is_subset(&deps) {
                *group = mgr.and(*group, f);
                *group_deps = deps.clone();
                found = true;
            }
        }
        if !found {
            groups.push((deps, f));
        }
    }
    debug!(groups = groups.len(), "candidates merged");

    for round in 0..n_folds {
        if groups.len() < 2 {
            break;
        }
        let mut folded = Vec::with_capacity(groups.len().div_ceil(2));
        let mut pairs = groups.into_iter();
        while let Some((deps_a, a)) = pairs.next() {
            match pairs.next() {
                Some((deps_b, b)) if !deps_a.is_disjoint(&deps_b) => {
                    let deps = deps_a.union(&deps_b).copied().collect();
                    folded.push((deps, mgr.and(a, b)));
                }
                Some(second) => {
                    folded.push((deps_a, a));
                    folded.push(second);
                }
                None => folded.push((deps_a, a)),
            }
        }
        groups = folded;
        debug!(round, groups = groups.len(), "fold round");
    }

    groups
        .into_iter()
        .map(|(_, f)| mgr.and(!f, cube))
        .collect()
}
