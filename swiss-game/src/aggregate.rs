//! Recombining sub-game results.
//!
//! Every strategy here first decomposes the game and solves each sub-game
//! on its own. A losing sub-game loses the whole game. Winning sub-games
//! may still interfere through shared latches and controllable inputs,
//! which each strategy reconciles differently.

use std::collections::BTreeSet;

use swiss_aig::Lit;
use swiss_bdd::Bdd;
use tracing::{debug, info};

use crate::attractor::{self, Solution};
use crate::decompose;
use crate::error::Result;
use crate::game::Game;
use crate::strategy;
use crate::verdict::{Controller, Verdict};

fn solve_all(subgames: &[Game<'_>]) -> Option<Vec<Solution>> {
    let mut solutions = Vec::with_capacity(subgames.len());
    for (i, sub) in subgames.iter().enumerate() {
        let solution = attractor::solve(sub, None);
        debug!(
            subgame = i,
            realizable = solution.realizable,
            iterations = solution.iterations,
            "sub-game solved"
        );
        if !solution.realizable {
            return None;
        }
        solutions.push(solution);
    }
    Some(solutions)
}

/// A group of merged sub-games.
struct Part {
    transitions: Bdd,
    cinputs: BTreeSet<Lit>,
    losing: Bdd,
}

fn cinputs_disjoint(subgames: &[Game<'_>]) -> bool {
    let mut seen = BTreeSet::new();
    subgames
        .iter()
        .flat_map(|sub| sub.cinputs())
        .all(|&c| seen.insert(c))
}

/// Solve the sub-games, then either concatenate their controllers (when
/// no controllable input is shared) or solve one game whose error is the
/// union of their losing transitions, started from their losing regions.
pub fn solve_aggregate(game: &Game<'_>, n_folds: usize, synthesize: bool) -> Result<Verdict> {
    let subgames = decompose::decompose(game, n_folds);
    if subgames.is_empty() {
        return attractor::solve_monolithic(game, synthesize);
    }
    let Some(solutions) = solve_all(&subgames) else {
        info!("a sub-game is unrealizable");
        return Ok(Verdict::Unrealizable);
    };
    let mgr = game.manager();
    if cinputs_disjoint(&subgames) {
        info!(subgames = subgames.len(), "controllable inputs are disjoint");
        let mut controller = Controller::new();
        if synthesize {
            for (sub, solution) in subgames.iter().zip(&solutions) {
                controller.extend(strategy::extract(
                    sub,
                    !solution.losing_transitions,
                    !solution.losing,
                ));
            }
        }
        let region = mgr.and_all(solutions.iter().map(|s| !s.losing));
        return Ok(Verdict::realizable(controller, Some(region)));
    }

    let losing = mgr.or_all(
        std::iter::once(game.error_states()).chain(solutions.iter().map(|s| s.losing)),
    );
    let mut transitions: Vec<Bdd> = solutions.iter().map(|s| s.losing_transitions).collect();
    transitions.sort_by_key(|&t| mgr.node_count(t));
    let aggregated = game.subgame_around(mgr.or_all(transitions), losing);
    let solution = attractor::solve(&aggregated, Some(losing));
    info!(
        realizable = solution.realizable,
        iterations = solution.iterations,
        "aggregated game solved"
    );
    if !solution.realizable {
        return Ok(Verdict::Unrealizable);
    }
    let controller = if synthesize {
        strategy::extract(game, !solution.losing_transitions, !solution.losing)
    } else {
        Controller::new()
    };
    Ok(Verdict::realizable(controller, Some(!solution.losing)))
}

/// Solve the sub-games, then merge their losing transitions pairwise,
/// cheapest pair first, re-solving a merge only when the two sides share
/// controllable inputs.
///
/// The cost of a pair is the size of its joint transitions plus the number
/// of joint controllable inputs, scaled so both terms weigh about the same
/// on average. Each part carries its losing region: a disjoint merge takes
/// the union, a re-solved merge takes the region of the merged sub-game,
/// which contains both sides. The complement of the last region is the
/// winning region.
pub fn solve_greedy(game: &Game<'_>, n_folds: usize, synthesize: bool) -> Result<Verdict> {
    let subgames = decompose::decompose(game, n_folds);
    if subgames.is_empty() {
        return attractor::solve_monolithic(game, synthesize);
    }
    let Some(solutions) = solve_all(&subgames) else {
        info!("a sub-game is unrealizable");
        return Ok(Verdict::Unrealizable);
    };
    let mgr = game.manager();
    let mut parts: Vec<Part> = solutions
        .iter()
        .zip(&subgames)
        .map(|(s, sub)| Part {
            transitions: s.losing_transitions,
            cinputs: sub.cinputs().iter().copied().collect(),
            losing: s.losing,
        })
        .collect();

    let n = parts.len() as f64;
    let mean_nodes = parts.iter().map(|p| mgr.node_count(p.transitions)).sum::<usize>() as f64 / n;
    let mean_cinputs = parts.iter().map(|p| p.cinputs.len()).sum::<usize>() as f64 / n;
    let factor = if mean_cinputs == 0.0 {
        0.0
    } else {
        0.5 * mean_nodes / mean_cinputs
    };
    debug!(factor, "greedy cost factor");

    while parts.len() > 1 {
        let mut best: Option<(usize, usize, Bdd, f64)> = None;
        for i in 0..parts.len() {
            for j in i + 1..parts.len() {
                let joint = mgr.or(parts[i].transitions, parts[j].transitions);
                let shared = parts[i].cinputs.union(&parts[j].cinputs).count();
                let cost = mgr.node_count(joint) as f64 + factor * shared as f64;
                if best.is_none_or(|b| cost < b.3) {
                    best = Some((i, j, joint, cost));
                }
            }
        }
        let Some((i, j, joint, cost)) = best else {
            break;
        };
        let right = parts.swap_remove(j);
        let left = parts.swap_remove(i);
        let losing = mgr.or(left.losing, right.losing);
        let cinputs = left.cinputs.union(&right.cinputs).copied().collect();
        let part = if left.cinputs.is_disjoint(&right.cinputs) {
            Part { transitions: joint, cinputs, losing }
        } else {
            let merged = game.subgame_around(joint, losing);
            let solution = attractor::solve(&merged, Some(losing));
            if !solution.realizable {
                info!("merged sub-game is unrealizable");
                return Ok(Verdict::Unrealizable);
            }
            Part {
                transitions: solution.losing_transitions,
                cinputs,
                losing: solution.losing,
            }
        };
        debug!(i, j, cost, remaining = parts.len() + 1, "sub-games merged");
        parts.push(part);
    }

    let Some(last) = parts.pop() else {
        return attractor::solve_monolithic(game, synthesize);
    };
    let controller = if synthesize {
        strategy::extract(game, !last.transitions, !last.losing)
    } else {
        Controller::new()
    };
    info!("greedy merge done");
    Ok(Verdict::realizable(controller, Some(!last.losing)))
}

/// Alternate local sub-game fixpoints with global attractor steps.
///
/// The global losing region starts as the union of the sub-games' losing
/// regions. Each round projects it on each sub-game's latches (universally
/// dropping the others) and re-solves the sub-games whose local winning
/// region it cuts; only a round without local progress takes one global
/// step.
pub fn solve_local_global(game: &Game<'_>, n_folds: usize, synthesize: bool) -> Result<Verdict> {
    let subgames = decompose::decompose(game, n_folds);
    if subgames.is_empty() {
        return attractor::solve_monolithic(game, synthesize);
    }
    let mgr = game.manager();
    let mut global = Bdd::FALSE;
    let mut locals: Vec<(Game<'_>, Bdd)> = Vec::with_capacity(subgames.len());
    for sub in &subgames {
        let solution = attractor::solve(sub, None);
        if !solution.realizable {
            info!("a sub-game is unrealizable");
            return Ok(Verdict::Unrealizable);
        }
        global = mgr.or(global, solution.losing);
        locals.push((
            sub.subgame_around(solution.losing_transitions, solution.losing),
            !solution.losing,
        ));
    }

    let init = game.init_state();
    let error_latch = game.error_latch();
    let mut hit_init = mgr.intersects(init, global);
    let mut previous = Bdd::TRUE;
    let mut global_trans = Bdd::FALSE;
    let mut rounds = 0usize;
    while !hit_init && previous != global {
        previous = global;
        rounds += 1;
        for (sub, local_win) in &mut locals {
            let kept: BTreeSet<Lit> = sub.latches().iter().map(|l| l.lit).collect();
            let dropped = mgr.cube(
                game.latches()
                    .iter()
                    .map(|l| l.lit)
                    .filter(|lit| *lit != error_latch && !kept.contains(lit))
                    .map(|lit| lit.raw()),
            );
            let local_lose = mgr.forall(global, dropped);
            if !mgr.intersects(local_lose, *local_win) {
                continue;
            }
            let solution = attractor::solve(sub, Some(local_lose));
            if !solution.realizable {
                info!(rounds, "a sub-game is unrealizable against the global region");
                return Ok(Verdict::Unrealizable);
            }
            *local_win = !solution.losing;
            global = mgr.or(global, solution.losing);
        }
        if global == previous {
            let (pre, trans) = game.upre(global);
            global = mgr.or(global, pre);
            global_trans = trans;
        }
        hit_init = mgr.intersects(init, global);
        debug!(rounds, nodes = mgr.node_count(global), "local/global round");
    }
    info!(rounds, realizable = !hit_init, "local/global relaxation done");
    if hit_init {
        return Ok(Verdict::Unrealizable);
    }
    let controller = if synthesize {
        strategy::extract(game, !global_trans, !global)
    } else {
        Controller::new()
    };
    Ok(Verdict::realizable(controller, Some(!global)))
}
