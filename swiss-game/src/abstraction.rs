//! Solving over a subset of visible latches.
//!
//! Hidden latches are read as inputs. Letting the environment pick them
//! over-approximates the losing region; letting them range adversarially
//! against the environment under-approximates it. A realizable
//! over-approximation or an unrealizable under-approximation decides the
//! game; otherwise hidden latches implicated in the gap become visible.

use std::collections::BTreeSet;

use swiss_aig::Lit;
use swiss_bdd::Bdd;
use tracing::{debug, info};

use crate::attractor::{self, Attractor, Solution};
use crate::error::Result;
use crate::game::{Game, StateLatch, safe_restrict};
use crate::strategy;
use crate::verdict::{Controller, Verdict};

struct Abstraction<'g, 'a> {
    game: &'g Game<'a>,
    visible: Vec<StateLatch>,
    hidden: Vec<Lit>,
    env_cube: Bdd,
    hidden_cube: Bdd,
    compose: Vec<Bdd>,
    init: Bdd,
}

impl<'g, 'a> Abstraction<'g, 'a> {
    fn new(game: &'g Game<'a>, visible: &BTreeSet<Lit>) -> Self {
        let mgr = game.manager();
        let (shown, hidden): (Vec<StateLatch>, Vec<StateLatch>) = game
            .latches()
            .iter()
            .copied()
            .partition(|l| visible.contains(&l.lit));
        let hidden: Vec<Lit> = hidden.into_iter().map(|l| l.lit).collect();
        let hidden_cube = mgr.cube(hidden.iter().map(|l| l.raw()));
        let mut compose: Vec<Bdd> = (0..mgr.num_vars()).map(|v| mgr.var(v)).collect();
        for latch in &shown {
            compose[latch.lit.raw() as usize] = game.next_function(latch);
        }
        let init = mgr.and_all(shown.iter().map(|l| !game.var(l.lit)));
        Self {
            game,
            env_cube: mgr.and(game.uinput_cube(), hidden_cube),
            hidden_cube,
            visible: shown,
            hidden,
            compose,
            init,
        }
    }

    /// `dst` (over visible latches) after one step, as a function of the
    /// visible latches, the hidden latches and the inputs.
    fn pre(&self, dst: Bdd, care: Option<Bdd>) -> Bdd {
        let mgr = self.game.manager();
        match care {
            None => mgr.vector_compose(dst, &self.compose),
            Some(care) => {
                let mut vec = self.compose.clone();
                for latch in &self.visible {
                    let slot = &mut vec[latch.lit.raw() as usize];
                    *slot = safe_restrict(mgr, *slot, care);
                }
                mgr.vector_compose(dst, &vec)
            }
        }
    }

    /// `∃u ∃h ∀c pre(dst)`
    fn over_upre(&self, dst: Bdd) -> (Bdd, Bdd) {
        let mgr = self.game.manager();
        let trans = self.pre(dst, Some(!dst));
        let forced = mgr.forall(trans, self.game.cinput_cube());
        (mgr.exists(forced, self.env_cube), trans)
    }

    /// `∀h ∃u ∀c pre(dst)`
    fn under_upre(&self, dst: Bdd) -> (Bdd, Bdd) {
        let mgr = self.game.manager();
        let trans = self.pre(dst, Some(!dst));
        let forced = mgr.forall(trans, self.game.cinput_cube());
        let chosen = mgr.exists(forced, self.game.uinput_cube());
        (mgr.forall(chosen, self.hidden_cube), trans)
    }

    fn fixpoint<'s>(&'s self, op: impl FnMut(Bdd) -> (Bdd, Bdd) + 's) -> Solution {
        Attractor::with_operator(self.game.manager(), self.init, self.game.error_states(), op)
            .run()
    }

    /// Hidden latches to promote given the over- and under-approximated
    /// losing regions.
    fn refine(&self, over: Bdd, under: Bdd) -> BTreeSet<Lit> {
        let mgr = self.game.manager();
        let gap = mgr.and(over, !under);
        let implicated = mgr.support(mgr.and(self.pre(over, None), gap));
        let mut promoted: BTreeSet<Lit> = self
            .hidden
            .iter()
            .copied()
            .filter(|l| implicated.binary_search(&l.raw()).is_ok())
            .collect();
        if promoted.is_empty() {
            for latch in &self.visible {
                let support = mgr.support(self.compose[latch.lit.raw() as usize]);
                promoted.extend(
                    self.hidden
                        .iter()
                        .filter(|l| support.binary_search(&l.raw()).is_ok()),
                );
            }
        }
        promoted
    }
}

/// Latches visible before any refinement: the error latch and the latches
/// its next function reads.
fn initial_visible(game: &Game<'_>) -> BTreeSet<Lit> {
    let mgr = game.manager();
    let error = game.error_latch();
    let next = game
        .latches()
        .iter()
        .find(|l| l.lit == error)
        .map(|l| game.next_function(l))
        .unwrap_or(Bdd::FALSE);
    let support = mgr.support(next);
    game.latches()
        .iter()
        .map(|l| l.lit)
        .filter(|lit| *lit == error || support.binary_search(&lit.raw()).is_ok())
        .collect()
}

/// Decide `game` by abstraction refinement, handing over to the exact
/// solver once more than `threshold` latches are visible.
pub fn solve(game: &Game<'_>, threshold: usize, synthesize: bool) -> Result<Verdict> {
    let mut visible = initial_visible(game);
    let mut round = 0usize;
    loop {
        if visible.len() > threshold || visible.len() == game.latches().len() {
            info!(
                round,
                visible = visible.len(),
                "abstraction exhausted, solving the exact game"
            );
            return attractor::solve_monolithic(game, synthesize);
        }
        round += 1;
        let abs = Abstraction::new(game, &visible);
        let over = abs.fixpoint(|l| abs.over_upre(l));
        debug!(
            round,
            visible = visible.len(),
            realizable = over.realizable,
            "over-approximation solved"
        );
        if over.realizable {
            info!(round, visible = visible.len(), "realizable by abstraction");
            let controller = if synthesize {
                strategy::extract(game, !over.losing_transitions, !over.losing)
            } else {
                Controller::new()
            };
            return Ok(Verdict::realizable(controller, Some(!over.losing)));
        }
        let under = abs.fixpoint(|l| abs.under_upre(l));
        debug!(
            round,
            realizable = under.realizable,
            "under-approximation solved"
        );
        if !under.realizable {
            info!(round, visible = visible.len(), "unrealizable by abstraction");
            return Ok(Verdict::Unrealizable);
        }
        let promoted = abs.refine(over.losing, under.losing);
        if promoted.is_empty() {
            info!(round, "no latch to promote, solving the exact game");
            return attractor::solve_monolithic(game, synthesize);
        }
        debug!(round, promoted = promoted.len(), "latches promoted");
        visible.extend(promoted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swiss_aig::Circuit;

    use crate::config::{Substitution, VarOrdering};
    use crate::session::Session;

    /// Output latch `o` with `next = u`, plus an unrelated latch `h` with
    /// `next = c`.
    fn env_driven() -> Circuit {
        let mut c = Circuit::new();
        c.add_input(Lit::positive(1), Some("controllable_c".into())).unwrap();
        c.add_input(Lit::positive(2), Some("u".into())).unwrap();
        c.add_latch(Lit::positive(3), Lit::positive(2), None).unwrap();
        c.add_latch(Lit::positive(4), Lit::positive(1), None).unwrap();
        c.add_output(Lit::positive(3), None);
        c.push_error_latch().unwrap();
        c
    }

    /// Output latch `o` with `next = h ∧ ¬c`, where hidden latch `h` has
    /// `next = u`.
    fn guarded_by_hidden() -> Circuit {
        let mut c = Circuit::new();
        c.add_input(Lit::positive(1), Some("controllable_c".into())).unwrap();
        c.add_input(Lit::positive(2), Some("u".into())).unwrap();
        c.add_and(Lit::positive(5), Lit::positive(4), Lit::negative(1)).unwrap();
        c.add_latch(Lit::positive(3), Lit::positive(5), None).unwrap();
        c.add_latch(Lit::positive(4), Lit::positive(2), None).unwrap();
        c.add_output(Lit::positive(3), None);
        c.push_error_latch().unwrap();
        c
    }

    /// A shift register `l1 ← u, l2 ← l1, l3 ← l2` with output `l3`.
    fn shift_register() -> Circuit {
        let mut c = Circuit::new();
        c.add_input(Lit::positive(1), Some("controllable_c".into())).unwrap();
        c.add_input(Lit::positive(2), Some("u".into())).unwrap();
        c.add_latch(Lit::positive(3), Lit::positive(2), None).unwrap();
        c.add_latch(Lit::positive(4), Lit::positive(3), None).unwrap();
        c.add_latch(Lit::positive(5), Lit::positive(4), None).unwrap();
        c.add_output(Lit::positive(5), None);
        c.push_error_latch().unwrap();
        c
    }

    fn with_game<R>(circuit: &Circuit, f: impl FnOnce(&Game<'_>) -> R) -> R {
        let session = Session::new(circuit, VarOrdering::Natural).unwrap();
        let game = Game::new(circuit, &session, Substitution::Functional).unwrap();
        f(&game)
    }

    #[test]
    fn test_initial_visible() {
        with_game(&env_driven(), |game| {
            let visible = initial_visible(game);
            assert_eq!(visible.len(), 2);
            assert!(visible.contains(&Lit::positive(3)));
            assert!(visible.contains(&game.error_latch()));
        });
    }

    #[test]
    fn test_under_approximation_proves_unrealizable() {
        with_game(&env_driven(), |game| {
            let abs = Abstraction::new(game, &initial_visible(game));
            assert_eq!(abs.hidden, vec![Lit::positive(4)]);
            let under = abs.fixpoint(|l| abs.under_upre(l));
            assert!(!under.realizable);
            assert!(!solve(game, 8, false).unwrap().is_realizable());
        });
    }

    #[test]
    fn test_over_approximation_proves_realizable() {
        with_game(&guarded_by_hidden(), |game| {
            let abs = Abstraction::new(game, &initial_visible(game));
            let over = abs.fixpoint(|l| abs.over_upre(l));
            assert!(over.realizable);
            let verdict = solve(game, 8, true).unwrap();
            let winning = verdict.winning().unwrap();
            assert_eq!(winning.controller.len(), 1);
            assert!(game.manager().leq(game.init_state(), winning.region.unwrap()));
        });
    }

    #[test]
    fn test_refinement_promotes_hidden_latches() {
        with_game(&shift_register(), |game| {
            let abs = Abstraction::new(game, &initial_visible(game));
            let over = abs.fixpoint(|l| abs.over_upre(l));
            let under = abs.fixpoint(|l| abs.under_upre(l));
            assert!(!over.realizable);
            assert!(under.realizable);
            let promoted = abs.refine(over.losing, under.losing);
            assert_eq!(promoted, BTreeSet::from([Lit::positive(4)]));
        });
    }

    #[test]
    fn test_agrees_with_exact_solver() {
        for circuit in [env_driven(), guarded_by_hidden(), shift_register()] {
            with_game(&circuit, |game| {
                let exact = attractor::solve_monolithic(game, false).unwrap();
                for threshold in [0, 1, 2, 8] {
                    let abs = solve(game, threshold, false).unwrap();
                    assert_eq!(abs.is_realizable(), exact.is_realizable());
                }
            });
        }
    }
}
