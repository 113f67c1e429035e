//! Symbolic safety games over a circuit.
//!
//! A [`Game`] is a view over a [`Circuit`] with its error latch attached,
//! a [`Manager`] sized by a [`Session`], and the session's shared caches.
//! Sub-games created with [`Game::subgame`] keep a subset of the latches and
//! inputs and replace the error latch's next function with an arbitrary
//! error function.

use std::cell::OnceCell;
use std::rc::Rc;

use swiss_aig::{Circuit, Lit, LitSet};
use swiss_bdd::{Bdd, Manager};
use tracing::{debug, trace};

use crate::config::Substitution;
use crate::error::{Result, SynthError};
use crate::session::{Session, SymbolicCache};

/// Games with at most this many latches cross-check both substitution modes
/// in debug builds.
const CROSS_CHECK_LATCHES: usize = 8;

/// A latch of the game: its literal and next-state literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateLatch {
    /// Positive literal of the latch
    pub lit: Lit,
    /// Next-state literal in the circuit
    pub next: Lit,
}

/// Restrict `f` to `care`, keeping the result only if it is strictly smaller.
pub fn safe_restrict(mgr: &Manager, f: Bdd, care: Bdd) -> Bdd {
    let restricted = mgr.restrict(f, care);
    debug_assert_eq!(
        mgr.and(restricted, care),
        mgr.and(f, care),
        "restrict changed the function on its care set"
    );
    if mgr.node_count(restricted) < mgr.node_count(f) {
        restricted
    } else {
        f
    }
}

/// A safety game: the controller must keep the error latch low forever.
#[derive(Debug)]
pub struct Game<'a> {
    circuit: &'a Circuit,
    mgr: &'a Manager,
    cache: &'a SymbolicCache,
    substitution: Substitution,
    latches: Vec<StateLatch>,
    cinputs: Vec<Lit>,
    uinputs: Vec<Lit>,
    error_latch: Lit,
    short_error: Option<Bdd>,
    latch_cube: OnceCell<Bdd>,
    primed_latch_cube: OnceCell<Bdd>,
    cinput_cube: OnceCell<Bdd>,
    uinput_cube: OnceCell<Bdd>,
    trans_rel: OnceCell<Bdd>,
    compose_vec: OnceCell<Vec<Bdd>>,
}

impl<'a> Game<'a> {
    /// The full game of `circuit`, which must carry its error latch.
    pub fn new(
        circuit: &'a Circuit,
        session: &'a Session,
        substitution: Substitution,
    ) -> Result<Self> {
        let error = circuit.error_latch().ok_or(SynthError::MissingErrorLatch)?;
        let latches = circuit
            .state_latches()
            .map(|l| StateLatch {
                lit: l.lit,
                next: l.next,
            })
            .collect();
        let game = Self::from_parts(
            circuit,
            session.manager(),
            session.cache(),
            substitution,
            latches,
            circuit.controllable_inputs().map(|i| i.lit).collect(),
            circuit.uncontrollable_inputs().map(|i| i.lit).collect(),
            error.lit,
            None,
        );
        debug!(
            latches = game.latches.len(),
            cinputs = game.cinputs.len(),
            uinputs = game.uinputs.len(),
            "game created"
        );
        Ok(game)
    }

    #[allow(clippy::too_many_arguments)]
    fn from_parts(
        circuit: &'a Circuit,
        mgr: &'a Manager,
        cache: &'a SymbolicCache,
        substitution: Substitution,
        latches: Vec<StateLatch>,
        cinputs: Vec<Lit>,
        uinputs: Vec<Lit>,
        error_latch: Lit,
        short_error: Option<Bdd>,
    ) -> Self {
        Self {
            circuit,
            mgr,
            cache,
            substitution,
            latches,
            cinputs,
            uinputs,
            error_latch,
            short_error,
            latch_cube: OnceCell::new(),
            primed_latch_cube: OnceCell::new(),
            cinput_cube: OnceCell::new(),
            uinput_cube: OnceCell::new(),
            trans_rel: OnceCell::new(),
            compose_vec: OnceCell::new(),
        }
    }

    /// Restriction of this game to the dependencies of `error`, with
    /// `error` as the new error function.
    ///
    /// The error latch is always kept. Caches are shared with `self`.
    #[must_use]
    pub fn subgame(&self, error: Bdd) -> Game<'a> {
        self.restricted(error, &self.bdd_deps(error))
    }

    /// Like [`subgame`](Self::subgame), but also keeping every latch that
    /// `region` depends on.
    ///
    /// A fixpoint started from `region` needs those latches: the initial
    /// state only pins the latches the game keeps.
    #[must_use]
    pub fn subgame_around(&self, error: Bdd, region: Bdd) -> Game<'a> {
        let deps = self.bdd_deps(self.mgr.or(error, region));
        self.restricted(error, &deps)
    }

    fn restricted(&self, error: Bdd, deps: &LitSet) -> Game<'a> {
        let latches: Vec<StateLatch> = self
            .latches
            .iter()
            .filter(|l| l.lit == self.error_latch || deps.contains(&l.lit))
            .copied()
            .collect();
        let cinputs: Vec<Lit> = self.cinputs.iter().filter(|l| deps.contains(l)).copied().collect();
        let uinputs: Vec<Lit> = self.uinputs.iter().filter(|l| deps.contains(l)).copied().collect();
        debug!(
            latches = latches.len(),
            cinputs = cinputs.len(),
            uinputs = uinputs.len(),
            "sub-game created"
        );
        Self::from_parts(
            self.circuit,
            self.mgr,
            self.cache,
            self.substitution,
            latches,
            cinputs,
            uinputs,
            self.error_latch,
            Some(error),
        )
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The underlying circuit.
    #[must_use]
    pub fn circuit(&self) -> &'a Circuit {
        self.circuit
    }

    /// The decision-diagram manager.
    #[must_use]
    pub fn manager(&self) -> &'a Manager {
        self.mgr
    }

    /// Latches of this game, the error latch included.
    #[must_use]
    pub fn latches(&self) -> &[StateLatch] {
        &self.latches
    }

    /// Controllable inputs of this game.
    #[must_use]
    pub fn cinputs(&self) -> &[Lit] {
        &self.cinputs
    }

    /// Uncontrollable inputs of this game.
    #[must_use]
    pub fn uinputs(&self) -> &[Lit] {
        &self.uinputs
    }

    /// Literal of the error latch.
    #[must_use]
    pub fn error_latch(&self) -> Lit {
        self.error_latch
    }

    /// The override error function of a sub-game.
    #[must_use]
    pub fn short_error(&self) -> Option<Bdd> {
        self.short_error
    }

    /// Latch substitution mode.
    #[must_use]
    pub fn substitution(&self) -> Substitution {
        self.substitution
    }

    // ------------------------------------------------------------------
    // Signals as diagrams
    // ------------------------------------------------------------------

    /// The variable of a base literal.
    #[must_use]
    pub fn var(&self, lit: Lit) -> Bdd {
        self.mgr.var(lit.strip().raw())
    }

    /// The function computed by `lit`.
    ///
    /// Inputs, latches and the error latch are variables; gates are
    /// translated bottom-up without recursion.
    pub fn lit2bdd(&self, lit: Lit) -> Bdd {
        if let Some(&hit) = self.cache.lit2bdd.borrow().get(&lit) {
            return hit;
        }
        let mut stack = vec![lit.strip()];
        while let Some(&top) = stack.last() {
            if self.cache.lit2bdd.borrow().contains_key(&top) {
                stack.pop();
                continue;
            }
            let value = if top.is_constant() {
                Some(Bdd::FALSE)
            } else if let Some(&gate) = self.circuit.gate(top) {
                let operands = {
                    let table = self.cache.lit2bdd.borrow();
                    (
                        table.get(&gate.rhs0).copied(),
                        table.get(&gate.rhs1).copied(),
                    )
                };
                match operands {
                    (Some(a), Some(b)) => Some(self.mgr.and(a, b)),
                    (a, b) => {
                        if a.is_none() {
                            stack.push(gate.rhs0.strip());
                        }
                        if b.is_none() {
                            stack.push(gate.rhs1.strip());
                        }
                        None
                    }
                }
            } else {
                debug_assert!(self.circuit.is_defined(top), "undefined literal {top}");
                Some(self.mgr.var(top.raw()))
            };
            if let Some(value) = value {
                let mut table = self.cache.lit2bdd.borrow_mut();
                table.insert(top, value);
                table.insert(!top, !value);
                stack.pop();
            }
        }
        let table = self.cache.lit2bdd.borrow();
        table.get(&lit).copied().unwrap_or(Bdd::FALSE)
    }

    /// Next-state function of `latch` in this game.
    ///
    /// In a sub-game the error latch reads the override error, and the other
    /// latches are simplified outside it.
    #[must_use]
    pub fn next_function(&self, latch: &StateLatch) -> Bdd {
        match self.short_error {
            Some(error) if latch.lit == self.error_latch => error,
            Some(error) => safe_restrict(self.mgr, self.lit2bdd(latch.next), !error),
            None => self.lit2bdd(latch.next),
        }
    }

    /// States where the error latch is high.
    #[must_use]
    pub fn error_states(&self) -> Bdd {
        let error = self.var(self.error_latch);
        debug_assert!(self.support_within_latches(error));
        error
    }

    /// The initial state: every latch low.
    #[must_use]
    pub fn init_state(&self) -> Bdd {
        let init = self
            .mgr
            .and_all(self.latches.iter().map(|l| !self.var(l.lit)));
        debug_assert!(self.support_within_latches(init));
        init
    }

    fn support_within_latches(&self, f: Bdd) -> bool {
        self.mgr
            .support(f)
            .into_iter()
            .all(|v| self.latches.iter().any(|l| l.lit.raw() == v))
    }

    // ------------------------------------------------------------------
    // Cubes
    // ------------------------------------------------------------------

    /// Conjunction of the latch variables.
    pub fn latch_cube(&self) -> Bdd {
        *self
            .latch_cube
            .get_or_init(|| self.mgr.cube(self.latches.iter().map(|l| l.lit.raw())))
    }

    /// Conjunction of the primed latch variables.
    pub fn primed_latch_cube(&self) -> Bdd {
        *self
            .primed_latch_cube
            .get_or_init(|| self.mgr.cube(self.latches.iter().map(|l| l.lit.primed())))
    }

    /// Conjunction of the controllable input variables.
    pub fn cinput_cube(&self) -> Bdd {
        *self
            .cinput_cube
            .get_or_init(|| self.mgr.cube(self.cinputs.iter().map(|l| l.raw())))
    }

    /// Conjunction of the uncontrollable input variables.
    pub fn uinput_cube(&self) -> Bdd {
        *self
            .uinput_cube
            .get_or_init(|| self.mgr.cube(self.uinputs.iter().map(|l| l.raw())))
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Rename every latch variable of `f` to its primed copy.
    #[must_use]
    pub fn prime_latches(&self, f: Bdd) -> Bdd {
        let pairs: Vec<(u32, u32)> = self
            .latches
            .iter()
            .map(|l| (l.lit.raw(), l.lit.primed()))
            .collect();
        self.mgr.swap_variables(f, &pairs)
    }

    /// `∧ primed(l) ⇔ next(l)` over the latches.
    pub fn trans_rel(&self) -> Bdd {
        *self.trans_rel.get_or_init(|| {
            let rel = self.mgr.and_all(self.latches.iter().map(|l| {
                self.mgr
                    .iff(self.mgr.var(l.lit.primed()), self.next_function(l))
            }));
            debug!(nodes = self.mgr.node_count(rel), "transition relation built");
            rel
        })
    }

    /// Identity substitution except at latch positions, which hold the
    /// latches' next functions.
    pub fn next_fun_compose_vec(&self) -> &[Bdd] {
        self.compose_vec.get_or_init(|| {
            let mut vec: Vec<Bdd> = (0..self.mgr.num_vars()).map(|v| self.mgr.var(v)).collect();
            for latch in &self.latches {
                vec[latch.lit.raw() as usize] = self.next_function(latch);
            }
            vec
        })
    }

    /// `dst` with every latch replaced by its next function.
    ///
    /// With a care set, next functions are simplified on it first; the result
    /// is then only exact on `care`.
    pub fn substitute_latches_next(&self, dst: Bdd, care: Option<Bdd>) -> Bdd {
        let result = match self.substitution {
            Substitution::Relational => self.substitute_relational(dst, care),
            Substitution::Functional => self.substitute_functional(dst, care),
        };
        if cfg!(debug_assertions) && self.latches.len() <= CROSS_CHECK_LATCHES {
            let other = match self.substitution {
                Substitution::Relational => self.substitute_functional(dst, care),
                Substitution::Functional => self.substitute_relational(dst, care),
            };
            let care = care.unwrap_or(Bdd::TRUE);
            debug_assert_eq!(
                self.mgr.and(result, care),
                self.mgr.and(other, care),
                "substitution modes disagree"
            );
        }
        result
    }

    fn substitute_relational(&self, dst: Bdd, care: Option<Bdd>) -> Bdd {
        let trans = match care {
            Some(care) => safe_restrict(self.mgr, self.trans_rel(), care),
            None => self.trans_rel(),
        };
        self.mgr
            .and_exists(trans, self.prime_latches(dst), self.primed_latch_cube())
    }

    fn substitute_functional(&self, dst: Bdd, care: Option<Bdd>) -> Bdd {
        match care {
            None => self.mgr.vector_compose(dst, self.next_fun_compose_vec()),
            Some(care) => {
                let mut vec = self.next_fun_compose_vec().to_vec();
                for latch in &self.latches {
                    let slot = &mut vec[latch.lit.raw() as usize];
                    *slot = safe_restrict(self.mgr, *slot, care);
                }
                self.mgr.vector_compose(dst, &vec)
            }
        }
    }

    /// Uncontrollable predecessors of `dst`: states from which the
    /// environment can force the next state into `dst`.
    ///
    /// Returns the predecessors and the substituted transitions into `dst`.
    pub fn upre(&self, dst: Bdd) -> (Bdd, Bdd) {
        let trans = self.substitute_latches_next(dst, Some(!dst));
        let forced = self.mgr.forall(trans, self.cinput_cube());
        let pre = self.mgr.exists(forced, self.uinput_cube());
        trace!(
            trans = self.mgr.node_count(trans),
            pre = self.mgr.node_count(pre),
            "upre"
        );
        (pre, trans)
    }

    // ------------------------------------------------------------------
    // Dependencies
    // ------------------------------------------------------------------

    /// Support of `f`, extended through every latch in it into the cone of
    /// its next function.
    pub fn bdd_deps(&self, f: Bdd) -> Rc<LitSet> {
        let key = f.regular();
        if let Some(hit) = self.cache.bdd_deps.borrow().get(&key) {
            return Rc::clone(hit);
        }
        let mut deps = LitSet::new();
        for var in self.mgr.support(f) {
            if var % 2 == 1 {
                continue;
            }
            let lit = Lit::from_raw(var);
            deps.insert(lit);
            if let Some(latch) = self.circuit.latch(lit) {
                deps.extend(self.circuit.lit_deps(latch.next).iter().copied());
            }
        }
        let deps = Rc::new(deps);
        self.cache.bdd_deps.borrow_mut().insert(key, Rc::clone(&deps));
        deps
    }
}
