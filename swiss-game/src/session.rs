//! Decision-diagram state shared by every game over one circuit.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use swiss_aig::{Circuit, Lit, LitSet};
use swiss_bdd::{Bdd, Manager};
use tracing::debug;

use crate::config::VarOrdering;
use crate::error::Result;

/// Memo tables keyed by circuit literals and diagram nodes.
///
/// Both tables depend only on the circuit, never on a game's error
/// override, so sub-games share them with their parent.
#[derive(Debug, Default)]
pub struct SymbolicCache {
    pub(crate) lit2bdd: RefCell<FxHashMap<Lit, Bdd>>,
    pub(crate) bdd_deps: RefCell<FxHashMap<Bdd, Rc<LitSet>>>,
}

impl SymbolicCache {
    /// Number of memoized literal functions (both polarities counted).
    #[must_use]
    pub fn num_functions(&self) -> usize {
        self.lit2bdd.borrow().len()
    }

    /// Forget everything.
    pub fn clear(&self) {
        self.lit2bdd.borrow_mut().clear();
        self.bdd_deps.borrow_mut().clear();
    }
}

/// A manager sized for one circuit (error latch included) plus its caches.
#[derive(Debug)]
pub struct Session {
    mgr: Manager,
    cache: SymbolicCache,
}

impl Session {
    /// Create a session with a current and a primed variable per AIGER
    /// variable of `circuit`.
    pub fn new(circuit: &Circuit, ordering: VarOrdering) -> Result<Self> {
        let num_vars = (circuit.maxvar() + 1) * 2;
        let mgr = Manager::with_order(ordering.order(circuit, num_vars))?;
        debug!(num_vars, ?ordering, "session created");
        Ok(Self {
            mgr,
            cache: SymbolicCache::default(),
        })
    }

    /// The decision-diagram manager.
    #[must_use]
    pub fn manager(&self) -> &Manager {
        &self.mgr
    }

    /// Shared memo tables.
    #[must_use]
    pub fn cache(&self) -> &SymbolicCache {
        &self.cache
    }
}
