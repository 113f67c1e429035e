//! The BDD manager: an `oxidd` complement-edge BDD manager plus a table of
//! handles.
//!
//! All operations take `&self`; the handle table lives behind a `RefCell`
//! so that several game views can share one manager by plain reference.
//!
//! Every function handed out as a [`Bdd`] stays referenced from the handle
//! table, so its nodes are never collected and the handle is stable for the
//! lifetime of the manager. `oxidd` diagrams are canonical and each function
//! is interned once, so two handles are equal exactly when they denote the
//! same function. Handle-keyed caches in client code rely on both facts.

use std::cell::RefCell;

use oxidd::bcdd::{BCDDFunction, BCDDManagerRef};
use oxidd::util::AllocResult;
use oxidd::{BooleanFunction, Function, LevelNo, ManagerRef};
use oxidd_core::{HasLevel, Node};
use oxidd::Manager as DiagramManager;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::bdd::{Bdd, NodeIndex};
use crate::error::{BddError, Result};

/// Inner-node capacity of the underlying node store.
const NODE_CAPACITY: usize = 1 << 24;

/// Entries in the apply cache.
const CACHE_CAPACITY: usize = 1 << 16;

/// Level reported for the constants (below every variable).
pub(crate) const TERMINAL_LEVEL: u32 = u32::MAX;

/// Unwrap the result of a diagram operation.
///
/// `oxidd` only fails when its node store is full, the diagram analogue of
/// a failed heap allocation, which aborts the run just the same.
pub(crate) fn alloc<T>(result: AllocResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(_) => panic!("BDD node store exhausted ({NODE_CAPACITY} nodes)"),
    }
}

/// Manager statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagerStats {
    /// Inner nodes currently stored.
    pub nodes: usize,
    /// Distinct functions handed out as handles.
    pub handles: usize,
}

/// Interned functions, one per complement pair.
struct Handles {
    functions: Vec<BCDDFunction>,
    index: FxHashMap<BCDDFunction, NodeIndex>,
}

/// A shared pool of BDD nodes over a fixed set of variables.
pub struct Manager {
    dd: BCDDManagerRef,
    one: BCDDFunction,
    /// Projection functions, by variable.
    vars: Vec<BCDDFunction>,
    var_handles: Vec<Bdd>,
    /// `level_of[var]`: position of `var` in the order.
    level_of: Vec<u32>,
    /// `var_at[level]`: variable placed at `level`.
    var_at: Vec<u32>,
    handles: RefCell<Handles>,
}

impl Manager {
    /// Create a manager over variables `0..num_vars` in natural order.
    ///
    /// # Panics
    ///
    /// Panics if the node store cannot hold `num_vars` variables.
    #[must_use]
    pub fn new(num_vars: u32) -> Self {
        match Self::with_order((0..num_vars).collect()) {
            Ok(mgr) => mgr,
            Err(e) => panic!("cannot create a manager over {num_vars} variables: {e}"),
        }
    }

    /// Create a manager whose `i`-th level holds variable `order[i]`.
    ///
    /// `order` must be a permutation of `0..order.len()`.
    pub fn with_order(order: Vec<u32>) -> Result<Self> {
        let n = order.len();
        let mut level_of = vec![u32::MAX; n];
        for (level, &var) in order.iter().enumerate() {
            let slot = level_of
                .get_mut(var as usize)
                .ok_or(BddError::VariableOutOfRange { var, num_vars: n })?;
            if *slot != u32::MAX {
                return Err(BddError::DuplicateVariable(var));
            }
            *slot = level as u32;
        }

        let dd = oxidd::bcdd::new_manager(NODE_CAPACITY, CACHE_CAPACITY, 1);
        // Levels are created top-down, so level `i` holds `order[i]`.
        let by_level = dd
            .with_manager_exclusive(|manager| {
                (0..n)
                    .map(|_| BCDDFunction::new_var(manager))
                    .collect::<AllocResult<Vec<_>>>()
            })
            .map_err(|_| BddError::OutOfMemory { num_vars: n })?;
        let one = dd.with_manager_shared(|manager| BCDDFunction::t(manager));
        let vars: Vec<BCDDFunction> = level_of
            .iter()
            .map(|&level| by_level[level as usize].clone())
            .collect();

        let mut index = FxHashMap::default();
        index.insert(one.clone(), 0);
        let mut mgr = Self {
            dd,
            one: one.clone(),
            vars,
            var_handles: Vec::new(),
            level_of,
            var_at: order,
            handles: RefCell::new(Handles {
                functions: vec![one],
                index,
            }),
        };
        mgr.var_handles = mgr.vars.iter().map(|v| mgr.handle(v.clone())).collect();
        debug!(num_vars = n, "BDD manager created");
        Ok(mgr)
    }

    /// Number of variables.
    #[must_use]
    pub fn num_vars(&self) -> u32 {
        self.level_of.len() as u32
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> ManagerStats {
        ManagerStats {
            nodes: self.dd.with_manager_shared(|manager| manager.num_inner_nodes()),
            handles: self.handles.borrow().functions.len(),
        }
    }

    /// The projection function of `var`.
    ///
    /// # Panics
    ///
    /// Panics if `var` is not below [`num_vars`](Self::num_vars).
    pub fn var(&self, var: u32) -> Bdd {
        assert!(
            var < self.num_vars(),
            "variable {var} out of range (manager has {} variables)",
            self.num_vars()
        );
        self.var_handles[var as usize]
    }

    /// The negated projection function of `var`.
    pub fn nvar(&self, var: u32) -> Bdd {
        !self.var(var)
    }

    // ------------------------------------------------------------------
    // Handle table
    // ------------------------------------------------------------------

    /// Intern `f`. Of each complement pair the smaller function is stored,
    /// except that true is always the stored constant.
    pub(crate) fn handle(&self, f: BCDDFunction) -> Bdd {
        let negated = alloc(f.not());
        if f == self.one {
            return Bdd::TRUE;
        }
        if negated == self.one {
            return Bdd::FALSE;
        }
        let (regular, complemented) = if negated < f {
            (negated, true)
        } else {
            (f, false)
        };
        let mut handles = self.handles.borrow_mut();
        let existing = handles.index.get(&regular).copied();
        let index = match existing {
            Some(index) => index,
            None => {
                let index = handles.functions.len() as NodeIndex;
                handles.functions.push(regular.clone());
                handles.index.insert(regular, index);
                index
            }
        };
        Bdd::from_parts(index, complemented)
    }

    /// The function behind a handle.
    pub(crate) fn function(&self, f: Bdd) -> BCDDFunction {
        let regular = self.handles.borrow().functions[f.index() as usize].clone();
        if f.is_complemented() {
            alloc(regular.not_owned())
        } else {
            regular
        }
    }

    /// The projection function of `var`, unwrapped.
    pub(crate) fn var_function(&self, var: u32) -> &BCDDFunction {
        &self.vars[var as usize]
    }

    pub(crate) fn var_at_level(&self, level: u32) -> u32 {
        self.var_at[level as usize]
    }

    /// Level of the top variable of `f`, or [`TERMINAL_LEVEL`] for constants.
    pub(crate) fn top_level(&self, f: Bdd) -> u32 {
        if f.is_constant() {
            return TERMINAL_LEVEL;
        }
        level_of_root(&self.function(f)).unwrap_or(TERMINAL_LEVEL)
    }

    /// Cofactors of `f` with respect to the variable at `level`; `f` itself
    /// twice if that variable is not the top of `f`.
    pub(crate) fn branches(&self, f: Bdd, level: u32) -> (Bdd, Bdd) {
        if self.top_level(f) != level {
            return (f, f);
        }
        match self.decompose(f) {
            Some((_, low, high)) => (low, high),
            None => (f, f),
        }
    }

    /// `ite(var_at(level), high, low)`.
    pub(crate) fn mk(&self, level: u32, low: Bdd, high: Bdd) -> Bdd {
        if low == high {
            return low;
        }
        self.ite(self.var(self.var_at_level(level)), high, low)
    }

    /// Top variable and its two cofactors `(var, low, high)`, or `None` for
    /// a constant.
    #[must_use]
    pub fn decompose(&self, f: Bdd) -> Option<(u32, Bdd, Bdd)> {
        if f.is_constant() {
            return None;
        }
        let g = self.function(f);
        let level = level_of_root(&g)?;
        let (high, low) = g.cofactors()?;
        Some((self.var_at_level(level), self.handle(low), self.handle(high)))
    }

    fn apply(
        &self,
        f: Bdd,
        g: Bdd,
        op: impl FnOnce(&BCDDFunction, &BCDDFunction) -> AllocResult<BCDDFunction>,
    ) -> Bdd {
        let (f, g) = (self.function(f), self.function(g));
        self.handle(alloc(op(&f, &g)))
    }

    // ------------------------------------------------------------------
    // Connectives
    // ------------------------------------------------------------------

    /// Conjunction.
    pub fn and(&self, f: Bdd, g: Bdd) -> Bdd {
        if f.is_false() || g.is_false() || f == !g {
            return Bdd::FALSE;
        }
        if f.is_true() || f == g {
            return g;
        }
        if g.is_true() {
            return f;
        }
        self.apply(f, g, |a, b| a.and(b))
    }

    /// Disjunction.
    pub fn or(&self, f: Bdd, g: Bdd) -> Bdd {
        !self.and(!f, !g)
    }

    /// Exclusive or.
    pub fn xor(&self, f: Bdd, g: Bdd) -> Bdd {
        if f == g {
            return Bdd::FALSE;
        }
        if f == !g {
            return Bdd::TRUE;
        }
        match (f.is_constant(), g.is_constant()) {
            (true, _) if f.is_false() => g,
            (true, _) => !g,
            (_, true) if g.is_false() => f,
            (_, true) => !f,
            _ => self.apply(f, g, |a, b| a.xor(b)),
        }
    }

    /// Equivalence.
    pub fn iff(&self, f: Bdd, g: Bdd) -> Bdd {
        !self.xor(f, g)
    }

    /// If-then-else: `(f ∧ g) ∨ (¬f ∧ h)`.
    pub fn ite(&self, f: Bdd, g: Bdd, h: Bdd) -> Bdd {
        if f.is_true() || g == h {
            return g;
        }
        if f.is_false() {
            return h;
        }
        if g.is_true() && h.is_false() {
            return f;
        }
        if g.is_false() && h.is_true() {
            return !f;
        }
        let (f, g, h) = (self.function(f), self.function(g), self.function(h));
        self.handle(alloc(f.ite(&g, &h)))
    }

    /// Conjunction of many functions.
    pub fn and_all(&self, fs: impl IntoIterator<Item = Bdd>) -> Bdd {
        let mut acc = Bdd::TRUE;
        for f in fs {
            acc = self.and(acc, f);
            if acc.is_false() {
                break;
            }
        }
        acc
    }

    /// Disjunction of many functions.
    pub fn or_all(&self, fs: impl IntoIterator<Item = Bdd>) -> Bdd {
        let mut acc = Bdd::FALSE;
        for f in fs {
            acc = self.or(acc, f);
            if acc.is_true() {
                break;
            }
        }
        acc
    }

    /// Positive cube (conjunction) of the given variables.
    pub fn cube(&self, vars: impl IntoIterator<Item = u32>) -> Bdd {
        let mut vars: Vec<u32> = vars.into_iter().collect();
        // Bottom-up keeps every intermediate conjunction a single path.
        vars.sort_unstable_by_key(|&v| std::cmp::Reverse(self.level_of[v as usize]));
        vars.dedup();
        self.and_all(vars.into_iter().map(|v| self.var(v)))
    }

    /// Check `f ⇒ g`.
    pub fn leq(&self, f: Bdd, g: Bdd) -> bool {
        self.and(f, !g).is_false()
    }

    /// Check that `f ∧ g` is satisfiable.
    pub fn intersects(&self, f: Bdd, g: Bdd) -> bool {
        !self.and(f, g).is_false()
    }
}

/// Level of the root node of `f`, `None` at a terminal.
fn level_of_root(f: &BCDDFunction) -> Option<LevelNo> {
    f.with_manager_shared(|manager, edge| match manager.get_node(edge) {
        Node::Inner(node) => Some(node.level()),
        Node::Terminal(_) => None,
    })
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("num_vars", &self.num_vars())
            .field("stats", &self.stats())
            .finish()
    }
}
