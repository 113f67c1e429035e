//! Simultaneous substitution and care-set simplification.

use oxidd::FunctionSubst;
use oxidd::Subst;
use rustc_hash::FxHashMap;

use crate::bdd::Bdd;
use crate::manager::{Manager, alloc};

impl Manager {
    /// Coudert's restrict: a function agreeing with `f` wherever `care`
    /// holds, usually smaller than `f`.
    ///
    /// Variables of `care` that do not occur in `f` are quantified away on
    /// the fly, so the result never depends on variables outside the
    /// support of `f`. With an empty care set `f` is returned unchanged.
    pub fn restrict(&self, f: Bdd, care: Bdd) -> Bdd {
        let mut memo = FxHashMap::default();
        self.restrict_rec(f, care, &mut memo)
    }

    fn restrict_rec(&self, f: Bdd, care: Bdd, memo: &mut FxHashMap<(Bdd, Bdd), Bdd>) -> Bdd {
        if care.is_constant() || f.is_constant() {
            return f;
        }
        if f == care {
            return Bdd::TRUE;
        }
        if f == !care {
            return Bdd::FALSE;
        }
        if let Some(&hit) = memo.get(&(f, care)) {
            return hit;
        }
        let lf = self.top_level(f);
        let lc = self.top_level(care);
        let result = if lc < lf {
            let (c0, c1) = self.branches(care, lc);
            let widened = self.or(c0, c1);
            self.restrict_rec(f, widened, memo)
        } else {
            let (f0, f1) = self.branches(f, lf);
            let (c0, c1) = self.branches(care, lf);
            if c0.is_false() {
                self.restrict_rec(f1, c1, memo)
            } else if c1.is_false() {
                self.restrict_rec(f0, c0, memo)
            } else {
                let low = self.restrict_rec(f0, c0, memo);
                let high = self.restrict_rec(f1, c1, memo);
                self.mk(lf, low, high)
            }
        };
        memo.insert((f, care), result);
        result
    }

    /// Replace every variable `v` of `f` by `sub[v]`, simultaneously.
    ///
    /// Variables beyond the end of `sub` are left in place.
    pub fn vector_compose(&self, f: Bdd, sub: &[Bdd]) -> Bdd {
        if f.is_constant() {
            return f;
        }
        let mut vars = Vec::new();
        let mut replacements = Vec::new();
        for (v, &g) in sub.iter().enumerate().take(self.num_vars() as usize) {
            let v = v as u32;
            if g != self.var(v) {
                vars.push(self.var_function(v).clone());
                replacements.push(self.function(g));
            }
        }
        if vars.is_empty() {
            return f;
        }
        let substitution = Subst::new(vars, replacements);
        self.handle(alloc(self.function(f).substitute(&substitution)))
    }

    /// Exchange the variables of each pair in `f`.
    pub fn swap_variables(&self, f: Bdd, pairs: &[(u32, u32)]) -> Bdd {
        let mut sub: Vec<Bdd> = (0..self.num_vars()).map(|v| self.var(v)).collect();
        for &(a, b) in pairs {
            sub.swap(a as usize, b as usize);
        }
        self.vector_compose(f, &sub)
    }
}
