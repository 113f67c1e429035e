//! Quantification and cofactors.
//!
//! Quantified variables are passed as a positive cube (see
//! [`Manager::cube`]). Cofactors take a cube of literals of either
//! polarity.

use oxidd::{BooleanFunctionQuant, BooleanOperator};

use crate::bdd::Bdd;
use crate::manager::{Manager, alloc};

impl Manager {
    /// Existential quantification of the variables in `cube`.
    pub fn exists(&self, f: Bdd, cube: Bdd) -> Bdd {
        if f.is_constant() || cube.is_constant() {
            return f;
        }
        let (f, vars) = (self.function(f), self.function(cube));
        self.handle(alloc(f.exist(&vars)))
    }

    /// Universal quantification of the variables in `cube`.
    pub fn forall(&self, f: Bdd, cube: Bdd) -> Bdd {
        if f.is_constant() || cube.is_constant() {
            return f;
        }
        let (f, vars) = (self.function(f), self.function(cube));
        self.handle(alloc(f.forall(&vars)))
    }

    /// Relational product `∃cube. f ∧ g`, without building `f ∧ g`.
    pub fn and_exists(&self, f: Bdd, g: Bdd, cube: Bdd) -> Bdd {
        if f.is_false() || g.is_false() || f == !g {
            return Bdd::FALSE;
        }
        if f.is_true() || f == g {
            return self.exists(g, cube);
        }
        if g.is_true() {
            return self.exists(f, cube);
        }
        if cube.is_constant() {
            return self.and(f, g);
        }
        let (f, g, vars) = (self.function(f), self.function(g), self.function(cube));
        self.handle(alloc(f.apply_exist(BooleanOperator::And, &g, &vars)))
    }

    /// Cofactor of `f` with respect to a cube of literals.
    ///
    /// Every variable of the cube is fixed to the polarity it has in the
    /// cube. A false `cube` leaves `f` unchanged.
    pub fn cofactor(&self, f: Bdd, cube: Bdd) -> Bdd {
        if f.is_constant() || cube.is_constant() {
            return f;
        }
        let (f, literals) = (self.function(f), self.function(cube));
        self.handle(alloc(f.restrict(&literals)))
    }

    /// Cofactor of `f` with `var` fixed to `value`.
    pub fn cofactor_var(&self, f: Bdd, var: u32, value: bool) -> Bdd {
        let literal = if value { self.var(var) } else { self.nvar(var) };
        self.cofactor(f, literal)
    }
}
