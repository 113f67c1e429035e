//! Property-based tests for swiss-bdd
//!
//! Random Boolean expressions are built both as BDDs and as plain
//! evaluators, and the two are compared on every assignment.

mod algebra_properties;
mod quantifier_properties;

use proptest::prelude::*;
use swiss_bdd::{Bdd, Manager};

/// Number of variables used by the generated expressions
pub const NUM_VARS: u32 = 5;

/// A small Boolean expression
#[derive(Debug, Clone)]
pub enum Expr {
    Var(u32),
    Const(bool),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Xor(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Evaluate under an assignment given as a bit mask
    pub fn eval(&self, mask: u32) -> bool {
        match self {
            Expr::Var(v) => mask & (1 << v) != 0,
            Expr::Const(b) => *b,
            Expr::Not(e) => !e.eval(mask),
            Expr::And(a, b) => a.eval(mask) && b.eval(mask),
            Expr::Or(a, b) => a.eval(mask) || b.eval(mask),
            Expr::Xor(a, b) => a.eval(mask) != b.eval(mask),
        }
    }

    /// Build the expression in `mgr`
    pub fn build(&self, mgr: &Manager) -> Bdd {
        match self {
            Expr::Var(v) => mgr.var(*v),
            Expr::Const(true) => Bdd::TRUE,
            Expr::Const(false) => Bdd::FALSE,
            Expr::Not(e) => !e.build(mgr),
            Expr::And(a, b) => mgr.and(a.build(mgr), b.build(mgr)),
            Expr::Or(a, b) => mgr.or(a.build(mgr), b.build(mgr)),
            Expr::Xor(a, b) => mgr.xor(a.build(mgr), b.build(mgr)),
        }
    }
}

/// Strategy for generating expressions over `NUM_VARS` variables
pub fn expr_strategy() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        (0..NUM_VARS).prop_map(Expr::Var),
        any::<bool>().prop_map(Expr::Const),
    ];
    leaf.prop_recursive(5, 48, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| Expr::Not(Box::new(e))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::And(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::Or(Box::new(a), Box::new(b))),
            (inner.clone(), inner).prop_map(|(a, b)| Expr::Xor(Box::new(a), Box::new(b))),
        ]
    })
}

/// Strategy for generating a subset of the variables as a bit mask
pub fn var_set_strategy() -> impl Strategy<Value = u32> {
    0u32..(1 << NUM_VARS)
}

/// All assignments of `NUM_VARS` variables, as bit masks
pub fn all_masks() -> impl Iterator<Item = u32> {
    0..(1u32 << NUM_VARS)
}

/// Evaluate a BDD under a bit-mask assignment
pub fn eval_mask(mgr: &Manager, f: Bdd, mask: u32) -> bool {
    mgr.eval(f, |v| mask & (1 << v) != 0)
}

/// Variables in a bit mask
pub fn vars_of(mask: u32) -> Vec<u32> {
    (0..NUM_VARS).filter(|v| mask & (1 << v) != 0).collect()
}
