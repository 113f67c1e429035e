//! The AND-inverter graph.
//!
//! A [`Circuit`] is append-only: inputs, latches and gates are only ever
//! added. The two exceptions are the synthetic error latch, which can be
//! pushed and popped symmetrically, and [`Circuit::input2gate`], which turns
//! a controllable input into a gate once its strategy is known.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::{SmallVec, smallvec};
use tracing::debug;

use crate::error::{AigerError, Result};
use crate::literal::{Lit, Var};

/// Inputs whose symbol starts with this prefix belong to the controller.
pub const CONTROLLABLE_PREFIX: &str = "controllable";

/// Symbol given to the synthetic error latch.
pub const ERROR_LATCH_NAME: &str = "error";

/// A primary input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    /// Positive literal of the input
    pub lit: Lit,
    /// Symbol, if any
    pub name: Option<String>,
}

impl Input {
    /// Check if the controller drives this input.
    #[must_use]
    pub fn is_controllable(&self) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| name.starts_with(CONTROLLABLE_PREFIX))
    }
}

/// A latch, reset to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Latch {
    /// Positive literal of the latch output
    pub lit: Lit,
    /// Next-state literal
    pub next: Lit,
    /// Symbol, if any
    pub name: Option<String>,
}

/// A two-input AND gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AndGate {
    /// Positive literal defined by the gate
    pub lhs: Lit,
    /// First operand
    pub rhs0: Lit,
    /// Second operand
    pub rhs1: Lit,
}

/// A primary output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Output literal
    pub lit: Lit,
    /// Symbol, if any
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Input(usize),
    Latch(usize),
    And(usize),
}

/// A set of base (input, latch or error latch) literals.
pub type LitSet = BTreeSet<Lit>;

/// A chain of same-polarity AND gates flattened into one wide conjunction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conjuncts {
    /// Operands of the wide AND: leaves that are not positive AND gates
    pub operands: Vec<Lit>,
    /// Stripped literals of the operands that are negated AND gates
    pub negated_ands: Vec<Lit>,
}

/// An AND-inverter graph with latches and classified inputs.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    maxvar: Var,
    inputs: Vec<Input>,
    latches: Vec<Latch>,
    gates: Vec<AndGate>,
    outputs: Vec<Output>,
    comments: Vec<String>,
    nodes: FxHashMap<Var, Node>,
    error_latch: Option<Latch>,
    deps_cache: RefCell<FxHashMap<Lit, Rc<LitSet>>>,
    support_cache: RefCell<FxHashMap<Lit, Rc<LitSet>>>,
    conjuncts_cache: RefCell<FxHashMap<Lit, Rc<Conjuncts>>>,
}

impl Circuit {
    /// Create an empty circuit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum variable index in use.
    #[must_use]
    pub fn maxvar(&self) -> Var {
        self.maxvar
    }

    pub(crate) fn reserve_maxvar(&mut self, maxvar: Var) {
        self.maxvar = self.maxvar.max(maxvar);
    }

    fn invalidate(&mut self) {
        self.deps_cache.get_mut().clear();
        self.support_cache.get_mut().clear();
        self.conjuncts_cache.get_mut().clear();
    }

    fn define(&mut self, lit: Lit, node: Node) -> Result<()> {
        if lit.is_negated() || lit.is_constant() || self.nodes.contains_key(&lit.var()) {
            return Err(AigerError::InvalidDefinition(lit.raw()));
        }
        if self.error_latch.as_ref().is_some_and(|l| l.lit == lit) {
            return Err(AigerError::InvalidDefinition(lit.raw()));
        }
        self.nodes.insert(lit.var(), node);
        self.maxvar = self.maxvar.max(lit.var());
        self.invalidate();
        Ok(())
    }

    /// Add a primary input.
    pub fn add_input(&mut self, lit: Lit, name: Option<String>) -> Result<()> {
        self.define(lit, Node::Input(self.inputs.len()))?;
        self.inputs.push(Input { lit, name });
        Ok(())
    }

    /// Add a latch with the given next-state literal.
    pub fn add_latch(&mut self, lit: Lit, next: Lit, name: Option<String>) -> Result<()> {
        self.define(lit, Node::Latch(self.latches.len()))?;
        self.latches.push(Latch { lit, next, name });
        Ok(())
    }

    /// Add an AND gate defining `lhs`.
    pub fn add_and(&mut self, lhs: Lit, rhs0: Lit, rhs1: Lit) -> Result<()> {
        self.define(lhs, Node::And(self.gates.len()))?;
        self.gates.push(AndGate { lhs, rhs0, rhs1 });
        Ok(())
    }

    /// Add a primary output.
    pub fn add_output(&mut self, lit: Lit, name: Option<String>) {
        self.maxvar = self.maxvar.max(lit.var());
        self.outputs.push(Output { lit, name });
    }

    /// Drop every primary output.
    pub fn remove_outputs(&mut self) {
        self.outputs.clear();
    }

    /// Append a line to the comment section.
    pub fn add_comment(&mut self, line: impl Into<String>) {
        self.comments.push(line.into());
    }

    pub(crate) fn set_input_name(&mut self, index: usize, name: String) -> bool {
        match self.inputs.get_mut(index) {
            Some(input) => {
                input.name = Some(name);
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_latch_name(&mut self, index: usize, name: String) -> bool {
        match self.latches.get_mut(index) {
            Some(latch) => {
                latch.name = Some(name);
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_output_name(&mut self, index: usize, name: String) -> bool {
        match self.outputs.get_mut(index) {
            Some(output) => {
                output.name = Some(name);
                true
            }
            None => false,
        }
    }

    /// Primary inputs, in declaration order.
    #[must_use]
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Latches, in declaration order. The error latch is not included.
    #[must_use]
    pub fn latches(&self) -> &[Latch] {
        &self.latches
    }

    /// AND gates, in insertion order.
    #[must_use]
    pub fn gates(&self) -> &[AndGate] {
        &self.gates
    }

    /// Primary outputs.
    #[must_use]
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Comment lines.
    #[must_use]
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// The first output literal.
    #[must_use]
    pub fn output(&self) -> Option<Lit> {
        self.outputs.first().map(|o| o.lit)
    }

    /// Inputs driven by the controller.
    pub fn controllable_inputs(&self) -> impl Iterator<Item = &Input> {
        self.inputs.iter().filter(|i| i.is_controllable())
    }

    /// Inputs driven by the environment.
    pub fn uncontrollable_inputs(&self) -> impl Iterator<Item = &Input> {
        self.inputs.iter().filter(|i| !i.is_controllable())
    }

    /// Latches followed by the error latch, when attached.
    pub fn state_latches(&self) -> impl Iterator<Item = &Latch> {
        self.latches.iter().chain(self.error_latch.as_ref())
    }

    /// The input defining `lit`'s variable.
    #[must_use]
    pub fn input(&self, lit: Lit) -> Option<&Input> {
        match self.nodes.get(&lit.var()) {
            Some(&Node::Input(i)) if !lit.is_constant() => self.inputs.get(i),
            _ => None,
        }
    }

    /// The latch defining `lit`'s variable (never the error latch).
    #[must_use]
    pub fn latch(&self, lit: Lit) -> Option<&Latch> {
        match self.nodes.get(&lit.var()) {
            Some(&Node::Latch(i)) if !lit.is_constant() => self.latches.get(i),
            _ => None,
        }
    }

    /// The AND gate defining `lit`'s variable.
    #[must_use]
    pub fn gate(&self, lit: Lit) -> Option<&AndGate> {
        match self.nodes.get(&lit.var()) {
            Some(&Node::And(i)) if !lit.is_constant() => self.gates.get(i),
            _ => None,
        }
    }

    /// Check if `lit`'s variable is defined (input, latch, gate or error latch).
    #[must_use]
    pub fn is_defined(&self, lit: Lit) -> bool {
        lit.is_constant() || self.nodes.contains_key(&lit.var()) || self.is_error_latch(lit)
    }

    // ------------------------------------------------------------------
    // Error latch
    // ------------------------------------------------------------------

    /// The synthetic error latch, when attached.
    #[must_use]
    pub fn error_latch(&self) -> Option<&Latch> {
        self.error_latch.as_ref()
    }

    /// Check if `lit`'s variable is the error latch.
    #[must_use]
    pub fn is_error_latch(&self, lit: Lit) -> bool {
        self.error_latch
            .as_ref()
            .is_some_and(|l| l.lit.var() == lit.var() && !lit.is_constant())
    }

    /// Attach a latch that stores the output, with a fresh literal
    /// `(maxvar + 1) * 2`. Returns its literal.
    pub fn push_error_latch(&mut self) -> Result<Lit> {
        if let Some(latch) = &self.error_latch {
            return Ok(latch.lit);
        }
        if self.outputs.len() != 1 {
            return Err(AigerError::OutputCount(self.outputs.len()));
        }
        let lit = Lit::positive(self.maxvar + 1);
        self.maxvar += 1;
        self.error_latch = Some(Latch {
            lit,
            next: self.outputs[0].lit,
            name: Some(ERROR_LATCH_NAME.to_string()),
        });
        self.invalidate();
        debug!(%lit, "error latch attached");
        Ok(lit)
    }

    /// Detach the error latch and give back its variable index.
    pub fn pop_error_latch(&mut self) -> Option<Latch> {
        let latch = self.error_latch.take()?;
        if self.maxvar == latch.lit.var() {
            self.maxvar -= 1;
        }
        self.invalidate();
        Some(latch)
    }

    // ------------------------------------------------------------------
    // Gate construction
    // ------------------------------------------------------------------

    /// Conjunction of `a` and `b`, folding constants; otherwise a fresh
    /// gate with literal `(maxvar + 1) * 2`.
    pub fn optimized_gate(&mut self, a: Lit, b: Lit) -> Lit {
        if a == Lit::FALSE || b == Lit::FALSE {
            return Lit::FALSE;
        }
        if a == Lit::TRUE && b == Lit::TRUE {
            return Lit::TRUE;
        }
        if a == Lit::TRUE {
            return b;
        }
        if b == Lit::TRUE {
            return a;
        }
        let lhs = Lit::positive(self.maxvar + 1);
        self.maxvar += 1;
        self.nodes.insert(lhs.var(), Node::And(self.gates.len()));
        self.gates.push(AndGate { lhs, rhs0: a, rhs1: b });
        lhs
    }

    /// Rebuild the cone of `lit` from `other` inside this circuit.
    ///
    /// Gates are copied through [`optimized_gate`](Self::optimized_gate);
    /// inputs and latches of `other` must exist here under the same literal.
    pub fn copy_gate_from(&mut self, other: &Circuit, lit: Lit) -> Result<Lit> {
        let mut cache = FxHashMap::default();
        let result = self.copy_gate_rec(other, lit, &mut cache)?;
        debug!(%lit, %result, "copied gate cone");
        Ok(result)
    }

    fn copy_gate_rec(
        &mut self,
        other: &Circuit,
        lit: Lit,
        cache: &mut FxHashMap<(Lit, Lit), Lit>,
    ) -> Result<Lit> {
        let stripped = lit.strip();
        let result = if stripped.is_constant() {
            Lit::FALSE
        } else if let Some(&gate) = other.gate(stripped) {
            match cache.get(&(gate.rhs0, gate.rhs1)) {
                Some(&hit) => hit,
                None => {
                    let a = self.copy_gate_rec(other, gate.rhs0, cache)?;
                    let b = self.copy_gate_rec(other, gate.rhs1, cache)?;
                    let copied = self.optimized_gate(a, b);
                    cache.insert((gate.rhs0, gate.rhs1), copied);
                    copied
                }
            }
        } else if (other.input(stripped).is_some() || other.latch(stripped).is_some())
            && (self.input(stripped).is_some() || self.latch(stripped).is_some())
        {
            stripped
        } else {
            return Err(AigerError::UnknownLiteral(stripped.raw()));
        };
        Ok(result.with_sign(lit.is_negated()))
    }

    /// Redefine `input` as the gate `lit ∧ lit`.
    pub fn input2gate(&mut self, input: Lit, lit: Lit) -> Result<()> {
        let Some(&Node::Input(index)) = self.nodes.get(&input.var()) else {
            return Err(AigerError::NotAnInput(input.raw()));
        };
        if input.is_negated() {
            return Err(AigerError::NotAnInput(input.raw()));
        }
        self.inputs.remove(index);
        for node in self.nodes.values_mut() {
            if let Node::Input(i) = node
                && *i > index
            {
                *i -= 1;
            }
        }
        self.nodes.insert(input.var(), Node::And(self.gates.len()));
        self.gates.push(AndGate {
            lhs: input,
            rhs0: lit,
            rhs1: lit,
        });
        self.maxvar = self.maxvar.max(lit.var());
        self.invalidate();
        debug!(%input, %lit, "input redefined as gate");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Analysis
    // ------------------------------------------------------------------

    /// Base literals that `lit` depends on within one step.
    ///
    /// Gates are traversed into their operands and latches into their next
    /// functions, so the result contains every input and latch that can
    /// influence `lit` now or through the latches it reads. The error latch
    /// is a leaf.
    pub fn lit_deps(&self, lit: Lit) -> Rc<LitSet> {
        if let Some(hit) = self.deps_cache.borrow().get(&lit) {
            return Rc::clone(hit);
        }
        let mut deps = LitSet::new();
        let mut pending = vec![lit];
        while let Some(current) = pending.pop() {
            for &leaf in self.gate_support(current).iter() {
                if !deps.insert(leaf) {
                    continue;
                }
                if let Some(latch) = self.latch(leaf) {
                    pending.push(latch.next);
                }
            }
        }
        let deps = Rc::new(deps);
        self.deps_cache.borrow_mut().insert(lit, Rc::clone(&deps));
        deps
    }

    /// Inputs and latches read by the gates under `lit`, without looking
    /// through latches.
    ///
    /// Computed bottom-up over the cone; every gate visited keeps its own
    /// support, so later queries sharing part of the cone stop there.
    fn gate_support(&self, lit: Lit) -> Rc<LitSet> {
        let root = lit.strip();
        if let Some(hit) = self.support_cache.borrow().get(&root) {
            return Rc::clone(hit);
        }
        let mut open: FxHashSet<Lit> = FxHashSet::default();
        let mut stack = vec![root];
        while let Some(&current) = stack.last() {
            if self.support_cache.borrow().contains_key(&current) {
                stack.pop();
                continue;
            }
            let Some(&gate) = self.gate(current) else {
                let leaf = if current.is_constant() {
                    LitSet::new()
                } else {
                    LitSet::from([current])
                };
                self.support_cache.borrow_mut().insert(current, Rc::new(leaf));
                stack.pop();
                continue;
            };
            let operands = [gate.rhs0.strip(), gate.rhs1.strip()];
            if open.insert(current) {
                let cache = self.support_cache.borrow();
                // Operands already open close a cycle and contribute nothing.
                stack.extend(
                    operands
                        .into_iter()
                        .filter(|op| !cache.contains_key(op) && !open.contains(op)),
                );
                continue;
            }
            let support = {
                let cache = self.support_cache.borrow();
                let mut support = LitSet::new();
                for op in operands {
                    if let Some(part) = cache.get(&op) {
                        support.extend(part.iter().copied());
                    }
                }
                support
            };
            self.support_cache.borrow_mut().insert(current, Rc::new(support));
            stack.pop();
        }
        self.support_cache.borrow().get(&root).cloned().unwrap_or_default()
    }

    /// Flatten the positive AND gate `lit` into a wide conjunction.
    ///
    /// Positive AND operands are expanded recursively; every other operand
    /// is a conjunct, and negated AND operands are additionally reported in
    /// [`Conjuncts::negated_ands`]. Returns `None` unless `lit` is a
    /// positive AND gate.
    pub fn n_input_and(&self, lit: Lit) -> Option<Rc<Conjuncts>> {
        if lit.is_negated() {
            return None;
        }
        self.gate(lit)?;
        if let Some(hit) = self.conjuncts_cache.borrow().get(&lit) {
            return Some(Rc::clone(hit));
        }
        let mut result = Conjuncts::default();
        let mut waiting: SmallVec<[Lit; 16]> = smallvec![lit];
        while let Some(current) = waiting.pop() {
            let Some(&gate) = self.gate(current) else {
                continue;
            };
            for operand in [gate.rhs0, gate.rhs1] {
                if self.gate(operand).is_none() {
                    result.operands.push(operand);
                } else if operand.is_negated() {
                    result.operands.push(operand);
                    result.negated_ands.push(operand.strip());
                } else {
                    waiting.push(operand);
                }
            }
        }
        let result = Rc::new(result);
        self.conjuncts_cache
            .borrow_mut()
            .insert(lit, Rc::clone(&result));
        Some(result)
    }

    /// Evaluate `lit` combinationally. `assignment` gives the value of every
    /// base (non-gate) positive literal reached.
    pub fn eval(&self, lit: Lit, assignment: impl Fn(Lit) -> bool) -> bool {
        let mut values: FxHashMap<Var, bool> = FxHashMap::default();
        let value = |values: &FxHashMap<Var, bool>, l: Lit| -> bool {
            let base = if l.is_constant() {
                false
            } else {
                values.get(&l.var()).copied().unwrap_or(false)
            };
            base ^ l.is_negated()
        };
        let mut stack = vec![lit.strip()];
        while let Some(&top) = stack.last() {
            if top.is_constant() || values.contains_key(&top.var()) {
                stack.pop();
                continue;
            }
            match self.gate(top) {
                Some(&gate) => {
                    let pending: SmallVec<[Lit; 2]> = [gate.rhs0.strip(), gate.rhs1.strip()]
                        .into_iter()
                        .filter(|c| !c.is_constant() && !values.contains_key(&c.var()))
                        .collect();
                    if pending.is_empty() {
                        let v = value(&values, gate.rhs0) && value(&values, gate.rhs1);
                        values.insert(top.var(), v);
                        stack.pop();
                    } else {
                        stack.extend(pending);
                    }
                }
                None => {
                    values.insert(top.var(), assignment(top));
                    stack.pop();
                }
            }
        }
        value(&values, lit)
    }
}
