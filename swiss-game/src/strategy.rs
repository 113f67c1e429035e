//! Controller extraction and compilation back into the circuit.

use rustc_hash::{FxHashMap, FxHashSet};
use swiss_aig::{Circuit, Lit};
use swiss_bdd::{Bdd, Manager};
use tracing::{debug, info};

use crate::error::{Result, SynthError};
use crate::game::{Game, safe_restrict};
use crate::verdict::Controller;

/// Determinize the strategy `non_det` (a relation over states, inputs and
/// controllable inputs) into one function per controllable input.
///
/// Inputs are resolved in order; each choice is conjoined into the relation
/// before the next input is resolved. Functions only need to be right on
/// `care`.
pub fn extract(game: &Game<'_>, non_det: Bdd, care: Bdd) -> Controller {
    let mgr = game.manager();
    let cinputs = game.cinputs();
    let mut strategy = non_det;
    let mut controller = Controller::with_capacity(cinputs.len());
    for (k, &c) in cinputs.iter().enumerate() {
        let others = mgr.cube(
            cinputs
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != k)
                .map(|(_, l)| l.raw()),
        );
        let arena = mgr.exists(strategy, others);
        let can_be_true = mgr.cofactor_var(arena, c.raw(), true);
        let can_be_false = mgr.cofactor_var(arena, c.raw(), false);
        let must_be_true = mgr.and(!can_be_false, can_be_true);
        let must_be_false = mgr.and(!can_be_true, can_be_false);
        let local_care = mgr.and(care, mgr.or(must_be_true, must_be_false));
        let raise = safe_restrict(mgr, must_be_true, local_care);
        let keep = safe_restrict(mgr, !must_be_false, local_care);
        let choice = if mgr.node_count(raise) < mgr.node_count(keep) {
            raise
        } else {
            keep
        };
        strategy = mgr.and(strategy, mgr.iff(game.var(c), choice));
        debug!(%c, nodes = mgr.node_count(choice), "controllable input resolved");
        controller.push((c, choice));
    }
    controller
}

/// Compiles diagrams into AND gates of a circuit.
///
/// Each decision node becomes three gates,
/// `ite(v, t, e) = ¬(¬(v ∧ t) ∧ ¬(¬v ∧ e))`, and is compiled once per
/// compiler: results are memoized by regular node, and complement edges map
/// to negated literals.
#[derive(Debug)]
pub struct AigCompiler<'m> {
    mgr: &'m Manager,
    leaves: FxHashMap<u32, Lit>,
    cache: FxHashMap<Bdd, Lit>,
}

impl<'m> AigCompiler<'m> {
    /// A compiler that reads variable `v` through `leaves[v]`.
    #[must_use]
    pub fn new(mgr: &'m Manager, leaves: FxHashMap<u32, Lit>) -> Self {
        Self {
            mgr,
            leaves,
            cache: FxHashMap::default(),
        }
    }

    /// A compiler reading every input and latch of `circuit` as itself.
    #[must_use]
    pub fn identity(mgr: &'m Manager, circuit: &Circuit) -> Self {
        let leaves = circuit
            .inputs()
            .iter()
            .map(|i| i.lit)
            .chain(circuit.latches().iter().map(|l| l.lit))
            .map(|lit| (lit.raw(), lit))
            .collect();
        Self::new(mgr, leaves)
    }

    /// Literal of `circuit` computing `f`.
    pub fn compile(&mut self, circuit: &mut Circuit, f: Bdd) -> Result<Lit> {
        let Some((var, low, high)) = self.mgr.decompose(f.regular()) else {
            return Ok(Lit::from(f.is_true()));
        };
        let negated = f.is_complemented();
        if let Some(&hit) = self.cache.get(&f.regular()) {
            return Ok(hit.with_sign(negated));
        }
        let v = *self
            .leaves
            .get(&var)
            .ok_or(SynthError::UnknownVariable(var))?;
        let t = self.compile(circuit, high)?;
        let e = self.compile(circuit, low)?;
        let then_part = circuit.optimized_gate(v, t);
        let else_part = circuit.optimized_gate(!v, e);
        let result = !circuit.optimized_gate(!then_part, !else_part);
        self.cache.insert(f.regular(), result);
        Ok(result.with_sign(negated))
    }
}

/// Redefine every controllable input of `circuit` by its controller
/// function; inputs without one are tied to false.
///
/// The error latch must already be detached.
pub fn finalize(circuit: &mut Circuit, mgr: &Manager, controller: &Controller) -> Result<()> {
    let mut compiler = AigCompiler::identity(mgr, circuit);
    let mut assigned = FxHashSet::default();
    for &(c, f) in controller {
        let lit = compiler.compile(circuit, f)?;
        circuit.input2gate(c, lit)?;
        assigned.insert(c);
    }
    let unassigned: Vec<Lit> = circuit
        .controllable_inputs()
        .map(|i| i.lit)
        .filter(|lit| !assigned.contains(lit))
        .collect();
    for &c in &unassigned {
        circuit.input2gate(c, Lit::FALSE)?;
    }
    info!(
        functions = controller.len(),
        pinned = unassigned.len(),
        gates = circuit.gates().len(),
        "controller compiled"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circuit_with_inputs(n: u32) -> Circuit {
        let mut c = Circuit::new();
        for v in 1..=n {
            c.add_input(Lit::positive(v), None).unwrap();
        }
        c
    }

    fn check_exhaustive(mgr: &Manager, circuit: &mut Circuit, f: Bdd, n: u32) {
        let mut compiler = AigCompiler::identity(mgr, circuit);
        let lit = compiler.compile(circuit, f).unwrap();
        for mask in 0u32..(1 << n) {
            let value = |v: u32| mask & (1 << (v / 2 - 1)) != 0;
            let expected = mgr.eval(f, value);
            let actual = circuit.eval(lit, |l| value(l.raw()));
            assert_eq!(expected, actual, "mask {mask:b}");
        }
    }

    #[test]
    fn test_compile_constants() {
        let mgr = Manager::new(4);
        let mut circuit = circuit_with_inputs(1);
        let mut compiler = AigCompiler::identity(&mgr, &circuit);
        assert_eq!(compiler.compile(&mut circuit, Bdd::TRUE).unwrap(), Lit::TRUE);
        assert_eq!(compiler.compile(&mut circuit, Bdd::FALSE).unwrap(), Lit::FALSE);
        assert!(circuit.gates().is_empty());
    }

    #[test]
    fn test_compile_round_trip() {
        let mgr = Manager::new(8);
        let mut circuit = circuit_with_inputs(3);
        let (a, b, c) = (mgr.var(2), mgr.var(4), mgr.var(6));
        let f = mgr.or(mgr.and(a, !b), mgr.xor(b, c));
        check_exhaustive(&mgr, &mut circuit, f, 3);
        check_exhaustive(&mgr, &mut circuit, !f, 3);
        check_exhaustive(&mgr, &mut circuit, mgr.ite(a, b, c), 3);
    }

    #[test]
    fn test_compile_shares_nodes() {
        let mgr = Manager::new(8);
        let mut circuit = circuit_with_inputs(3);
        let f = mgr.xor(mgr.var(2), mgr.var(4));
        let mut compiler = AigCompiler::identity(&mgr, &circuit);
        let lit = compiler.compile(&mut circuit, f).unwrap();
        let gates = circuit.gates().len();
        let negated = compiler.compile(&mut circuit, !f).unwrap();
        assert_eq!(negated, !lit);
        assert_eq!(circuit.gates().len(), gates);
    }

    #[test]
    fn test_unknown_variable() {
        let mgr = Manager::new(8);
        let mut circuit = circuit_with_inputs(1);
        let mut compiler = AigCompiler::identity(&mgr, &circuit);
        let result = compiler.compile(&mut circuit, mgr.var(6));
        assert!(matches!(result, Err(SynthError::UnknownVariable(6))));
    }

    #[test]
    fn test_finalize_pins_unassigned_inputs() {
        let mgr = Manager::new(8);
        let mut circuit = Circuit::new();
        circuit.add_input(Lit::positive(1), Some("controllable_a".into())).unwrap();
        circuit.add_input(Lit::positive(2), Some("controllable_b".into())).unwrap();
        circuit.add_input(Lit::positive(3), Some("env".into())).unwrap();
        circuit.add_output(Lit::positive(1), None);
        let controller = vec![(Lit::positive(1), !mgr.var(6))];
        finalize(&mut circuit, &mgr, &controller).unwrap();
        assert_eq!(circuit.inputs().len(), 1);
        assert!(circuit.gate(Lit::positive(1)).is_some());
        let b = circuit.gate(Lit::positive(2)).unwrap();
        assert_eq!(b.rhs0, Lit::FALSE);
        assert!(circuit.eval(Lit::positive(1), |_| false));
        assert!(!circuit.eval(Lit::positive(1), |_| true));
    }
}
