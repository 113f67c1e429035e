//! Winning-region and inductive-certificate circuits.
//!
//! Both take a winning region over the latches of the original circuit
//! (error latch already cofactored away).

use rustc_hash::FxHashMap;
use swiss_aig::{Circuit, Lit};
use swiss_bdd::{Bdd, Manager};
use tracing::info;

use crate::error::Result;
use crate::strategy::AigCompiler;

/// Combinational circuit whose inputs are the latches of `circuit` and
/// whose single output is `region`.
pub fn winning_region_circuit(mgr: &Manager, circuit: &Circuit, region: Bdd) -> Result<Circuit> {
    let mut out = Circuit::new();
    for latch in circuit.latches() {
        out.add_input(latch.lit, latch.name.clone())?;
    }
    let leaves = circuit.latches().iter().map(|l| (l.lit.raw(), l.lit)).collect();
    let lit = AigCompiler::new(mgr, leaves).compile(&mut out, region)?;
    out.add_output(lit, Some("winning_region".to_string()));
    info!(gates = out.gates().len(), "winning region circuit built");
    Ok(out)
}

/// Combinational circuit over the latches and remaining inputs of the
/// synthesized `circuit` whose output is `W ∧ ¬(¬bad ∧ W')`.
///
/// `W` is `region`, `bad` the circuit's output and `W'` the region after
/// one step of the synthesized circuit. The region is inductive, safe and
/// initial exactly when the output is unsatisfiable; a region missing the
/// initial state yields the constant true output.
pub fn inductive_certificate(mgr: &Manager, circuit: &Circuit, region: Bdd) -> Result<Circuit> {
    let mut out = Circuit::new();
    for latch in circuit.latches() {
        out.add_input(latch.lit, latch.name.clone())?;
    }
    for input in circuit.inputs() {
        out.add_input(input.lit, input.name.clone())?;
    }
    let holds_initially = mgr.eval(region, |_| false);
    let lit = if holds_initially {
        let now: FxHashMap<u32, Lit> =
            circuit.latches().iter().map(|l| (l.lit.raw(), l.lit)).collect();
        let region_now = AigCompiler::new(mgr, now).compile(&mut out, region)?;
        let mut next = FxHashMap::default();
        for latch in circuit.latches() {
            next.insert(latch.lit.raw(), out.copy_gate_from(circuit, latch.next)?);
        }
        let region_next = AigCompiler::new(mgr, next).compile(&mut out, region)?;
        let bad = match circuit.output() {
            Some(output) => out.copy_gate_from(circuit, output)?,
            None => Lit::FALSE,
        };
        let safe_step = out.optimized_gate(!bad, region_next);
        out.optimized_gate(region_now, !safe_step)
    } else {
        Lit::TRUE
    };
    out.add_output(lit, Some("inductive_certificate".to_string()));
    info!(
        gates = out.gates().len(),
        holds_initially, "inductive certificate built"
    );
    Ok(out)
}
