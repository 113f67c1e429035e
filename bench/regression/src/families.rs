//! Parameterized safety specifications
//!
//! Every family scales with one size parameter and has a known verdict, so
//! the benchmarks double as a sanity check of the solvers.

use swiss_aig::{Circuit, Lit, Result};

/// Circuit under construction with a running variable counter
struct Builder {
    circuit: Circuit,
    last: u32,
}

impl Builder {
    fn new() -> Self {
        Self {
            circuit: Circuit::new(),
            last: 0,
        }
    }

    fn fresh(&mut self) -> Lit {
        self.last += 1;
        Lit::positive(self.last)
    }

    fn input(&mut self, name: String) -> Result<Lit> {
        let lit = self.fresh();
        self.circuit.add_input(lit, Some(name))?;
        Ok(lit)
    }

    fn and(&mut self, a: Lit, b: Lit) -> Result<Lit> {
        let lhs = self.fresh();
        self.circuit.add_and(lhs, a, b)?;
        Ok(lhs)
    }

    fn or(&mut self, a: Lit, b: Lit) -> Result<Lit> {
        Ok(!self.and(!a, !b)?)
    }

    fn xor(&mut self, a: Lit, b: Lit) -> Result<Lit> {
        let left = self.and(a, !b)?;
        let right = self.and(!a, b)?;
        self.or(left, right)
    }

    fn finish(mut self, latches: Vec<(Lit, Lit)>, output: Lit) -> Result<Circuit> {
        for (lit, next) in latches {
            self.circuit.add_latch(lit, next, None)?;
        }
        self.circuit.add_output(output, Some("err".to_string()));
        Ok(self.circuit)
    }
}

/// Shift register of `length` latches fed by the environment, masked by a
/// guard latch the controller sets: `err = last ∧ ¬guard`. Realizable.
pub fn delay_chain(length: usize) -> Result<Circuit> {
    let mut b = Builder::new();
    let c = b.input("controllable_guard".to_string())?;
    let u = b.input("env_data".to_string())?;
    let guard = b.fresh();
    let stages: Vec<Lit> = (0..length.max(1)).map(|_| b.fresh()).collect();
    let mut latches = vec![(guard, c)];
    let mut feed = u;
    for &stage in &stages {
        latches.push((stage, feed));
        feed = stage;
    }
    let err = b.and(feed, !guard)?;
    b.finish(latches, err)
}

/// `k` latches `l_i' = c_i ∧ u_i` with `err = ∨ l_i`: independent
/// sub-games with disjoint control. Realizable.
pub fn parallel_guards(k: usize) -> Result<Circuit> {
    let mut b = Builder::new();
    let mut pairs = Vec::new();
    for i in 0..k.max(1) {
        let c = b.input(format!("controllable_{i}"))?;
        let u = b.input(format!("env_{i}"))?;
        pairs.push((c, u));
    }
    let lits: Vec<Lit> = pairs.iter().map(|_| b.fresh()).collect();
    let mut latches = Vec::new();
    let mut err = Lit::FALSE;
    for (&(c, u), &lit) in pairs.iter().zip(&lits) {
        latches.push((lit, b.and(c, u)?));
        err = b.or(err, lit)?;
    }
    b.finish(latches, err)
}

/// `k` latches `l_i' = c ∧ u_i` sharing one controllable input, with
/// `err = ∨ l_i`. Realizable, but the sub-games share control.
pub fn shared_guards(k: usize) -> Result<Circuit> {
    let mut b = Builder::new();
    let c = b.input("controllable_shared".to_string())?;
    let envs: Vec<Lit> = (0..k.max(1))
        .map(|i| b.input(format!("env_{i}")))
        .collect::<Result<_>>()?;
    let lits: Vec<Lit> = envs.iter().map(|_| b.fresh()).collect();
    let mut latches = Vec::new();
    let mut err = Lit::FALSE;
    for (&u, &lit) in envs.iter().zip(&lits) {
        latches.push((lit, b.and(c, u)?));
        err = b.or(err, lit)?;
    }
    b.finish(latches, err)
}

/// Binary counter of `bits` latches incremented by the environment, with
/// `err` when every bit is set. With `resettable` the controller may clear
/// it each step (realizable); otherwise the environment counts up to the
/// error in `2^bits - 1` steps (unrealizable).
pub fn counter(bits: usize, resettable: bool) -> Result<Circuit> {
    let mut b = Builder::new();
    let reset = if resettable {
        b.input("controllable_reset".to_string())?
    } else {
        Lit::FALSE
    };
    let tick = b.input("env_tick".to_string())?;
    let state: Vec<Lit> = (0..bits.max(1)).map(|_| b.fresh()).collect();
    let mut latches = Vec::new();
    let mut carry = tick;
    let mut full = Lit::TRUE;
    for &bit in &state {
        let sum = b.xor(bit, carry)?;
        let next = b.and(sum, !reset)?;
        latches.push((bit, next));
        carry = b.and(bit, carry)?;
        full = b.and(full, bit)?;
    }
    b.finish(latches, full)
}
