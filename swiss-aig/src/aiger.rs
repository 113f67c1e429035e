//! AIGER reader and writer.
//!
//! Both the ASCII (`aag`) and binary (`aig`) formats are supported, with
//! symbol tables and comments. Only the combinational/latch core of AIGER
//! 1.9 is accepted: bad-state, constraint, justice and fairness sections are
//! rejected, and latches must reset to zero.

use std::fmt::Write as _;
use std::path::Path;

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::circuit::Circuit;
use crate::error::{AigerError, Result};
use crate::literal::{Lit, Var};

/// On-disk AIGER flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `aag` text format
    Ascii,
    /// `aig` binary format
    Binary,
}

impl Format {
    /// Pick the format from a file extension: `.aig` is binary, anything
    /// else ASCII.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("aig") => Format::Binary,
            _ => Format::Ascii,
        }
    }
}

struct Header {
    format: Format,
    maxvar: u32,
    inputs: u32,
    latches: u32,
    outputs: u32,
    ands: u32,
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            line: 0,
        }
    }

    fn malformed(&self, message: impl Into<String>) -> AigerError {
        AigerError::Malformed {
            line: self.line,
            message: message.into(),
        }
    }

    fn next_line(&mut self) -> Result<Option<&'a str>> {
        if self.pos >= self.bytes.len() {
            return Ok(None);
        }
        let rest = &self.bytes[self.pos..];
        let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
        self.pos += (end + 1).min(rest.len());
        self.line += 1;
        let text = std::str::from_utf8(&rest[..end])
            .map_err(|_| self.malformed("line is not valid UTF-8"))?;
        Ok(Some(text.trim_end_matches('\r')))
    }

    fn expect_line(&mut self, what: &'static str) -> Result<&'a str> {
        self.next_line()?.ok_or(AigerError::UnexpectedEof(what))
    }

    fn numbers(&self, line: &str, min: usize, max: usize) -> Result<Vec<u32>> {
        let values = line
            .split_ascii_whitespace()
            .map(|t| t.parse::<u32>().map_err(|_| self.malformed(format!("bad number `{t}`"))))
            .collect::<Result<Vec<u32>>>()?;
        if values.len() < min || values.len() > max {
            return Err(self.malformed(format!(
                "expected {min} to {max} numbers, found {}",
                values.len()
            )));
        }
        Ok(values)
    }

    fn leb128(&mut self) -> Result<u32> {
        let mut value: u32 = 0;
        let mut shift = 0;
        loop {
            let byte = *self
                .bytes
                .get(self.pos)
                .ok_or(AigerError::UnexpectedEof("binary AND gates"))?;
            self.pos += 1;
            if shift > 28 {
                return Err(self.malformed("binary delta overflows 32 bits"));
            }
            value |= u32::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }
}

fn parse_header(reader: &mut Reader<'_>) -> Result<Header> {
    let line = reader
        .next_line()?
        .ok_or_else(|| AigerError::InvalidHeader("empty file".into()))?;
    let mut tokens = line.split_ascii_whitespace();
    let format = match tokens.next() {
        Some("aag") => Format::Ascii,
        Some("aig") => Format::Binary,
        other => {
            return Err(AigerError::InvalidHeader(format!(
                "unknown format tag {other:?}"
            )));
        }
    };
    let values = tokens
        .map(|t| {
            t.parse::<u32>()
                .map_err(|_| AigerError::InvalidHeader(format!("bad number `{t}`")))
        })
        .collect::<Result<Vec<u32>>>()?;
    if values.len() < 5 || values.len() > 9 {
        return Err(AigerError::InvalidHeader(format!(
            "expected 5 to 9 numbers, found {}",
            values.len()
        )));
    }
    for (count, section) in values[5..].iter().zip(["bad", "constraint", "justice", "fairness"]) {
        if *count != 0 {
            return Err(AigerError::UnsupportedSection(section.to_string()));
        }
    }
    Ok(Header {
        format,
        maxvar: values[0],
        inputs: values[1],
        latches: values[2],
        outputs: values[3],
        ands: values[4],
    })
}

fn checked(lit: u32, maxvar: u32) -> Result<Lit> {
    let lit = Lit::from_raw(lit);
    if lit.var() > maxvar {
        return Err(AigerError::LiteralOutOfRange {
            lit: lit.raw(),
            maxvar,
        });
    }
    Ok(lit)
}

fn check_reset(lit: Lit, values: &[u32]) -> Result<()> {
    match values.get(2) {
        Some(&reset) if reset != 0 => Err(AigerError::NonZeroReset(lit.raw())),
        _ => Ok(()),
    }
}

/// Parse an AIGER file held in memory. The format is taken from the header.
pub fn parse(bytes: &[u8]) -> Result<Circuit> {
    let mut reader = Reader::new(bytes);
    let header = parse_header(&mut reader)?;
    let mut circuit = Circuit::new();
    circuit.reserve_maxvar(header.maxvar);
    match header.format {
        Format::Ascii => parse_ascii_body(&mut reader, &header, &mut circuit)?,
        Format::Binary => parse_binary_body(&mut reader, &header, &mut circuit)?,
    }
    check_definitions(&circuit)?;
    parse_symbols(&mut reader, &mut circuit)?;
    debug!(
        inputs = circuit.inputs().len(),
        latches = circuit.latches().len(),
        gates = circuit.gates().len(),
        "parsed AIGER circuit"
    );
    Ok(circuit)
}

/// Every literal the circuit reads must be defined, and the gates must
/// form a DAG.
fn check_definitions(circuit: &Circuit) -> Result<()> {
    let read = circuit
        .latches()
        .iter()
        .map(|l| l.next)
        .chain(circuit.outputs().iter().map(|o| o.lit));
    for lit in read {
        if !circuit.is_defined(lit) {
            return Err(AigerError::UnknownLiteral(lit.raw()));
        }
    }
    circuit.topological_gates().map(|_| ())
}

fn parse_ascii_body(reader: &mut Reader<'_>, header: &Header, circuit: &mut Circuit) -> Result<()> {
    let m = header.maxvar;
    for _ in 0..header.inputs {
        let line = reader.expect_line("inputs")?;
        let values = reader.numbers(line, 1, 1)?;
        circuit.add_input(checked(values[0], m)?, None)?;
    }
    for _ in 0..header.latches {
        let line = reader.expect_line("latches")?;
        let values = reader.numbers(line, 2, 3)?;
        let lit = checked(values[0], m)?;
        check_reset(lit, &values)?;
        circuit.add_latch(lit, checked(values[1], m)?, None)?;
    }
    for _ in 0..header.outputs {
        let line = reader.expect_line("outputs")?;
        let values = reader.numbers(line, 1, 1)?;
        circuit.add_output(checked(values[0], m)?, None);
    }
    for _ in 0..header.ands {
        let line = reader.expect_line("AND gates")?;
        let values = reader.numbers(line, 3, 3)?;
        circuit.add_and(
            checked(values[0], m)?,
            checked(values[1], m)?,
            checked(values[2], m)?,
        )?;
    }
    Ok(())
}

fn parse_binary_body(reader: &mut Reader<'_>, header: &Header, circuit: &mut Circuit) -> Result<()> {
    let m = header.maxvar;
    let (i, l, a) = (header.inputs, header.latches, header.ands);
    if u64::from(i) + u64::from(l) + u64::from(a) > u64::from(m) {
        return Err(AigerError::InvalidHeader(format!(
            "M = {m} is smaller than I + L + A"
        )));
    }
    for k in 0..i {
        circuit.add_input(Lit::positive(k + 1), None)?;
    }
    for k in 0..l {
        let lit = Lit::positive(i + k + 1);
        let line = reader.expect_line("latches")?;
        let values = reader.numbers(line, 1, 2)?;
        if values.get(1).is_some_and(|&reset| reset != 0) {
            return Err(AigerError::NonZeroReset(lit.raw()));
        }
        circuit.add_latch(lit, checked(values[0], m)?, None)?;
    }
    for _ in 0..header.outputs {
        let line = reader.expect_line("outputs")?;
        let values = reader.numbers(line, 1, 1)?;
        circuit.add_output(checked(values[0], m)?, None);
    }
    for k in 0..a {
        let lhs = Lit::positive(i + l + k + 1).raw();
        let delta0 = reader.leb128()?;
        let delta1 = reader.leb128()?;
        let rhs0 = lhs
            .checked_sub(delta0)
            .filter(|_| delta0 > 0)
            .ok_or_else(|| reader.malformed(format!("bad delta for gate {lhs}")))?;
        let rhs1 = rhs0
            .checked_sub(delta1)
            .ok_or_else(|| reader.malformed(format!("bad delta for gate {lhs}")))?;
        circuit.add_and(Lit::from_raw(lhs), Lit::from_raw(rhs0), Lit::from_raw(rhs1))?;
    }
    Ok(())
}

fn parse_symbols(reader: &mut Reader<'_>, circuit: &mut Circuit) -> Result<()> {
    while let Some(line) = reader.next_line()? {
        if line.is_empty() {
            continue;
        }
        if line == "c" {
            while let Some(comment) = reader.next_line()? {
                circuit.add_comment(comment);
            }
            break;
        }
        let mut chars = line.chars();
        let kind = chars.next().unwrap_or(' ');
        let (index, name) = chars
            .as_str()
            .split_once(' ')
            .ok_or_else(|| reader.malformed("symbol without a name"))?;
        let index: usize = index
            .parse()
            .map_err(|_| reader.malformed(format!("bad symbol index `{index}`")))?;
        let name = name.to_string();
        let found = match kind {
            'i' => circuit.set_input_name(index, name),
            'l' => circuit.set_latch_name(index, name),
            'o' => circuit.set_output_name(index, name),
            'b' | 'c' | 'j' | 'f' => {
                return Err(AigerError::UnsupportedSection(format!("{kind} symbol")));
            }
            _ => return Err(reader.malformed(format!("unknown symbol kind `{kind}`"))),
        };
        if !found {
            return Err(reader.malformed(format!("symbol index {index} out of range")));
        }
    }
    Ok(())
}

impl Circuit {
    /// Load a synthesis specification: any AIGER file with exactly one
    /// output.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let circuit = Self::from_bytes(&bytes)?;
        info!(
            path = %path.display(),
            inputs = circuit.inputs().len(),
            controllable = circuit.controllable_inputs().count(),
            latches = circuit.latches().len(),
            gates = circuit.gates().len(),
            "loaded specification"
        );
        Ok(circuit)
    }

    /// Parse a synthesis specification held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let circuit = parse(bytes)?;
        if circuit.outputs().len() != 1 {
            return Err(AigerError::OutputCount(circuit.outputs().len()));
        }
        Ok(circuit)
    }

    /// Write the circuit, choosing the format from the file extension.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = match Format::from_path(path) {
            Format::Ascii => self.to_ascii()?.into_bytes(),
            Format::Binary => self.to_binary()?,
        };
        std::fs::write(path, bytes)?;
        debug!(path = %path.display(), "wrote circuit");
        Ok(())
    }

    fn check_writable(&self) -> Result<()> {
        if self.error_latch().is_some() {
            return Err(AigerError::ErrorLatchAttached);
        }
        Ok(())
    }

    fn write_symbols(&self, out: &mut String) {
        for (k, input) in self.inputs().iter().enumerate() {
            if let Some(name) = &input.name {
                let _ = writeln!(out, "i{k} {name}");
            }
        }
        for (k, latch) in self.latches().iter().enumerate() {
            if let Some(name) = &latch.name {
                let _ = writeln!(out, "l{k} {name}");
            }
        }
        for (k, output) in self.outputs().iter().enumerate() {
            if let Some(name) = &output.name {
                let _ = writeln!(out, "o{k} {name}");
            }
        }
        if !self.comments().is_empty() {
            out.push_str("c\n");
            for line in self.comments() {
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    /// Render in the ASCII format, keeping the literal numbering.
    pub fn to_ascii(&self) -> Result<String> {
        self.check_writable()?;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "aag {} {} {} {} {}",
            self.maxvar(),
            self.inputs().len(),
            self.latches().len(),
            self.outputs().len(),
            self.gates().len()
        );
        for input in self.inputs() {
            let _ = writeln!(out, "{}", input.lit);
        }
        for latch in self.latches() {
            let _ = writeln!(out, "{} {}", latch.lit, latch.next);
        }
        for output in self.outputs() {
            let _ = writeln!(out, "{}", output.lit);
        }
        for gate in self.gates() {
            let _ = writeln!(out, "{} {} {}", gate.lhs, gate.rhs0, gate.rhs1);
        }
        self.write_symbols(&mut out);
        Ok(out)
    }

    /// Render in the binary format.
    ///
    /// The circuit is renumbered the way binary AIGER requires: inputs
    /// first, then latches, then gates in topological order.
    pub fn to_binary(&self) -> Result<Vec<u8>> {
        self.check_writable()?;
        let num_inputs = self.inputs().len() as u32;
        let num_latches = self.latches().len() as u32;
        let order = self.topological_gates()?;

        let mut renumber: FxHashMap<Var, Var> = FxHashMap::default();
        for (k, input) in self.inputs().iter().enumerate() {
            renumber.insert(input.lit.var(), k as u32 + 1);
        }
        for (k, latch) in self.latches().iter().enumerate() {
            renumber.insert(latch.lit.var(), num_inputs + k as u32 + 1);
        }
        for (k, &gate) in order.iter().enumerate() {
            renumber.insert(
                self.gates()[gate].lhs.var(),
                num_inputs + num_latches + k as u32 + 1,
            );
        }
        let map = |lit: Lit| -> Result<Lit> {
            if lit.is_constant() {
                return Ok(lit);
            }
            renumber
                .get(&lit.var())
                .map(|&v| Lit::positive(v).with_sign(lit.is_negated()))
                .ok_or(AigerError::UnknownLiteral(lit.raw()))
        };

        let mut text = String::new();
        let _ = writeln!(
            text,
            "aig {} {} {} {} {}",
            num_inputs + num_latches + order.len() as u32,
            num_inputs,
            num_latches,
            self.outputs().len(),
            order.len()
        );
        for latch in self.latches() {
            let _ = writeln!(text, "{}", map(latch.next)?);
        }
        for output in self.outputs() {
            let _ = writeln!(text, "{}", map(output.lit)?);
        }
        let mut bytes = text.into_bytes();
        for (k, &index) in order.iter().enumerate() {
            let gate = self.gates()[index];
            let lhs = Lit::positive(num_inputs + num_latches + k as u32 + 1).raw();
            let (a, b) = (map(gate.rhs0)?.raw(), map(gate.rhs1)?.raw());
            let (rhs0, rhs1) = if a >= b { (a, b) } else { (b, a) };
            encode_leb128(&mut bytes, lhs - rhs0);
            encode_leb128(&mut bytes, rhs0 - rhs1);
        }
        let mut tail = String::new();
        self.write_symbols(&mut tail);
        bytes.extend_from_slice(tail.as_bytes());
        Ok(bytes)
    }

    /// Gate indices ordered so that every gate follows its operands.
    fn topological_gates(&self) -> Result<Vec<usize>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            New,
            Open,
            Done,
        }
        let gates = self.gates();
        let mut index_of: FxHashMap<Var, usize> = FxHashMap::default();
        for (k, gate) in gates.iter().enumerate() {
            index_of.insert(gate.lhs.var(), k);
        }
        let mut marks = vec![Mark::New; gates.len()];
        let mut order = Vec::with_capacity(gates.len());
        for root in 0..gates.len() {
            if marks[root] != Mark::New {
                continue;
            }
            let mut stack = vec![root];
            while let Some(&top) = stack.last() {
                match marks[top] {
                    Mark::Done => {
                        stack.pop();
                    }
                    Mark::Open => {
                        marks[top] = Mark::Done;
                        order.push(top);
                        stack.pop();
                    }
                    Mark::New => {
                        marks[top] = Mark::Open;
                        for operand in [gates[top].rhs0, gates[top].rhs1] {
                            if operand.is_constant() {
                                continue;
                            }
                            match index_of.get(&operand.var()) {
                                Some(&child) if marks[child] == Mark::New => stack.push(child),
                                Some(&child) if marks[child] == Mark::Open => {
                                    return Err(AigerError::CyclicGate(gates[child].lhs.raw()));
                                }
                                Some(_) => {}
                                None if self.is_defined(operand) => {}
                                None => return Err(AigerError::UnknownLiteral(operand.raw())),
                            }
                        }
                    }
                }
            }
        }
        Ok(order)
    }
}

fn encode_leb128(out: &mut Vec<u8>, mut value: u32) {
    while value >= 0x80 {
        out.push((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}
