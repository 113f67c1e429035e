//! Fuzz target for the AIGER parser
//!
//! Feeds arbitrary bytes to the parser. Whatever parses must write back in
//! both formats and parse again to the same shape.

#![no_main]

use libfuzzer_sys::fuzz_target;
use swiss_aig::Circuit;

fuzz_target!(|data: &[u8]| {
    let Ok(circuit) = Circuit::from_bytes(data) else {
        return;
    };

    if let Ok(text) = circuit.to_ascii() {
        let reparsed = Circuit::from_bytes(text.as_bytes()).expect("written ASCII must parse");
        assert_eq!(reparsed.inputs().len(), circuit.inputs().len());
        assert_eq!(reparsed.latches().len(), circuit.latches().len());
    }
    if let Ok(binary) = circuit.to_binary() {
        let reparsed = Circuit::from_bytes(&binary).expect("written binary must parse");
        assert_eq!(reparsed.latches().len(), circuit.latches().len());
    }
});
