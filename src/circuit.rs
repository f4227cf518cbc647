//! Plaintext boolean circuits, the input of the [`FreeXorCircuit`].
//!
//! Wires are numbered consecutively: the input wires of all parties come
//! first (party 1's block, then party 2's, …), followed by one wire per gate in
//! gate order. A gate may only refer to wires with a smaller number.
//!
//! [`FreeXorCircuit`]: crate::free_xor::FreeXorCircuit
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Index of a wire in a [`BooleanCircuit`].
pub type WireIndex = usize;

/// A gate of a [`BooleanCircuit`], referring to its input wires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gate {
    /// `x ^ y`
    Xor(WireIndex, WireIndex),
    /// `x & y`
    And(WireIndex, WireIndex),
    /// `x | y`
    Or(WireIndex, WireIndex),
    /// `!x`
    Not(WireIndex),
}

impl Gate {
    fn inputs(&self) -> impl Iterator<Item = WireIndex> {
        let (x, y) = match *self {
            Gate::Xor(x, y) | Gate::And(x, y) | Gate::Or(x, y) => (x, Some(y)),
            Gate::Not(x) => (x, None),
        };
        std::iter::once(x).chain(y)
    }
}

/// Errors found while validating a [`BooleanCircuit`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitError {
    /// The circuit has no parties providing inputs.
    #[error("the circuit has no input parties")]
    NoParties,
    /// A gate refers to a wire that is not computed before the gate.
    #[error("gate {gate} refers to wire {wire}, which is not yet defined")]
    InvalidWire {
        /// The offending gate.
        gate: usize,
        /// The undefined wire.
        wire: WireIndex,
    },
    /// An output refers to a wire that does not exist.
    #[error("output wire {0} does not exist")]
    InvalidOutput(WireIndex),
}

/// A boolean circuit with inputs from one or more parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanCircuit {
    /// The number of input wires of each party (party `p` is at index `p - 1`).
    pub input_gates: Vec<usize>,
    /// The gates, in topological order.
    pub gates: Vec<Gate>,
    /// The wires whose values form the output.
    pub output_gates: Vec<WireIndex>,
}

impl BooleanCircuit {
    /// Checks that all wires are defined before they are used.
    pub fn validate(&self) -> Result<(), CircuitError> {
        if self.input_gates.is_empty() {
            return Err(CircuitError::NoParties);
        }
        let n_inputs = self.num_inputs();
        for (g, gate) in self.gates.iter().enumerate() {
            if let Some(wire) = gate.inputs().find(|w| *w >= n_inputs + g) {
                return Err(CircuitError::InvalidWire { gate: g, wire });
            }
        }
        let n_wires = self.num_wires();
        if let Some(w) = self.output_gates.iter().find(|w| **w >= n_wires) {
            return Err(CircuitError::InvalidOutput(*w));
        }
        Ok(())
    }

    /// Total number of input wires over all parties.
    pub fn num_inputs(&self) -> usize {
        self.input_gates.iter().sum()
    }

    /// Total number of wires (inputs and gate outputs).
    pub fn num_wires(&self) -> usize {
        self.num_inputs() + self.gates.len()
    }

    /// The wire computed by gate `gate`.
    pub fn gate_wire(&self, gate: usize) -> WireIndex {
        self.num_inputs() + gate
    }

    /// The input wires of each party, in party order.
    pub fn party_input_wires(&self) -> Vec<Vec<WireIndex>> {
        let mut next = 0;
        self.input_gates
            .iter()
            .map(|n| {
                let wires = (next..next + n).collect();
                next += n;
                wires
            })
            .collect()
    }

    /// Evaluates the circuit in the clear, one slice of input bits per party.
    pub fn eval(&self, inputs: &[&[bool]]) -> Vec<bool> {
        let mut values: Vec<bool> = inputs.iter().flat_map(|i| i.iter().copied()).collect();
        for gate in &self.gates {
            let value = match *gate {
                Gate::Xor(x, y) => values[x] ^ values[y],
                Gate::And(x, y) => values[x] & values[y],
                Gate::Or(x, y) => values[x] | values[y],
                Gate::Not(x) => !values[x],
            };
            values.push(value);
        }
        self.output_gates.iter().map(|w| values[*w]).collect()
    }
}
