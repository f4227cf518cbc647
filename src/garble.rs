//! The contract shared by all garbled boolean circuits.
//!
//! Keys are passed around as flat byte arrays without length prefixes: arrays
//! holding *both* keys of every wire are laid out `[k0, k1, k0, k1, …]`, arrays
//! holding the *single* (active) key of every wire are laid out `[k, k, …]`.
//! Plaintext bits are passed as one byte (0 or 1) per bit.
use thiserror::Error;

use crate::{circuit::CircuitError, data_types::CircuitCreationValues, mes, prg};

/// Errors raised while garbling, evaluating or translating a circuit.
///
/// Failed verification is *not* an error: the `verify` family of methods
/// returns `false` (or `None`) for dishonest garblings.
#[derive(Debug, Error)]
pub enum Error {
    /// The garbled input does not contain exactly one key per input wire.
    #[error("not all inputs are set: expected {expected} bytes of garbled input, found {actual}")]
    NotAllInputsSet {
        /// Number of input wires times the key size.
        expected: usize,
        /// Length of the given garbled input.
        actual: usize,
    },
    /// A garbled output is neither of the two keys recorded for its wire.
    #[error("the garbled output of wire {wire} is not one of its two possible keys")]
    CheatAttempt {
        /// The output wire whose key did not match.
        wire: usize,
    },
    /// The key given to an identity gate does not decrypt any row of its table.
    #[error("the key given to identity gate {gate} is not a valid input wire value")]
    InvalidWireValue {
        /// The identity gate.
        gate: usize,
    },
    /// The seed cannot be used to key the PRG.
    #[error("invalid seed: {0}")]
    InvalidSeed(prg::Error),
    /// The PRG failed after it was keyed.
    #[error("PRG error: {0}")]
    Prg(#[from] prg::Error),
    /// The encryption scheme was used incorrectly.
    #[error("encryption error: {0}")]
    Encryption(#[from] mes::Error),
    /// The specified party does not exist in the circuit.
    #[error("party {0} does not exist")]
    NoSuchParty(usize),
    /// The number of plaintext input bits does not match the party's input wires.
    #[error("wrong input, expected {expected} bits, found {actual}")]
    WrongInputSize {
        /// The number of input wires of the party.
        expected: usize,
        /// The number of bits provided.
        actual: usize,
    },
    /// A key array does not have the length required by the circuit.
    #[error("wrong key array, expected {expected} bytes, found {actual}")]
    WrongKeySize {
        /// The expected length in bytes.
        expected: usize,
        /// The given length in bytes.
        actual: usize,
    },
    /// The inner circuit's keys do not fit into a block of the encryption scheme.
    #[error("inner keys of {inner} bytes do not fit into ciphertexts of {cipher} bytes")]
    KeySizeMismatch {
        /// Key size of the inner circuit.
        inner: usize,
        /// Cipher size of the encryption scheme.
        cipher: usize,
    },
    /// A gate that needs a garbled table has none.
    #[error("gate {0} has no garbled table")]
    MissingGarbledTable(usize),
    /// Garbled tables do not have the shape of the circuit.
    #[error("garbled tables do not match the circuit: {0}")]
    TablesMismatch(&'static str),
    /// The operation requires a garbled circuit.
    #[error("the circuit has not been garbled yet")]
    NotGarbled,
    /// Keys can only be pinned before garbling.
    #[error("keys must be set before the circuit is garbled")]
    AlreadyGarbled,
    /// The plaintext circuit is invalid.
    #[error("invalid circuit: {0}")]
    Circuit(#[from] CircuitError),
}

/// A garbled boolean circuit.
///
/// Implemented both by inner circuits that garble actual boolean gates (see
/// [`InnerCircuit`]) and by the [`ExtendedGarbledCircuit`] that wraps them.
///
/// [`ExtendedGarbledCircuit`]: crate::extended::ExtendedGarbledCircuit
pub trait GarbledBooleanCircuit {
    /// The result of [`compute`](Self::compute), consumed by
    /// [`translate`](Self::translate).
    type Output;
    /// The garbled tables, cheap to clone.
    type Tables: Clone;

    /// Generates both keys of each wire from fresh randomness and garbles all
    /// gates with them.
    fn garble(&mut self) -> Result<CircuitCreationValues, Error>;

    /// Like [`garble`](Self::garble), but all randomness is derived from
    /// `seed`: garbling twice with the same seed yields identical keys and
    /// tables.
    fn garble_with_seed(&mut self, seed: &[u8]) -> Result<CircuitCreationValues, Error>;

    /// Looks up the key of each plaintext input bit of party `party_number`
    /// (1-based) in `all_input_keys`.
    fn garbled_input_from_ungarbled_input(
        &self,
        ungarbled_bits: &[u8],
        all_input_keys: &[u8],
        party_number: usize,
    ) -> Result<Vec<u8>, Error>;

    /// Evaluates the circuit on one key per input wire.
    fn compute(&mut self, garbled_inputs: &[u8]) -> Result<Self::Output, Error>;

    /// Checks, given both keys of each input wire, that the circuit is an
    /// honest garbling, including its translation table.
    fn verify(&mut self, all_input_keys: &[u8]) -> bool;

    /// Checks the garbled gates like [`verify`](Self::verify) but not the
    /// translation table. Returns both keys of each output wire on success so
    /// that the caller can check the translation table later.
    fn internal_verify(&mut self, all_input_keys: &[u8]) -> Option<Vec<u8>>;

    /// Checks that the signal bits of both keys of each output wire match the
    /// translation table.
    fn verify_translation_table(&self, all_output_keys: &[u8]) -> bool;

    /// Translates a garbled output into one plaintext bit per output wire.
    fn translate(&self, garbled_output: &Self::Output) -> Result<Vec<u8>, Error>;

    /// Checks that each output key is one of the two keys recorded for its wire
    /// in `all_output_keys`, then translates.
    fn verified_translate(
        &self,
        garbled_output: &Self::Output,
        all_output_keys: &[u8],
    ) -> Result<Vec<u8>, Error>;

    /// The garbled tables, e.g. to send them to the evaluator.
    fn garbled_tables(&self) -> Self::Tables;

    /// Replaces the garbled tables, e.g. with tables received from the garbler.
    fn set_garbled_tables(&mut self, tables: Self::Tables) -> Result<(), Error>;

    /// One signal bit per output wire.
    fn translation_table(&self) -> &[u8];

    /// Replaces the translation table, e.g. with the garbler's.
    fn set_translation_table(&mut self, translation_table: Vec<u8>);

    /// The input wires of all parties.
    fn input_wire_indices(&self) -> &[usize];

    /// The output wires.
    fn output_wire_indices(&self) -> &[usize];

    /// The input wires of party `party_number` (1-based).
    fn party_input_wire_indices(&self, party_number: usize) -> Result<&[usize], Error>;

    /// The number of input wires of party `party_number` (1-based).
    fn number_of_inputs(&self, party_number: usize) -> Result<usize, Error> {
        Ok(self.party_input_wire_indices(party_number)?.len())
    }

    /// The number of parties providing inputs.
    fn number_of_parties(&self) -> usize;
}

/// A circuit that garbles the actual boolean gates, using keys of a single
/// native size.
pub trait InnerCircuit:
    GarbledBooleanCircuit<Output = Vec<u8>, Tables = crate::data_types::GarbledTables>
{
    /// Size of every key, in bytes.
    fn key_size(&self) -> usize;
}
