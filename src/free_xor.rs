//! A Yao garbled circuit with free XOR and point-and-permute.
//!
//! Every wire `w` carries two 16 byte labels, `L_w` for 0 and `L_w ^ Δ` for 1,
//! where the global offset `Δ` has its least significant bit set. The lsb of a
//! label is its signal bit, which selects the row of a garbled table during
//! evaluation. XOR and NOT gates need no table; AND and OR gates get a table of
//! four rows, row `2 * lsb(A) + lsb(B)` encrypting the output label for the
//! input labels `A` and `B` under the fixed-key AES hash.
use rand::{Rng, RngCore, SeedableRng};
use tracing::{Level, debug, instrument};

use crate::{
    block::Block,
    circuit::{BooleanCircuit, Gate},
    crypto::{AesRng, FIXED_KEY_HASH},
    data_types::{CircuitCreationValues, GarbledTables},
    garble::{Error, GarbledBooleanCircuit, InnerCircuit},
    prg::{AesPrg, PseudorandomGenerator},
    utils::{check_len, ct_eq, key_of, select_input_keys, single_key},
};

const AND: [bool; 4] = [false, false, false, true];
const OR: [bool; 4] = [false, true, true, true];

const TABLE_SIZE: usize = 4 * Block::BYTES;

/// Splits a byte array into 16 byte labels. Trailing bytes are ignored.
fn blocks(bytes: &[u8]) -> impl Iterator<Item = Block> + '_ {
    bytes.chunks_exact(Block::BYTES).map(|chunk| {
        let mut block = [0; Block::BYTES];
        block.copy_from_slice(chunk);
        Block::new(block)
    })
}

fn row_of(a: Block, b: Block) -> usize {
    2 * usize::from(a.lsb()) + usize::from(b.lsb())
}

fn row(table: &[u8], row: usize) -> Block {
    let mut block = [0; Block::BYTES];
    block.copy_from_slice(&table[row * Block::BYTES..(row + 1) * Block::BYTES]);
    Block::new(block)
}

/// Garbles a two-input gate with the given truth table (indexed by `2x + y`).
fn garble_table(
    gate: usize,
    a: [Block; 2],
    b: [Block; 2],
    c: [Block; 2],
    truth: [bool; 4],
) -> Vec<u8> {
    let mut table = vec![0; TABLE_SIZE];
    for x in 0..2 {
        for y in 0..2 {
            let r = row_of(a[x], b[y]);
            let out = c[usize::from(truth[2 * x + y])];
            let ct = FIXED_KEY_HASH.tccr_hash_pair(gate, a[x], b[y]) ^ out;
            table[r * Block::BYTES..(r + 1) * Block::BYTES].copy_from_slice(ct.as_bytes());
        }
    }
    table
}

/// Recovers both output labels of a garbled two-input gate.
///
/// All rows that encode the same plaintext value must decrypt to the same
/// label, and the two labels must differ by `delta`.
fn verify_table(
    gate: usize,
    table: &[u8],
    a: [Block; 2],
    b: [Block; 2],
    truth: [bool; 4],
    delta: Block,
) -> Option<[Block; 2]> {
    if table.len() != TABLE_SIZE {
        debug!(gate, len = table.len(), "garbled table has the wrong size");
        return None;
    }
    let mut labels: [Option<Block>; 2] = [None, None];
    for x in 0..2 {
        for y in 0..2 {
            let out = row(table, row_of(a[x], b[y])) ^ FIXED_KEY_HASH.tccr_hash_pair(gate, a[x], b[y]);
            let slot = &mut labels[usize::from(truth[2 * x + y])];
            match slot {
                Some(label) if *label != out => {
                    debug!(gate, "rows of equal value decrypt to different labels");
                    return None;
                }
                Some(_) => {}
                None => *slot = Some(out),
            }
        }
    }
    let [Some(c0), Some(c1)] = labels else {
        return None;
    };
    if c0 ^ c1 != delta {
        debug!(gate, "output labels do not differ by the global offset");
        return None;
    }
    Some([c0, c1])
}

/// A garbled [`BooleanCircuit`] with 16 byte keys.
///
/// The PRG `P` is only used by [`garble_with_seed`]: it is keyed with the seed
/// and expanded into the seed of the AES-CTR generator that draws all labels.
///
/// [`garble_with_seed`]: GarbledBooleanCircuit::garble_with_seed
#[derive(Debug, Clone)]
pub struct FreeXorCircuit<P = AesPrg> {
    circuit: BooleanCircuit,
    input_indices: Vec<usize>,
    party_indices: Vec<Vec<usize>>,
    tables: GarbledTables,
    translation_table: Vec<u8>,
    prg: P,
    garbled: bool,
}

impl FreeXorCircuit {
    /// Wraps a validated circuit, using an [`AesPrg`] for seeded garbling.
    pub fn new(circuit: BooleanCircuit) -> Result<Self, Error> {
        Self::with_prg(circuit, AesPrg::default())
    }
}

impl<P: PseudorandomGenerator> FreeXorCircuit<P> {
    /// Wraps a validated circuit, using `prg` for seeded garbling.
    pub fn with_prg(circuit: BooleanCircuit, prg: P) -> Result<Self, Error> {
        circuit.validate()?;
        Ok(FreeXorCircuit {
            input_indices: (0..circuit.num_inputs()).collect(),
            party_indices: circuit.party_input_wires(),
            circuit,
            tables: GarbledTables::default(),
            translation_table: vec![],
            prg,
            garbled: false,
        })
    }

    /// The plaintext circuit.
    pub fn circuit(&self) -> &BooleanCircuit {
        &self.circuit
    }

    #[instrument(level = Level::DEBUG, skip_all, fields(gates = self.circuit.gates.len()))]
    fn garble_from(&mut self, rng: &mut impl RngCore) -> CircuitCreationValues {
        let delta = rng.random::<Block>().with_lsb_set();
        let n_inputs = self.circuit.num_inputs();
        let mut zero_labels: Vec<Block> = Vec::with_capacity(self.circuit.num_wires());
        for _ in 0..n_inputs {
            zero_labels.push(rng.random());
        }
        let mut tables = Vec::with_capacity(self.circuit.gates.len());
        for (g, gate) in self.circuit.gates.iter().enumerate() {
            let pair = |w: usize| [zero_labels[w], zero_labels[w] ^ delta];
            let (label, table) = match *gate {
                Gate::Xor(x, y) => (zero_labels[x] ^ zero_labels[y], None),
                Gate::Not(x) => (zero_labels[x] ^ delta, None),
                Gate::And(x, y) | Gate::Or(x, y) => {
                    let truth = if matches!(gate, Gate::And(..)) { AND } else { OR };
                    let out: Block = rng.random();
                    let table = garble_table(g, pair(x), pair(y), [out, out ^ delta], truth);
                    (out, Some(table))
                }
            };
            zero_labels.push(label);
            tables.push(table);
        }

        let mut all_input_keys = Vec::with_capacity(2 * n_inputs * Block::BYTES);
        for label in &zero_labels[..n_inputs] {
            all_input_keys.extend_from_slice(label.as_bytes());
            all_input_keys.extend_from_slice((*label ^ delta).as_bytes());
        }
        let mut all_output_keys = Vec::with_capacity(2 * self.circuit.output_gates.len() * Block::BYTES);
        let mut translation_table = Vec::with_capacity(self.circuit.output_gates.len());
        for w in &self.circuit.output_gates {
            let label = zero_labels[*w];
            all_output_keys.extend_from_slice(label.as_bytes());
            all_output_keys.extend_from_slice((label ^ delta).as_bytes());
            translation_table.push(u8::from(label.lsb()));
        }

        self.tables = tables.into();
        self.translation_table = translation_table.clone();
        self.garbled = true;
        CircuitCreationValues {
            all_input_keys,
            all_output_keys,
            translation_table,
        }
    }

    fn output_count(&self) -> usize {
        self.circuit.output_gates.len()
    }
}

impl<P: PseudorandomGenerator> GarbledBooleanCircuit for FreeXorCircuit<P> {
    type Output = Vec<u8>;
    type Tables = GarbledTables;

    fn garble(&mut self) -> Result<CircuitCreationValues, Error> {
        Ok(self.garble_from(&mut AesRng::new()))
    }

    fn garble_with_seed(&mut self, seed: &[u8]) -> Result<CircuitCreationValues, Error> {
        self.prg.set_key(seed).map_err(Error::InvalidSeed)?;
        let mut rng_seed = [0; Block::BYTES];
        self.prg.get_bytes(&mut rng_seed)?;
        Ok(self.garble_from(&mut AesRng::from_seed(rng_seed)))
    }

    fn garbled_input_from_ungarbled_input(
        &self,
        ungarbled_bits: &[u8],
        all_input_keys: &[u8],
        party_number: usize,
    ) -> Result<Vec<u8>, Error> {
        let positions = self.party_input_wire_indices(party_number)?;
        select_input_keys(
            ungarbled_bits,
            all_input_keys,
            positions,
            self.input_indices.len(),
            Block::BYTES,
        )
    }

    fn compute(&mut self, garbled_inputs: &[u8]) -> Result<Vec<u8>, Error> {
        if !self.garbled {
            return Err(Error::NotGarbled);
        }
        let expected = self.input_indices.len() * Block::BYTES;
        if garbled_inputs.len() != expected {
            return Err(Error::NotAllInputsSet {
                expected,
                actual: garbled_inputs.len(),
            });
        }
        let mut labels: Vec<Block> = Vec::with_capacity(self.circuit.num_wires());
        labels.extend(blocks(garbled_inputs));
        for (g, gate) in self.circuit.gates.iter().enumerate() {
            let label = match *gate {
                Gate::Xor(x, y) => labels[x] ^ labels[y],
                Gate::Not(x) => labels[x],
                Gate::And(x, y) | Gate::Or(x, y) => {
                    let table = self.tables.get(g).ok_or(Error::MissingGarbledTable(g))?;
                    if table.len() != TABLE_SIZE {
                        return Err(Error::TablesMismatch("garbled table of a gate has the wrong size"));
                    }
                    let (a, b) = (labels[x], labels[y]);
                    row(table, row_of(a, b)) ^ FIXED_KEY_HASH.tccr_hash_pair(g, a, b)
                }
            };
            labels.push(label);
        }
        let mut output = Vec::with_capacity(self.output_count() * Block::BYTES);
        for w in &self.circuit.output_gates {
            output.extend_from_slice(labels[*w].as_bytes());
        }
        Ok(output)
    }

    fn verify(&mut self, all_input_keys: &[u8]) -> bool {
        self.internal_verify(all_input_keys)
            .is_some_and(|all_output_keys| self.verify_translation_table(&all_output_keys))
    }

    fn internal_verify(&mut self, all_input_keys: &[u8]) -> Option<Vec<u8>> {
        let n_inputs = self.input_indices.len();
        if all_input_keys.len() != 2 * n_inputs * Block::BYTES {
            debug!(len = all_input_keys.len(), "input keys have the wrong size");
            return None;
        }
        if self.tables.len() != self.circuit.gates.len() {
            debug!("garbled tables do not match the circuit");
            return None;
        }
        let pairs: Vec<Block> = blocks(all_input_keys).collect();
        let delta = match pairs.as_slice() {
            [k0, k1, ..] => *k0 ^ *k1,
            _ => return None,
        };
        if !delta.lsb() {
            debug!("global offset has an unset signal bit");
            return None;
        }
        let mut zero_labels: Vec<Block> = Vec::with_capacity(self.circuit.num_wires());
        for pair in pairs.chunks_exact(2) {
            if pair[0] ^ pair[1] != delta {
                debug!("input keys do not share the global offset");
                return None;
            }
            zero_labels.push(pair[0]);
        }
        for (g, gate) in self.circuit.gates.iter().enumerate() {
            let pair = |w: usize| [zero_labels[w], zero_labels[w] ^ delta];
            let label = match *gate {
                Gate::Xor(x, y) => zero_labels[x] ^ zero_labels[y],
                Gate::Not(x) => zero_labels[x] ^ delta,
                Gate::And(x, y) | Gate::Or(x, y) => {
                    let truth = if matches!(gate, Gate::And(..)) { AND } else { OR };
                    let Some(table) = self.tables.get(g) else {
                        debug!(gate = g, "missing garbled table");
                        return None;
                    };
                    verify_table(g, table, pair(x), pair(y), truth, delta)?[0]
                }
            };
            zero_labels.push(label);
        }
        let mut all_output_keys = Vec::with_capacity(2 * self.output_count() * Block::BYTES);
        for w in &self.circuit.output_gates {
            all_output_keys.extend_from_slice(zero_labels[*w].as_bytes());
            all_output_keys.extend_from_slice((zero_labels[*w] ^ delta).as_bytes());
        }
        Some(all_output_keys)
    }

    fn verify_translation_table(&self, all_output_keys: &[u8]) -> bool {
        let n = self.output_count();
        if all_output_keys.len() != 2 * n * Block::BYTES || self.translation_table.len() != n {
            return false;
        }
        let labels: Vec<Block> = blocks(all_output_keys).collect();
        labels
            .chunks_exact(2)
            .zip(&self.translation_table)
            .all(|(pair, t)| *t <= 1 && pair[0].lsb() == (*t == 1) && pair[1].lsb() != (*t == 1))
    }

    fn translate(&self, garbled_output: &Vec<u8>) -> Result<Vec<u8>, Error> {
        let n = self.output_count();
        check_len(garbled_output, n * Block::BYTES)?;
        if self.translation_table.len() != n {
            return Err(Error::NotGarbled);
        }
        Ok(blocks(garbled_output)
            .zip(&self.translation_table)
            .map(|(label, t)| u8::from(label.lsb()) ^ t)
            .collect())
    }

    fn verified_translate(
        &self,
        garbled_output: &Vec<u8>,
        all_output_keys: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let n = self.output_count();
        check_len(garbled_output, n * Block::BYTES)?;
        check_len(all_output_keys, 2 * n * Block::BYTES)?;
        for wire in 0..n {
            let key = single_key(garbled_output, wire, Block::BYTES);
            if !ct_eq(key, key_of(all_output_keys, wire, 0, Block::BYTES))
                && !ct_eq(key, key_of(all_output_keys, wire, 1, Block::BYTES))
            {
                return Err(Error::CheatAttempt { wire });
            }
        }
        self.translate(garbled_output)
    }

    fn garbled_tables(&self) -> GarbledTables {
        self.tables.clone()
    }

    fn set_garbled_tables(&mut self, tables: GarbledTables) -> Result<(), Error> {
        if tables.len() != self.circuit.gates.len() {
            return Err(Error::TablesMismatch("one table slot per gate is required"));
        }
        self.tables = tables;
        self.garbled = true;
        Ok(())
    }

    fn translation_table(&self) -> &[u8] {
        &self.translation_table
    }

    fn set_translation_table(&mut self, translation_table: Vec<u8>) {
        self.translation_table = translation_table;
    }

    fn input_wire_indices(&self) -> &[usize] {
        &self.input_indices
    }

    fn output_wire_indices(&self) -> &[usize] {
        &self.circuit.output_gates
    }

    fn party_input_wire_indices(&self, party_number: usize) -> Result<&[usize], Error> {
        party_number
            .checked_sub(1)
            .and_then(|p| self.party_indices.get(p))
            .map(Vec::as_slice)
            .ok_or(Error::NoSuchParty(party_number))
    }

    fn number_of_parties(&self) -> usize {
        self.party_indices.len()
    }
}

impl<P: PseudorandomGenerator> InnerCircuit for FreeXorCircuit<P> {
    fn key_size(&self) -> usize {
        Block::BYTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_adder() -> BooleanCircuit {
        BooleanCircuit {
            input_gates: vec![1, 2],
            gates: vec![
                Gate::Xor(0, 1),
                Gate::Xor(3, 2),
                Gate::And(0, 1),
                Gate::And(3, 2),
                Gate::Or(5, 6),
                Gate::Not(7),
            ],
            output_gates: vec![4, 7, 8],
        }
    }

    fn evaluate(circuit: &mut FreeXorCircuit, keys: &CircuitCreationValues, a: u8, bc: [u8; 2]) -> Vec<u8> {
        let mut input = circuit
            .garbled_input_from_ungarbled_input(&[a], &keys.all_input_keys, 1)
            .unwrap();
        input.extend(
            circuit
                .garbled_input_from_ungarbled_input(&bc, &keys.all_input_keys, 2)
                .unwrap(),
        );
        let output = circuit.compute(&input).unwrap();
        circuit.verified_translate(&output, &keys.all_output_keys).unwrap()
    }

    #[test]
    fn evaluates_full_adder() {
        let mut circuit = FreeXorCircuit::new(full_adder()).unwrap();
        let keys = circuit.garble().unwrap();
        for a in 0..2 {
            for b in 0..2 {
                for c in 0..2 {
                    let expected: Vec<u8> = full_adder()
                        .eval(&[&[a == 1], &[b == 1, c == 1]])
                        .into_iter()
                        .map(u8::from)
                        .collect();
                    assert_eq!(expected, evaluate(&mut circuit, &keys, a, [b, c]));
                }
            }
        }
    }

    #[test]
    fn honest_garbling_verifies() {
        let mut circuit = FreeXorCircuit::new(full_adder()).unwrap();
        let keys = circuit.garble().unwrap();
        assert_eq!(Some(keys.all_output_keys.clone()), circuit.internal_verify(&keys.all_input_keys));
        assert!(circuit.verify(&keys.all_input_keys));
    }

    #[test]
    fn tampered_table_fails_verification() {
        let mut circuit = FreeXorCircuit::new(full_adder()).unwrap();
        let keys = circuit.garble().unwrap();
        for byte in [0, 17, 63] {
            let mut tampered = circuit.clone();
            let tables = circuit.garbled_tables().modified(3, |t| t[byte] ^= 0x80);
            tampered.set_garbled_tables(tables).unwrap();
            assert!(!tampered.verify(&keys.all_input_keys));
        }
    }

    #[test]
    fn wrong_translation_table_fails_verification() {
        let mut circuit = FreeXorCircuit::new(full_adder()).unwrap();
        let keys = circuit.garble().unwrap();
        let mut flipped = keys.translation_table.clone();
        flipped[1] ^= 1;
        circuit.set_translation_table(flipped);
        assert!(circuit.internal_verify(&keys.all_input_keys).is_some());
        assert!(!circuit.verify(&keys.all_input_keys));
    }

    #[test]
    fn seeded_garbling_is_deterministic() {
        let mut a = FreeXorCircuit::new(full_adder()).unwrap();
        let mut b = FreeXorCircuit::new(full_adder()).unwrap();
        let seed = [7; 16];
        assert_eq!(a.garble_with_seed(&seed).unwrap(), b.garble_with_seed(&seed).unwrap());
        assert_eq!(a.garbled_tables(), b.garbled_tables());
        assert_ne!(
            a.garble_with_seed(&[8; 16]).unwrap(),
            b.garble_with_seed(&seed).unwrap()
        );
        assert!(matches!(
            a.garble_with_seed(&[0; 3]),
            Err(Error::InvalidSeed(_))
        ));
    }

    #[test]
    fn structural_errors() {
        let mut circuit = FreeXorCircuit::new(full_adder()).unwrap();
        assert!(matches!(circuit.compute(&[0; 48]), Err(Error::NotGarbled)));
        let keys = circuit.garble().unwrap();
        assert!(matches!(
            circuit.compute(&[0; 32]),
            Err(Error::NotAllInputsSet {
                expected: 48,
                actual: 32
            })
        ));
        assert!(matches!(
            circuit.garbled_input_from_ungarbled_input(&[1], &keys.all_input_keys, 3),
            Err(Error::NoSuchParty(3))
        ));
        assert!(matches!(
            circuit.set_garbled_tables(GarbledTables::default()),
            Err(Error::TablesMismatch(_))
        ));
        assert_eq!(2, circuit.number_of_parties());
        assert_eq!(2, circuit.number_of_inputs(2).unwrap());
    }

    #[test]
    fn foreign_output_key_is_a_cheat() {
        let mut circuit = FreeXorCircuit::new(full_adder()).unwrap();
        let keys = circuit.garble().unwrap();
        let input: Vec<u8> = (0..3)
            .flat_map(|w| key_of(&keys.all_input_keys, w, 0, 16).to_vec())
            .collect();
        let mut output = circuit.compute(&input).unwrap();
        output[20] ^= 1;
        assert!(matches!(
            circuit.verified_translate(&output, &keys.all_output_keys),
            Err(Error::CheatAttempt { wire: 1 })
        ));
    }
}
