//! A garbled circuit whose boundary keys can be chosen by the caller.
//!
//! [`ExtendedGarbledCircuit`] wraps an [`InnerCircuit`]. If the caller pins the
//! keys of the input (or output) wires before garbling, a layer of identity
//! gates translates between the pinned keys and the keys the inner circuit
//! generated on its own. Sides without pinned keys are passed through
//! unchanged, and so are the inner circuit's tables and translation table.
//!
//! The identity gates are encrypted with a [`MultiKeyEncryptionScheme`], whose
//! cipher size is the size of all pinned keys. Inner keys may be shorter, in
//! which case they are zero padded inside the identity tables.
use tracing::{Level, debug, instrument};

use crate::{
    data_types::{CircuitCreationValues, ExtendedGarbledTables, GarbledTables},
    garble::{Error, GarbledBooleanCircuit, InnerCircuit},
    hash::CryptographicHash,
    identity_gate::{IdentityGate, IdentityLayer, RowPermutation},
    mes::MultiKeyEncryptionScheme,
    prg::{AesPrg, PseudorandomGenerator},
    utils::{check_len, ct_eq, key_of, key_pair, select_input_keys, single_key},
};

/// The result of [`ExtendedGarbledCircuit::compute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedOutput {
    /// One key per output wire, in the pinned key domain if output keys were
    /// pinned, otherwise the inner circuit's output.
    pub garbled: Vec<u8>,
    /// The output of the inner circuit, which is what gets translated.
    pub inner: Vec<u8>,
}

impl ExtendedOutput {
    /// The final garbled output.
    pub fn garbled(&self) -> &[u8] {
        &self.garbled
    }

    /// The output of the inner circuit.
    pub fn inner(&self) -> &[u8] {
        &self.inner
    }
}

/// Both output keys of every output wire, recovered during verification.
struct VerifiedOutputs {
    inner: Vec<u8>,
    extended: Vec<u8>,
}

/// The identity gates of a layer together with their tables, if the layer is
/// present.
type ActiveLayer<'a> = Option<(&'a [IdentityGate], &'a GarbledTables)>;

fn active_layer<'a>(
    layer: &'a IdentityLayer,
    tables: Option<&'a GarbledTables>,
) -> Result<ActiveLayer<'a>, Error> {
    match (layer.gates(), tables) {
        (None, _) => Ok(None),
        (Some(gates), Some(tables)) => Ok(Some((gates, tables))),
        (Some(_), None) => Err(Error::NotGarbled),
    }
}

/// Garbles one identity gate per wire, from `source` keys to `target` keys.
fn garble_layer<M: MultiKeyEncryptionScheme, P: PseudorandomGenerator>(
    gates: &[IdentityGate],
    mes: &mut M,
    permutation: &mut RowPermutation<'_, P>,
    (source, source_size): (&[u8], usize),
    (target, target_size): (&[u8], usize),
) -> Result<GarbledTables, Error> {
    check_len(source, 2 * gates.len() * source_size)?;
    check_len(target, 2 * gates.len() * target_size)?;
    gates
        .iter()
        .enumerate()
        .map(|(i, gate)| {
            gate.create_table(
                mes,
                permutation,
                key_pair(source, i, source_size),
                key_pair(target, i, target_size),
            )
            .map(Some)
        })
        .collect()
}

/// Evaluates one identity gate per wire.
fn compute_layer<M: MultiKeyEncryptionScheme>(
    (gates, tables): (&[IdentityGate], &GarbledTables),
    mes: &mut M,
    (keys, key_size): (&[u8], usize),
    out_key_size: usize,
) -> Result<Vec<u8>, Error> {
    let mut out = Vec::with_capacity(gates.len() * out_key_size);
    for (i, gate) in gates.iter().enumerate() {
        let table = tables.get(i).ok_or(Error::MissingGarbledTable(i))?;
        out.extend(gate.compute(mes, table, single_key(keys, i, key_size), out_key_size)?);
    }
    Ok(out)
}

/// Verifies one identity gate per wire and returns both output keys of each.
fn verify_layer<M: MultiKeyEncryptionScheme>(
    (gates, tables): (&[IdentityGate], &GarbledTables),
    mes: &mut M,
    (all_keys, key_size): (&[u8], usize),
    out_key_size: usize,
) -> Option<Vec<u8>> {
    if tables.len() != gates.len() || all_keys.len() != 2 * gates.len() * key_size {
        debug!(gates = gates.len(), tables = tables.len(), "identity layer has the wrong shape");
        return None;
    }
    let mut out = Vec::with_capacity(2 * gates.len() * out_key_size);
    for (i, gate) in gates.iter().enumerate() {
        let table = tables.get(i)?;
        let index = u32::try_from(i).ok()?;
        let [k0, k1] = gate.verify(index, mes, table, key_pair(all_keys, i, key_size), out_key_size)?;
        out.extend(k0);
        out.extend(k1);
    }
    Some(out)
}

/// A garbled circuit wrapping an [`InnerCircuit`], with optional layers of
/// identity gates that map caller-chosen keys to the inner circuit's keys.
///
/// The PRG `P` drives [`garble_with_seed`]: the seed is expanded into one seed
/// for the inner circuit and one for the row order of the identity tables, so
/// pinning keys never changes the inner garbling.
///
/// [`garble_with_seed`]: GarbledBooleanCircuit::garble_with_seed
#[derive(Debug, Clone)]
pub struct ExtendedGarbledCircuit<C, M, P = AesPrg> {
    inner: C,
    mes: M,
    prg: P,
    input_layer: IdentityLayer,
    output_layer: IdentityLayer,
    pinned_input_keys: Option<Vec<u8>>,
    pinned_output_keys: Option<Vec<u8>>,
    input_tables: Option<GarbledTables>,
    output_tables: Option<GarbledTables>,
    garbled: bool,
}

impl<C: InnerCircuit, M: MultiKeyEncryptionScheme> ExtendedGarbledCircuit<C, M> {
    /// Wraps `inner`, encrypting identity gates with `mes`. Seeded garbling
    /// uses an [`AesPrg`] and thus 16 byte seeds.
    pub fn new(inner: C, mes: M) -> Result<Self, Error> {
        Self::with_prg(inner, mes, AesPrg::default())
    }
}

impl<C: InnerCircuit, M: MultiKeyEncryptionScheme, P: PseudorandomGenerator>
    ExtendedGarbledCircuit<C, M, P>
{
    /// Wraps `inner`, encrypting identity gates with `mes` and deriving seeded
    /// garblings from `prg`.
    ///
    /// Fails if the inner keys are larger than the cipher size of `mes`.
    pub fn with_prg(inner: C, mes: M, prg: P) -> Result<Self, Error> {
        if inner.key_size() > mes.cipher_size() {
            return Err(Error::KeySizeMismatch {
                inner: inner.key_size(),
                cipher: mes.cipher_size(),
            });
        }
        Ok(ExtendedGarbledCircuit {
            inner,
            mes,
            prg,
            input_layer: IdentityLayer::Absent,
            output_layer: IdentityLayer::Absent,
            pinned_input_keys: None,
            pinned_output_keys: None,
            input_tables: None,
            output_tables: None,
            garbled: false,
        })
    }

    /// The wrapped circuit.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Size of the keys expected by [`compute`](GarbledBooleanCircuit::compute).
    pub fn input_key_size(&self) -> usize {
        match self.input_layer {
            IdentityLayer::Absent => self.inner.key_size(),
            IdentityLayer::Present(_) => self.mes.cipher_size(),
        }
    }

    /// Size of the keys in the garbled output.
    pub fn output_key_size(&self) -> usize {
        match self.output_layer {
            IdentityLayer::Absent => self.inner.key_size(),
            IdentityLayer::Present(_) => self.mes.cipher_size(),
        }
    }

    /// Pins both keys of every input wire (`[k0, k1, k0, k1, …]`, each key of
    /// the cipher size). Only possible before garbling.
    pub fn set_input_keys(&mut self, all_input_keys: Vec<u8>) -> Result<(), Error> {
        if self.garbled {
            return Err(Error::AlreadyGarbled);
        }
        let n = self.inner.input_wire_indices().len();
        check_len(&all_input_keys, 2 * n * self.mes.cipher_size())?;
        self.input_layer = IdentityLayer::with_gates(n)?;
        self.pinned_input_keys = Some(all_input_keys);
        debug!(gates = n, "pinned input keys");
        Ok(())
    }

    /// Pins both keys of every output wire (`[k0, k1, k0, k1, …]`, each key of
    /// the cipher size). Only possible before garbling.
    pub fn set_output_keys(&mut self, all_output_keys: Vec<u8>) -> Result<(), Error> {
        if self.garbled {
            return Err(Error::AlreadyGarbled);
        }
        let n = self.inner.output_wire_indices().len();
        check_len(&all_output_keys, 2 * n * self.mes.cipher_size())?;
        self.output_layer = IdentityLayer::with_gates(n)?;
        self.pinned_output_keys = Some(all_output_keys);
        debug!(gates = n, "pinned output keys");
        Ok(())
    }

    /// Builds the identity tables on top of a fresh inner garbling.
    fn finish_garbling(
        &mut self,
        inner: CircuitCreationValues,
        seeded: bool,
    ) -> Result<CircuitCreationValues, Error> {
        let cipher_size = self.mes.cipher_size();
        let key_size = self.inner.key_size();
        let mut permutation = if seeded {
            RowPermutation::Seeded(&mut self.prg)
        } else {
            RowPermutation::Random
        };
        self.input_tables = match (self.input_layer.gates(), &self.pinned_input_keys) {
            (Some(gates), Some(pinned)) => Some(garble_layer(
                gates,
                &mut self.mes,
                &mut permutation,
                (pinned, cipher_size),
                (&inner.all_input_keys, key_size),
            )?),
            _ => None,
        };
        self.output_tables = match (self.output_layer.gates(), &self.pinned_output_keys) {
            (Some(gates), Some(pinned)) => Some(garble_layer(
                gates,
                &mut self.mes,
                &mut permutation,
                (&inner.all_output_keys, key_size),
                (pinned, cipher_size),
            )?),
            _ => None,
        };
        self.garbled = true;
        debug!(
            input_gates = self.input_tables.as_ref().map_or(0, GarbledTables::len),
            output_gates = self.output_tables.as_ref().map_or(0, GarbledTables::len),
            "garbled identity layers"
        );
        Ok(CircuitCreationValues {
            all_input_keys: self.pinned_input_keys.clone().unwrap_or(inner.all_input_keys),
            all_output_keys: self.pinned_output_keys.clone().unwrap_or(inner.all_output_keys),
            translation_table: inner.translation_table,
        })
    }

    /// Verifies the input layer, the inner circuit and the output layer, in
    /// that order, and returns the output keys recovered along the way.
    fn verify_circuit_return_outputs(&mut self, all_input_keys: &[u8]) -> Option<VerifiedOutputs> {
        let cipher_size = self.mes.cipher_size();
        let key_size = self.inner.key_size();
        let input = active_layer(&self.input_layer, self.input_tables.as_ref()).ok()?;
        let inner_inputs = match input {
            Some(layer) => verify_layer(layer, &mut self.mes, (all_input_keys, cipher_size), key_size)?,
            None => all_input_keys.to_vec(),
        };
        let inner = self.inner.internal_verify(&inner_inputs)?;
        let output = active_layer(&self.output_layer, self.output_tables.as_ref()).ok()?;
        let extended = match output {
            Some(layer) => verify_layer(layer, &mut self.mes, (&inner, key_size), cipher_size)?,
            None => inner.clone(),
        };
        Some(VerifiedOutputs { inner, extended })
    }

    /// Like [`verify`](GarbledBooleanCircuit::verify), and additionally checks
    /// that the output keys of the circuit are exactly `all_output_keys`.
    pub fn verify_with_outputs(&mut self, all_input_keys: &[u8], all_output_keys: &[u8]) -> bool {
        let Some(outputs) = self.verify_circuit_return_outputs(all_input_keys) else {
            return false;
        };
        if !ct_eq(&outputs.extended, all_output_keys) {
            debug!("output keys differ from the expected keys");
            return false;
        }
        self.inner.verify_translation_table(&outputs.inner)
    }

    /// Digest of the inner garbled tables (in gate order, gates without a
    /// table skipped) followed by the translation table.
    pub fn hashed_circuit<H: CryptographicHash + ?Sized>(&self, hash: &mut H) -> Vec<u8> {
        for table in self.inner.garbled_tables().iter().flatten() {
            hash.update(table);
        }
        hash.update(self.inner.translation_table());
        hash.finalize_reset()
    }

    /// Checks the garbled tables and translation table against a digest
    /// produced by [`hashed_circuit`](Self::hashed_circuit).
    pub fn verify_hashed_circuit<H: CryptographicHash + ?Sized>(
        &self,
        hash: &mut H,
        hashed_circuit: &[u8],
    ) -> bool {
        ct_eq(&self.hashed_circuit(hash), hashed_circuit)
    }

    /// Checks that garbling with `seed` yields the circuit committed to by
    /// `hashed_circuit`.
    ///
    /// If the circuit is not garbled yet, the given keys are pinned and the
    /// circuit is garbled with `seed` first.
    #[instrument(level = Level::DEBUG, skip_all, err)]
    pub fn verify_hashed<H: CryptographicHash + ?Sized>(
        &mut self,
        seed: &[u8],
        all_input_keys: Option<&[u8]>,
        all_output_keys: Option<&[u8]>,
        hash: &mut H,
        hashed_circuit: &[u8],
    ) -> Result<bool, Error> {
        if !self.garbled {
            if let Some(keys) = all_input_keys {
                self.set_input_keys(keys.to_vec())?;
            }
            if let Some(keys) = all_output_keys {
                self.set_output_keys(keys.to_vec())?;
            }
            self.garble_with_seed(seed)?;
        }
        Ok(self.verify_hashed_circuit(hash, hashed_circuit))
    }
}

impl<C: InnerCircuit, M: MultiKeyEncryptionScheme, P: PseudorandomGenerator> GarbledBooleanCircuit
    for ExtendedGarbledCircuit<C, M, P>
{
    type Output = ExtendedOutput;
    type Tables = ExtendedGarbledTables;

    #[instrument(level = Level::DEBUG, skip_all, err)]
    fn garble(&mut self) -> Result<CircuitCreationValues, Error> {
        let inner = self.inner.garble()?;
        self.finish_garbling(inner, false)
    }

    #[instrument(level = Level::DEBUG, skip_all, err)]
    fn garble_with_seed(&mut self, seed: &[u8]) -> Result<CircuitCreationValues, Error> {
        self.prg.set_key(seed).map_err(Error::InvalidSeed)?;
        let mut seeds = vec![0; 2 * seed.len()];
        self.prg.get_bytes(&mut seeds)?;
        let (inner_seed, row_seed) = seeds.split_at(seed.len());
        let inner = self.inner.garble_with_seed(inner_seed)?;
        self.prg.set_key(row_seed).map_err(Error::InvalidSeed)?;
        self.finish_garbling(inner, true)
    }

    fn garbled_input_from_ungarbled_input(
        &self,
        ungarbled_bits: &[u8],
        all_input_keys: &[u8],
        party_number: usize,
    ) -> Result<Vec<u8>, Error> {
        let inputs = self.inner.input_wire_indices();
        let positions = self
            .inner
            .party_input_wire_indices(party_number)?
            .iter()
            .map(|wire| {
                inputs
                    .iter()
                    .position(|w| w == wire)
                    .ok_or(Error::NoSuchParty(party_number))
            })
            .collect::<Result<Vec<_>, _>>()?;
        select_input_keys(
            ungarbled_bits,
            all_input_keys,
            &positions,
            inputs.len(),
            self.input_key_size(),
        )
    }

    fn compute(&mut self, garbled_inputs: &[u8]) -> Result<ExtendedOutput, Error> {
        if !self.garbled {
            return Err(Error::NotGarbled);
        }
        let cipher_size = self.mes.cipher_size();
        let key_size = self.inner.key_size();
        let expected = self.inner.input_wire_indices().len() * self.input_key_size();
        if garbled_inputs.len() != expected {
            return Err(Error::NotAllInputsSet {
                expected,
                actual: garbled_inputs.len(),
            });
        }
        let inner_inputs = match active_layer(&self.input_layer, self.input_tables.as_ref())? {
            Some(layer) => compute_layer(layer, &mut self.mes, (garbled_inputs, cipher_size), key_size)?,
            None => garbled_inputs.to_vec(),
        };
        let inner = self.inner.compute(&inner_inputs)?;
        let garbled = match active_layer(&self.output_layer, self.output_tables.as_ref())? {
            Some(layer) => compute_layer(layer, &mut self.mes, (&inner, key_size), cipher_size)?,
            None => inner.clone(),
        };
        Ok(ExtendedOutput { garbled, inner })
    }

    /// Also checks the recovered output keys against the pinned output keys, if
    /// this instance knows them.
    fn verify(&mut self, all_input_keys: &[u8]) -> bool {
        let Some(outputs) = self.verify_circuit_return_outputs(all_input_keys) else {
            return false;
        };
        if let Some(pinned) = &self.pinned_output_keys {
            if !ct_eq(&outputs.extended, pinned) {
                debug!("output identity gates do not lead to the pinned keys");
                return false;
            }
        }
        self.inner.verify_translation_table(&outputs.inner)
    }

    fn internal_verify(&mut self, all_input_keys: &[u8]) -> Option<Vec<u8>> {
        self.verify_circuit_return_outputs(all_input_keys)
            .map(|outputs| outputs.extended)
    }

    fn verify_translation_table(&self, all_output_keys: &[u8]) -> bool {
        self.inner.verify_translation_table(all_output_keys)
    }

    fn translate(&self, garbled_output: &ExtendedOutput) -> Result<Vec<u8>, Error> {
        self.inner.translate(&garbled_output.inner)
    }

    fn verified_translate(
        &self,
        garbled_output: &ExtendedOutput,
        all_output_keys: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let n = self.inner.output_wire_indices().len();
        let key_size = self.output_key_size();
        check_len(&garbled_output.garbled, n * key_size)?;
        check_len(all_output_keys, 2 * n * key_size)?;
        for wire in 0..n {
            let key = single_key(&garbled_output.garbled, wire, key_size);
            if !ct_eq(key, key_of(all_output_keys, wire, 0, key_size))
                && !ct_eq(key, key_of(all_output_keys, wire, 1, key_size))
            {
                return Err(Error::CheatAttempt { wire });
            }
        }
        self.translate(garbled_output)
    }

    fn garbled_tables(&self) -> ExtendedGarbledTables {
        ExtendedGarbledTables {
            inner: self.inner.garbled_tables(),
            input: self.input_tables.clone(),
            output: self.output_tables.clone(),
        }
    }

    #[instrument(level = Level::DEBUG, skip_all, err)]
    fn set_garbled_tables(&mut self, tables: ExtendedGarbledTables) -> Result<(), Error> {
        let n_inputs = self.inner.input_wire_indices().len();
        let n_outputs = self.inner.output_wire_indices().len();
        if tables.input.as_ref().is_some_and(|t| t.len() != n_inputs) {
            return Err(Error::TablesMismatch("one input identity table per input wire is required"));
        }
        if tables.output.as_ref().is_some_and(|t| t.len() != n_outputs) {
            return Err(Error::TablesMismatch("one output identity table per output wire is required"));
        }
        self.inner.set_garbled_tables(tables.inner)?;
        self.input_layer = match tables.input {
            Some(_) => IdentityLayer::with_gates(n_inputs)?,
            None => {
                self.pinned_input_keys = None;
                IdentityLayer::Absent
            }
        };
        self.output_layer = match tables.output {
            Some(_) => IdentityLayer::with_gates(n_outputs)?,
            None => {
                self.pinned_output_keys = None;
                IdentityLayer::Absent
            }
        };
        self.input_tables = tables.input;
        self.output_tables = tables.output;
        self.garbled = true;
        Ok(())
    }

    fn translation_table(&self) -> &[u8] {
        self.inner.translation_table()
    }

    fn set_translation_table(&mut self, translation_table: Vec<u8>) {
        self.inner.set_translation_table(translation_table);
    }

    fn input_wire_indices(&self) -> &[usize] {
        self.inner.input_wire_indices()
    }

    fn output_wire_indices(&self) -> &[usize] {
        self.inner.output_wire_indices()
    }

    fn party_input_wire_indices(&self, party_number: usize) -> Result<&[usize], Error> {
        self.inner.party_input_wire_indices(party_number)
    }

    fn number_of_parties(&self) -> usize {
        self.inner.number_of_parties()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        circuit::{BooleanCircuit, Gate},
        free_xor::FreeXorCircuit,
        hash::Blake3Hash,
        mes::AesMultiKeyEncryption,
    };

    fn and_gate() -> BooleanCircuit {
        BooleanCircuit {
            input_gates: vec![1, 1],
            gates: vec![Gate::And(0, 1)],
            output_gates: vec![2],
        }
    }

    fn extended() -> ExtendedGarbledCircuit<FreeXorCircuit, AesMultiKeyEncryption> {
        let inner = FreeXorCircuit::new(and_gate()).unwrap();
        ExtendedGarbledCircuit::new(inner, AesMultiKeyEncryption::new()).unwrap()
    }

    fn pinned(n: usize, tag: u8) -> Vec<u8> {
        (0..2 * n).flat_map(|k| [tag + k as u8; 16]).collect()
    }

    #[test]
    fn transparent_without_pinned_keys() {
        let mut circuit = extended();
        let keys = circuit.garble().unwrap();
        let tables = circuit.garbled_tables();
        assert!(tables.input.is_none() && tables.output.is_none());
        assert_eq!(16, circuit.input_key_size());
        let input = [
            circuit.garbled_input_from_ungarbled_input(&[1], &keys.all_input_keys, 1).unwrap(),
            circuit.garbled_input_from_ungarbled_input(&[1], &keys.all_input_keys, 2).unwrap(),
        ]
        .concat();
        let output = circuit.compute(&input).unwrap();
        assert_eq!(output.garbled, output.inner);
        assert_eq!(vec![1], circuit.verified_translate(&output, &keys.all_output_keys).unwrap());
        assert!(circuit.verify(&keys.all_input_keys));
        assert!(circuit.verify_with_outputs(&keys.all_input_keys, &keys.all_output_keys));
    }

    #[test]
    fn pinned_keys_are_reported() {
        let mut circuit = extended();
        circuit.set_input_keys(pinned(2, 0x10)).unwrap();
        circuit.set_output_keys(pinned(1, 0x40)).unwrap();
        let keys = circuit.garble().unwrap();
        assert_eq!(pinned(2, 0x10), keys.all_input_keys);
        assert_eq!(pinned(1, 0x40), keys.all_output_keys);
        assert_eq!(Some(pinned(1, 0x40)), circuit.internal_verify(&keys.all_input_keys));
        assert!(matches!(
            circuit.set_input_keys(pinned(2, 0x10)),
            Err(Error::AlreadyGarbled)
        ));
    }

    #[test]
    fn pinned_keys_need_the_cipher_size() {
        let mut circuit = extended();
        assert!(matches!(
            circuit.set_input_keys(vec![0; 48]),
            Err(Error::WrongKeySize {
                expected: 64,
                actual: 48
            })
        ));
    }

    #[test]
    fn compute_before_garbling_fails() {
        let mut circuit = extended();
        assert!(matches!(circuit.compute(&[0; 32]), Err(Error::NotGarbled)));
    }

    #[test]
    fn pinning_does_not_change_the_inner_garbling() {
        let seed = [42; 16];
        let mut plain = extended();
        plain.garble_with_seed(&seed).unwrap();
        let mut pinned_circuit = extended();
        pinned_circuit.set_input_keys(pinned(2, 0x10)).unwrap();
        pinned_circuit.garble_with_seed(&seed).unwrap();
        assert_eq!(plain.garbled_tables().inner, pinned_circuit.garbled_tables().inner);
        assert_eq!(plain.translation_table(), pinned_circuit.translation_table());
    }

    #[test]
    fn hash_commitment() {
        let seed = [9; 16];
        let mut garbler = extended();
        garbler.garble_with_seed(&seed).unwrap();
        let digest = garbler.hashed_circuit(&mut Blake3Hash::new());
        assert!(garbler.verify_hashed_circuit(&mut Blake3Hash::new(), &digest));

        let mut verifier = extended();
        assert!(verifier
            .verify_hashed(&seed, None, None, &mut Blake3Hash::new(), &digest)
            .unwrap());
        let mut other = extended();
        assert!(!other
            .verify_hashed(&[10; 16], None, None, &mut Blake3Hash::new(), &digest)
            .unwrap());
    }

    #[test]
    fn identity_table_shape_is_checked() {
        let mut circuit = extended();
        let tables = ExtendedGarbledTables {
            inner: GarbledTables::from(vec![Some(vec![0; 64])]),
            input: Some(GarbledTables::from(vec![Some(vec![0; 64])])),
            output: None,
        };
        assert!(matches!(
            circuit.set_garbled_tables(tables),
            Err(Error::TablesMismatch(_))
        ));
    }

    #[test]
    fn inner_keys_must_fit_the_cipher() {
        let inner = FreeXorCircuit::new(and_gate()).unwrap();
        let result = ExtendedGarbledCircuit::new(inner, crate::mes::Blake3MultiKeyEncryption::new(8));
        assert!(matches!(
            result,
            Err(Error::KeySizeMismatch {
                inner: 16,
                cipher: 8
            })
        ));
    }
}
