//! Identity gates, which translate between two independent key domains.
//!
//! An identity gate has one input and one output wire. Its table consists of two
//! rows, each `Enc(output key) ‖ Enc(0…0)` under the matching input key; the
//! all-zero sentinel tells the evaluator which row its key opens. The row order
//! is randomized so that the row index does not leak the plaintext bit.
use tracing::debug;

use crate::{
    garble::Error,
    mes::{self, MultiKeyEncryptionScheme, Tweak},
    prg::PseudorandomGenerator,
    utils::is_zero,
};

/// Source of the row permutation bits of identity gates.
pub(crate) enum RowPermutation<'a, P> {
    /// Fresh randomness.
    Random,
    /// One byte of the PRG stream per gate, in gate order.
    Seeded(&'a mut P),
}

impl<P: PseudorandomGenerator> RowPermutation<'_, P> {
    /// The row holding the encryption for input key 0.
    fn next_position(&mut self) -> Result<usize, Error> {
        match self {
            RowPermutation::Random => Ok(usize::from(rand::random::<bool>())),
            RowPermutation::Seeded(prg) => {
                let mut byte = [0];
                prg.get_bytes(&mut byte)?;
                Ok(usize::from(byte[0] & 1))
            }
        }
    }
}

/// Present if keys were pinned on one side of an [`ExtendedGarbledCircuit`]
/// (or tables for that side were received), absent otherwise.
///
/// [`ExtendedGarbledCircuit`]: crate::extended::ExtendedGarbledCircuit
#[derive(Debug, Clone, Default)]
pub(crate) enum IdentityLayer {
    #[default]
    Absent,
    Present(Vec<IdentityGate>),
}

impl IdentityLayer {
    /// One gate per wire, numbered by wire position.
    pub(crate) fn with_gates(n: usize) -> Result<Self, Error> {
        let gates = (0..n)
            .map(|i| {
                u32::try_from(i)
                    .map(|index| IdentityGate { index })
                    .map_err(|_| Error::TablesMismatch("too many identity gates"))
            })
            .collect::<Result<_, _>>()?;
        Ok(IdentityLayer::Present(gates))
    }

    pub(crate) fn gates(&self) -> Option<&[IdentityGate]> {
        match self {
            IdentityLayer::Absent => None,
            IdentityLayer::Present(gates) => Some(gates),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IdentityGate {
    index: u32,
}

impl IdentityGate {
    fn use_key<M: MultiKeyEncryptionScheme>(&self, mes: &mut M, key: &[u8]) -> Result<(), mes::Error> {
        let multi_key = mes.generate_multi_key(&[key])?;
        mes.set_key(multi_key);
        mes.set_tweak(Tweak::for_gate(self.index));
        Ok(())
    }

    /// Encrypts `output_pair[i]` under `input_pair[i]` for both `i`.
    pub(crate) fn create_table<M: MultiKeyEncryptionScheme, P: PseudorandomGenerator>(
        &self,
        mes: &mut M,
        permutation: &mut RowPermutation<'_, P>,
        input_pair: [&[u8]; 2],
        output_pair: [&[u8]; 2],
    ) -> Result<Vec<u8>, Error> {
        let cipher_size = mes.cipher_size();
        let zeros = vec![0; cipher_size];
        let mut table = vec![0; 4 * cipher_size];
        let mut pos = permutation.next_position()?;
        for (input_key, output_key) in input_pair.into_iter().zip(output_pair) {
            self.use_key(mes, input_key)?;
            let row = &mut table[2 * pos * cipher_size..2 * (pos + 1) * cipher_size];
            for (dst, plaintext) in row.chunks_exact_mut(cipher_size).zip([output_key, zeros.as_slice()]) {
                let ciphertext = mes.encrypt(plaintext)?;
                if ciphertext.len() != cipher_size {
                    return Err(mes::Error::InvalidCiphertextLength {
                        expected: cipher_size,
                        actual: ciphertext.len(),
                    }
                    .into());
                }
                dst.copy_from_slice(&ciphertext);
            }
            pos = 1 - pos;
        }
        Ok(table)
    }

    /// The rows whose sentinel decrypts to zero under `key`.
    fn open_row<M: MultiKeyEncryptionScheme>(
        &self,
        mes: &mut M,
        table: &[u8],
        key: &[u8],
    ) -> Result<Vec<usize>, mes::Error> {
        let cipher_size = mes.cipher_size();
        self.use_key(mes, key)?;
        let mut rows = vec![];
        for (r, row) in table.chunks_exact(2 * cipher_size).enumerate() {
            if is_zero(&mes.decrypt(&row[cipher_size..])?) {
                rows.push(r);
            }
        }
        Ok(rows)
    }

    /// The output key of `row`, or `None` if the bytes padding it to the cipher
    /// size are not all zero.
    fn payload<M: MultiKeyEncryptionScheme>(
        mes: &M,
        table: &[u8],
        row: usize,
        out_key_size: usize,
    ) -> Result<Option<Vec<u8>>, mes::Error> {
        let cipher_size = mes.cipher_size();
        let start = 2 * row * cipher_size;
        let mut key = mes.decrypt(&table[start..start + cipher_size])?;
        if key.len() < out_key_size || !is_zero(&key[out_key_size..]) {
            return Ok(None);
        }
        key.truncate(out_key_size);
        Ok(Some(key))
    }

    /// Decrypts the output key matching `input_key`.
    pub(crate) fn compute<M: MultiKeyEncryptionScheme>(
        &self,
        mes: &mut M,
        table: &[u8],
        input_key: &[u8],
        out_key_size: usize,
    ) -> Result<Vec<u8>, Error> {
        if table.len() != 4 * mes.cipher_size() {
            return Err(Error::TablesMismatch("identity table has the wrong size"));
        }
        let invalid = Error::InvalidWireValue {
            gate: self.index as usize,
        };
        match self.open_row(mes, table, input_key)?.first() {
            Some(row) => Self::payload(mes, table, *row, out_key_size)?.ok_or(invalid),
            None => Err(invalid),
        }
    }

    /// Checks the table against both input keys and returns both output keys.
    pub(crate) fn verify<M: MultiKeyEncryptionScheme>(
        &self,
        gate_index: u32,
        mes: &mut M,
        table: &[u8],
        input_pair: [&[u8]; 2],
        out_key_size: usize,
    ) -> Option<[Vec<u8>; 2]> {
        if gate_index != self.index || table.len() != 4 * mes.cipher_size() {
            debug!(gate = self.index, gate_index, "identity table does not belong to this gate");
            return None;
        }
        let mut rows = [0; 2];
        for (row, key) in rows.iter_mut().zip(input_pair) {
            match self.open_row(mes, table, key) {
                Ok(opened) if opened.len() == 1 => *row = opened[0],
                Ok(opened) => {
                    debug!(gate = self.index, matches = opened.len(), "key must open exactly one row");
                    return None;
                }
                Err(e) => {
                    debug!(gate = self.index, "identity gate cannot be keyed: {e}");
                    return None;
                }
            }
        }
        if rows[0] == rows[1] {
            debug!(gate = self.index, "both keys open the same row");
            return None;
        }
        // `open_row` left the scheme keyed with input key 1
        let k1 = Self::payload(mes, table, rows[1], out_key_size).ok()?;
        self.use_key(mes, input_pair[0]).ok()?;
        let k0 = Self::payload(mes, table, rows[0], out_key_size).ok()?;
        match (k0, k1) {
            (Some(k0), Some(k1)) => Some([k0, k1]),
            _ => {
                debug!(gate = self.index, "output key padding is not zero");
                None
            }
        }
    }
}
