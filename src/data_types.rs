//! Data types shared between the inner circuit, the identity gates and callers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// The keys and translation table produced by garbling a circuit.
///
/// Both key arrays hold both keys of every wire, in the order
/// `[k0, k1, k0, k1, …]` (key 0 of wire 0, key 1 of wire 0, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitCreationValues {
    /// Both keys of every input wire.
    pub all_input_keys: Vec<u8>,
    /// Both keys of every output wire.
    pub all_output_keys: Vec<u8>,
    /// One signal bit (0 or 1) per output wire.
    pub translation_table: Vec<u8>,
}

/// The garbled tables of a circuit, indexed by gate number.
///
/// Gates without a table (e.g. free XOR gates) hold `None`. The tables are
/// reference counted: cloning a `GarbledTables` is O(1) and shares the bytes,
/// which is how gates, circuits and the transport layer all refer to the same
/// tables without copying them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarbledTables(Arc<Vec<Option<Vec<u8>>>>);

impl GarbledTables {
    /// Number of gate slots (including gates without a table).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no gate slots at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The table of the given gate, if it has one.
    pub fn get(&self, gate: usize) -> Option<&[u8]> {
        self.0.get(gate).and_then(|t| t.as_deref())
    }

    /// All gate slots in gate order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&[u8]>> {
        self.0.iter().map(|t| t.as_deref())
    }

    /// Returns a copy of the tables in which the table of `gate` was changed
    /// by `f`. Only useful to simulate a corrupted transmission.
    pub fn modified(&self, gate: usize, f: impl FnOnce(&mut Vec<u8>)) -> Self {
        let mut tables = self.0.as_ref().clone();
        if let Some(Some(table)) = tables.get_mut(gate) {
            f(table);
        }
        GarbledTables(Arc::new(tables))
    }
}

impl From<Vec<Option<Vec<u8>>>> for GarbledTables {
    fn from(tables: Vec<Option<Vec<u8>>>) -> Self {
        GarbledTables(Arc::new(tables))
    }
}

impl FromIterator<Option<Vec<u8>>> for GarbledTables {
    fn from_iter<I: IntoIterator<Item = Option<Vec<u8>>>>(iter: I) -> Self {
        GarbledTables(Arc::new(iter.into_iter().collect()))
    }
}

/// The garbled tables of an [`ExtendedGarbledCircuit`].
///
/// Holds the tables of the inner circuit together with the tables of the input
/// and output identity gates. The identity tables are only present if keys were
/// pinned on the corresponding side.
///
/// [`ExtendedGarbledCircuit`]: crate::extended::ExtendedGarbledCircuit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedGarbledTables {
    /// Tables of the inner circuit.
    pub inner: GarbledTables,
    /// Tables of the input identity gates, one per input wire.
    pub input: Option<GarbledTables>,
    /// Tables of the output identity gates, one per output wire.
    pub output: Option<GarbledTables>,
}

impl ExtendedGarbledTables {
    /// Encodes the tables for transmission to another party.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decodes tables received from another party.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_tables() {
        let tables = GarbledTables::from(vec![None, Some(vec![1, 2, 3])]);
        let shared = tables.clone();
        assert!(Arc::ptr_eq(&tables.0, &shared.0));
        assert_eq!(None, shared.get(0));
        assert_eq!(Some(&[1, 2, 3][..]), shared.get(1));
        assert_eq!(None, shared.get(2));
    }

    #[test]
    fn modified_copies_on_write() {
        let tables = GarbledTables::from(vec![Some(vec![0, 0])]);
        let flipped = tables.modified(0, |t| t[1] ^= 1);
        assert_eq!(Some(&[0, 0][..]), tables.get(0));
        assert_eq!(Some(&[0, 1][..]), flipped.get(0));
    }

    #[test]
    fn extended_tables_survive_transport() {
        let tables = ExtendedGarbledTables {
            inner: GarbledTables::from(vec![None, Some(vec![9; 64])]),
            input: Some(GarbledTables::from(vec![Some(vec![1; 64])])),
            output: None,
        };
        let bytes = tables.to_bytes().unwrap();
        assert_eq!(tables, ExtendedGarbledTables::from_bytes(&bytes).unwrap());
    }
}
