//! Garbled boolean circuits with caller-chosen boundary keys, seeded garbling and
//! verification for cut-and-choose protocols.
//!
//! The crate is structured around the [`garble::GarbledBooleanCircuit`] contract:
//!
//! * [`free_xor::FreeXorCircuit`]: an inner circuit that garbles the gates of a
//!   [`circuit::BooleanCircuit`] (free XOR, point-and-permute).
//! * [`extended::ExtendedGarbledCircuit`]: wraps an inner circuit and, if keys
//!   are pinned for the input or output wires, bridges them to the inner keys
//!   with a layer of identity gates encrypted by a
//!   [`mes::MultiKeyEncryptionScheme`].
//!
//! ## Basic Usage
//!
//! 1. Build a [`circuit::BooleanCircuit`] and wrap it in a
//!    [`free_xor::FreeXorCircuit`] and an [`extended::ExtendedGarbledCircuit`].
//! 2. Optionally pin input and output keys.
//! 3. Garble with fresh randomness or from a seed.
//! 4. Send the garbled tables (see [`data_types::ExtendedGarbledTables`]) and the
//!    keys matching the inputs to the evaluator.
//! 5. The evaluator computes and translates the garbled output.
//!
//! ## Example
//!
//! ```
//! use polygarble::{
//!     circuit::{BooleanCircuit, Gate},
//!     extended::ExtendedGarbledCircuit,
//!     free_xor::FreeXorCircuit,
//!     garble::GarbledBooleanCircuit,
//!     mes::AesMultiKeyEncryption,
//! };
//!
//! # fn main() -> Result<(), polygarble::garble::Error> {
//! let and = BooleanCircuit {
//!     input_gates: vec![1, 1],
//!     gates: vec![Gate::And(0, 1)],
//!     output_gates: vec![2],
//! };
//! let inner = FreeXorCircuit::new(and)?;
//! let mut circuit = ExtendedGarbledCircuit::new(inner, AesMultiKeyEncryption::new())?;
//! let keys = circuit.garble()?;
//!
//! let mut input = circuit.garbled_input_from_ungarbled_input(&[1], &keys.all_input_keys, 1)?;
//! input.extend(circuit.garbled_input_from_ungarbled_input(&[1], &keys.all_input_keys, 2)?);
//! let output = circuit.compute(&input)?;
//! assert_eq!(vec![1], circuit.verified_translate(&output, &keys.all_output_keys)?);
//! assert!(circuit.verify(&keys.all_input_keys));
//! # Ok(())
//! # }
//! ```
//!
//! ## Security Properties
//!
//! Verification failures are reported as `false` (or `None`), never as errors,
//! so that a cut-and-choose verifier can branch on them. Keys are compared in
//! constant time.
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod block;
pub mod circuit;
pub mod data_types;
pub mod extended;
pub mod free_xor;
pub mod garble;
pub mod hash;
pub mod mes;
pub mod prg;

mod crypto;
mod identity_gate;
mod utils;

pub use crypto::AesRng;
