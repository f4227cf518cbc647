//! Helpers for the flat key layout shared by all circuits.
//!
//! Arrays holding both keys of every wire are laid out as
//! `[k0, k1, k0, k1, …]`, so key `bit` of wire `wire` starts at
//! `wire * 2 * key_size + bit * key_size`. Arrays holding a single key per wire
//! are laid out as `[k, k, …]`.
use std::ops::BitXorAssign;

use subtle::ConstantTimeEq;

use crate::garble::Error;

pub(crate) fn xor_inplace<T: Copy + BitXorAssign>(a: &mut [T], b: &[T]) {
    a.iter_mut().zip(b).for_each(|(a, b)| {
        *a ^= *b;
    });
}

/// Key `bit` of wire `wire` in an array holding both keys of each wire.
pub(crate) fn key_of(all_keys: &[u8], wire: usize, bit: usize, key_size: usize) -> &[u8] {
    let start = (2 * wire + bit) * key_size;
    &all_keys[start..start + key_size]
}

/// Both keys of wire `wire` in an array holding both keys of each wire.
pub(crate) fn key_pair(all_keys: &[u8], wire: usize, key_size: usize) -> [&[u8]; 2] {
    [
        key_of(all_keys, wire, 0, key_size),
        key_of(all_keys, wire, 1, key_size),
    ]
}

/// The key of wire `wire` in an array holding a single key per wire.
pub(crate) fn single_key(keys: &[u8], wire: usize, key_size: usize) -> &[u8] {
    &keys[wire * key_size..(wire + 1) * key_size]
}

pub(crate) fn is_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0)
}

/// Constant time comparison of two byte strings (false if the lengths differ).
pub(crate) fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

pub(crate) fn check_len(bytes: &[u8], expected: usize) -> Result<(), Error> {
    if bytes.len() != expected {
        return Err(Error::WrongKeySize {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Looks up the key matching each plaintext bit of a party's input.
///
/// `positions` are the positions (within the circuit's input wires) of the
/// party's input wires, in order.
pub(crate) fn select_input_keys(
    ungarbled_bits: &[u8],
    all_input_keys: &[u8],
    positions: &[usize],
    n_inputs: usize,
    key_size: usize,
) -> Result<Vec<u8>, Error> {
    if ungarbled_bits.len() != positions.len() {
        return Err(Error::WrongInputSize {
            expected: positions.len(),
            actual: ungarbled_bits.len(),
        });
    }
    check_len(all_input_keys, 2 * n_inputs * key_size)?;
    let mut keys = Vec::with_capacity(positions.len() * key_size);
    for (bit, wire) in ungarbled_bits.iter().zip(positions) {
        keys.extend_from_slice(key_of(all_input_keys, *wire, usize::from(*bit != 0), key_size));
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout() {
        // two wires, key size 2: [w0k0, w0k1, w1k0, w1k1]
        let keys = [0, 0, 1, 1, 2, 2, 3, 3];
        assert_eq!(&[1, 1], key_of(&keys, 0, 1, 2));
        assert_eq!(&[2, 2], key_of(&keys, 1, 0, 2));
        assert_eq!([&[2, 2][..], &[3, 3][..]], key_pair(&keys, 1, 2));
        assert_eq!(&[3, 3], single_key(&[1, 1, 3, 3], 1, 2));
    }

    #[test]
    fn select_keys_by_bits() {
        let keys = [0, 1, 2, 3, 4, 5];
        let selected = select_input_keys(&[1, 0], &keys, &[1, 2], 3, 1).unwrap();
        assert_eq!(vec![3, 4], selected);
        assert!(matches!(
            select_input_keys(&[1], &keys, &[1, 2], 3, 1),
            Err(Error::WrongInputSize {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn constant_time_equality() {
        assert!(ct_eq(&[1, 2, 3], &[1, 2, 3]));
        assert!(!ct_eq(&[1, 2, 3], &[1, 2, 4]));
        assert!(!ct_eq(&[1, 2], &[1, 2, 3]));
        assert!(is_zero(&[0; 8]));
        assert!(!is_zero(&[0, 0, 1]));
    }
}
