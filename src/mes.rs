//! Multi-key encryption schemes used to garble identity gates.
//!
//! A scheme is keyed with a [`MultiKey`] (one or more wire keys) and a 16 byte
//! [`Tweak`]; it then encrypts and decrypts blocks of exactly
//! [`MultiKeyEncryptionScheme::cipher_size`] bytes. Plaintexts shorter than the
//! cipher size are zero padded, so keys of a smaller key domain can be carried
//! through a scheme with larger blocks.
//!
//! Both schemes shipped here permute whole blocks, so two ciphertexts under the
//! same key and tweak reveal nothing about the relation of their plaintexts.
use aes::{
    Aes128,
    cipher::{BlockCipherDecrypt, BlockCipherEncrypt, KeyInit},
};
use thiserror::Error;

use crate::{block::Block, crypto::FIXED_KEY_HASH, utils::xor_inplace};

/// Errors raised by a [`MultiKeyEncryptionScheme`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The scheme was used before [`MultiKeyEncryptionScheme::set_key`].
    #[error("no key was set for the encryption scheme")]
    KeyNotSet,
    /// The scheme was used before [`MultiKeyEncryptionScheme::set_tweak`].
    #[error("no tweak was set for the encryption scheme")]
    TweakNotSet,
    /// A key does not have a length accepted by the scheme.
    #[error("invalid key length {0}")]
    InvalidKeyLength(usize),
    /// A multi-key must consist of at least one key.
    #[error("a multi-key needs at least one key")]
    EmptyMultiKey,
    /// The cipher size is too small for the scheme.
    #[error("invalid cipher size {0}")]
    InvalidCipherSize(usize),
    /// The plaintext is longer than a cipher block.
    #[error("plaintext of {actual} bytes exceeds the cipher size of {max} bytes")]
    PlaintextTooLong {
        /// The cipher size of the scheme.
        max: usize,
        /// The length of the plaintext.
        actual: usize,
    },
    /// The ciphertext is not exactly one cipher block long.
    #[error("ciphertext of {actual} bytes, expected {expected} bytes")]
    InvalidCiphertextLength {
        /// The cipher size of the scheme.
        expected: usize,
        /// The length of the ciphertext.
        actual: usize,
    },
}

/// The tweak of a gate, used for domain separation between gates.
///
/// The gate index is encoded as a 4 byte big-endian integer in the last four
/// bytes, the remaining bytes are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tweak([u8; 16]);

impl Tweak {
    /// The tweak of the gate with the given index.
    pub fn for_gate(gate: u32) -> Self {
        let mut tweak = [0; 16];
        tweak[12..].copy_from_slice(&gate.to_be_bytes());
        Tweak(tweak)
    }

    /// Bytes of the tweak.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

/// The set of keys a multi-key encryption encrypts under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiKey(Vec<Vec<u8>>);

impl MultiKey {
    /// The individual keys.
    pub fn keys(&self) -> &[Vec<u8>] {
        &self.0
    }
}

/// A symmetric encryption scheme keyed by several keys at once.
pub trait MultiKeyEncryptionScheme {
    /// Length of every ciphertext (and of the padded plaintext), in bytes.
    fn cipher_size(&self) -> usize;

    /// Combines the given keys into a [`MultiKey`], validating their lengths.
    fn generate_multi_key(&self, keys: &[&[u8]]) -> Result<MultiKey, Error>;

    /// Sets the key used by [`encrypt`](Self::encrypt) and [`decrypt`](Self::decrypt).
    fn set_key(&mut self, key: MultiKey);

    /// Sets the tweak used by [`encrypt`](Self::encrypt) and [`decrypt`](Self::decrypt).
    fn set_tweak(&mut self, tweak: Tweak);

    /// Encrypts a plaintext of at most `cipher_size` bytes into exactly
    /// `cipher_size` bytes.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, Error>;

    /// Decrypts a ciphertext of exactly `cipher_size` bytes.
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, Error>;
}

/// Zero pads `plaintext` to a full block of `cipher_size` bytes.
fn padded_block(cipher_size: usize, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
    if plaintext.len() > cipher_size {
        return Err(Error::PlaintextTooLong {
            max: cipher_size,
            actual: plaintext.len(),
        });
    }
    let mut block = vec![0; cipher_size];
    block[..plaintext.len()].copy_from_slice(plaintext);
    Ok(block)
}

fn check_ciphertext(cipher_size: usize, ciphertext: &[u8]) -> Result<(), Error> {
    if ciphertext.len() != cipher_size {
        return Err(Error::InvalidCiphertextLength {
            expected: cipher_size,
            actual: ciphertext.len(),
        });
    }
    Ok(())
}

/// Multi-key encryption of 16 byte blocks with AES-128.
///
/// The AES key is `H(tweak, k_1) ^ … ^ H(tweak, k_n)` where `H` is the tweakable
/// circular correlation robust hash, so every (keys, tweak) pair selects an
/// independent permutation.
#[derive(Debug, Clone, Default)]
pub struct AesMultiKeyEncryption {
    keys: Option<Vec<Block>>,
    tweak: Option<Tweak>,
}

impl AesMultiKeyEncryption {
    /// Creates an unkeyed scheme.
    pub fn new() -> Self {
        Self::default()
    }

    fn cipher(&self) -> Result<Aes128, Error> {
        let keys = self.keys.as_ref().ok_or(Error::KeyNotSet)?;
        let tweak = self.tweak.ok_or(Error::TweakNotSet)?;
        let tweak = Block::new(*tweak.as_bytes());
        let key = keys.iter().fold(Block::ZERO, |acc, key| {
            acc ^ FIXED_KEY_HASH.tccr_hash_block(tweak, *key)
        });
        Ok(Aes128::new(&key.into()))
    }
}

impl MultiKeyEncryptionScheme for AesMultiKeyEncryption {
    fn cipher_size(&self) -> usize {
        Block::BYTES
    }

    fn generate_multi_key(&self, keys: &[&[u8]]) -> Result<MultiKey, Error> {
        if keys.is_empty() {
            return Err(Error::EmptyMultiKey);
        }
        for key in keys {
            if key.len() != Block::BYTES {
                return Err(Error::InvalidKeyLength(key.len()));
            }
        }
        Ok(MultiKey(keys.iter().map(|k| k.to_vec()).collect()))
    }

    fn set_key(&mut self, key: MultiKey) {
        // lengths were checked by generate_multi_key
        let blocks = key
            .0
            .iter()
            .filter_map(|k| Block::try_from(k.as_slice()).ok())
            .collect();
        self.keys = Some(blocks);
    }

    fn set_tweak(&mut self, tweak: Tweak) {
        self.tweak = Some(tweak);
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let cipher = self.cipher()?;
        let padded = padded_block(Block::BYTES, plaintext)?;
        let mut bytes = [0; Block::BYTES];
        bytes.copy_from_slice(&padded);
        let mut block = Block::new(bytes).into();
        cipher.encrypt_block(&mut block);
        Ok(Block::from(block).as_bytes().to_vec())
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
        check_ciphertext(Block::BYTES, ciphertext)?;
        let cipher = self.cipher()?;
        let mut block = Block::try_from(ciphertext)
            .map_err(|_| Error::InvalidCiphertextLength {
                expected: Block::BYTES,
                actual: ciphertext.len(),
            })?
            .into();
        cipher.decrypt_block(&mut block);
        Ok(Block::from(block).as_bytes().to_vec())
    }
}

/// Multi-key encryption with a configurable cipher size, using BLAKE3.
///
/// Blocks are permuted by a balanced Feistel network with
/// [`FEISTEL_ROUNDS`](Self::FEISTEL_ROUNDS) rounds. Each round function is the
/// keyed BLAKE3 XOF under a round key derived from the (length prefixed) keys
/// followed by the tweak. Keys of any non-zero length are accepted, the cipher
/// size must be at least 2 bytes.
#[derive(Debug, Clone)]
pub struct Blake3MultiKeyEncryption {
    cipher_size: usize,
    keys: Option<MultiKey>,
    tweak: Option<Tweak>,
}

impl Blake3MultiKeyEncryption {
    const CONTEXT: &'static str = "polygarble 2024 multi-key encryption";

    /// Number of Feistel rounds applied to every block.
    pub const FEISTEL_ROUNDS: u8 = 4;

    /// Creates an unkeyed scheme producing ciphertexts of `cipher_size` bytes.
    pub fn new(cipher_size: usize) -> Self {
        Self {
            cipher_size,
            keys: None,
            tweak: None,
        }
    }

    fn round_key(&self) -> Result<[u8; blake3::KEY_LEN], Error> {
        if self.cipher_size < 2 {
            return Err(Error::InvalidCipherSize(self.cipher_size));
        }
        let MultiKey(keys) = self.keys.as_ref().ok_or(Error::KeyNotSet)?;
        let tweak = self.tweak.ok_or(Error::TweakNotSet)?;
        let mut hasher = blake3::Hasher::new_derive_key(Self::CONTEXT);
        for key in keys {
            hasher.update(&(key.len() as u64).to_le_bytes());
            hasher.update(key);
        }
        hasher.update(tweak.as_bytes());
        Ok(*hasher.finalize().as_bytes())
    }

    /// Even rounds mask the left half with `F(right)`, odd rounds the right
    /// half with `F(left)`. Every round is its own inverse.
    fn feistel_round(round_key: &[u8; blake3::KEY_LEN], round: u8, block: &mut [u8]) {
        let (left, right) = block.split_at_mut(block.len() / 2);
        let (target, source) = if round % 2 == 0 {
            (left, &*right)
        } else {
            (right, &*left)
        };
        let mut mask = vec![0; target.len()];
        blake3::Hasher::new_keyed(round_key)
            .update(&[round])
            .update(source)
            .finalize_xof()
            .fill(&mut mask);
        xor_inplace(target, &mask);
    }
}

impl MultiKeyEncryptionScheme for Blake3MultiKeyEncryption {
    fn cipher_size(&self) -> usize {
        self.cipher_size
    }

    fn generate_multi_key(&self, keys: &[&[u8]]) -> Result<MultiKey, Error> {
        if keys.is_empty() {
            return Err(Error::EmptyMultiKey);
        }
        if let Some(key) = keys.iter().find(|k| k.is_empty()) {
            return Err(Error::InvalidKeyLength(key.len()));
        }
        Ok(MultiKey(keys.iter().map(|k| k.to_vec()).collect()))
    }

    fn set_key(&mut self, key: MultiKey) {
        self.keys = Some(key);
    }

    fn set_tweak(&mut self, tweak: Tweak) {
        self.tweak = Some(tweak);
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let mut block = padded_block(self.cipher_size, plaintext)?;
        let round_key = self.round_key()?;
        for round in 0..Self::FEISTEL_ROUNDS {
            Self::feistel_round(&round_key, round, &mut block);
        }
        Ok(block)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
        check_ciphertext(self.cipher_size, ciphertext)?;
        let round_key = self.round_key()?;
        let mut block = ciphertext.to_vec();
        for round in (0..Self::FEISTEL_ROUNDS).rev() {
            Self::feistel_round(&round_key, round, &mut block);
        }
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed<M: MultiKeyEncryptionScheme>(mut mes: M, key: &[u8], gate: u32) -> M {
        let key = mes.generate_multi_key(&[key]).unwrap();
        mes.set_key(key);
        mes.set_tweak(Tweak::for_gate(gate));
        mes
    }

    #[test]
    fn tweak_layout() {
        let tweak = Tweak::for_gate(0x0102_0304);
        assert_eq!(
            &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4],
            tweak.as_bytes()
        );
    }

    #[test]
    fn unkeyed_scheme_fails_loudly() {
        let mut mes = AesMultiKeyEncryption::new();
        assert_eq!(Err(Error::KeyNotSet), mes.encrypt(&[0; 16]));
        let key = mes.generate_multi_key(&[&[1; 16]]).unwrap();
        mes.set_key(key);
        assert_eq!(Err(Error::TweakNotSet), mes.encrypt(&[0; 16]));

        let mes = Blake3MultiKeyEncryption::new(32);
        assert_eq!(Err(Error::KeyNotSet), mes.decrypt(&[0; 32]));
    }

    #[test]
    fn aes_rejects_wrong_key_length() {
        let mes = AesMultiKeyEncryption::new();
        assert_eq!(
            Err(Error::InvalidKeyLength(15)),
            mes.generate_multi_key(&[&[0; 15]])
        );
        assert_eq!(Err(Error::EmptyMultiKey), mes.generate_multi_key(&[]));
    }

    #[test]
    fn decrypt_inverts_encrypt() {
        let plaintext = [0x42; 16];
        let aes = keyed(AesMultiKeyEncryption::new(), &[7; 16], 3);
        let ciphertext = aes.encrypt(&plaintext).unwrap();
        assert_ne!(plaintext.to_vec(), ciphertext);
        assert_eq!(plaintext.to_vec(), aes.decrypt(&ciphertext).unwrap());

        let blake = keyed(Blake3MultiKeyEncryption::new(32), &[7; 16], 3);
        let ciphertext = blake.encrypt(&plaintext).unwrap();
        assert_eq!(32, ciphertext.len());
        let decrypted = blake.decrypt(&ciphertext).unwrap();
        assert_eq!(&plaintext[..], &decrypted[..16]);
        assert_eq!(&[0; 16][..], &decrypted[16..]);
    }

    #[test]
    fn wrong_key_or_tweak_garbles_plaintext() {
        let zeros = [0; 16];
        let ciphertext = keyed(AesMultiKeyEncryption::new(), &[1; 16], 0)
            .encrypt(&zeros)
            .unwrap();
        let other_key = keyed(AesMultiKeyEncryption::new(), &[2; 16], 0);
        assert_ne!(zeros.to_vec(), other_key.decrypt(&ciphertext).unwrap());
        let other_tweak = keyed(AesMultiKeyEncryption::new(), &[1; 16], 1);
        assert_ne!(zeros.to_vec(), other_tweak.decrypt(&ciphertext).unwrap());
    }

    #[test]
    fn size_checks() {
        let blake = keyed(Blake3MultiKeyEncryption::new(16), &[1; 4], 0);
        assert_eq!(
            Err(Error::PlaintextTooLong {
                max: 16,
                actual: 17
            }),
            blake.encrypt(&[0; 17])
        );
        assert_eq!(
            Err(Error::InvalidCiphertextLength {
                expected: 16,
                actual: 15
            }),
            blake.decrypt(&[0; 15])
        );
    }

    #[test]
    fn ciphertexts_under_one_key_are_unrelated() {
        fn check<M: MultiKeyEncryptionScheme>(mes: M) {
            let size = mes.cipher_size();
            let key: Vec<u8> = (0..size as u8).collect();
            let zero = mes.encrypt(&vec![0; size]).unwrap();
            let payload = mes.encrypt(&key).unwrap();
            let mut xored = zero.clone();
            xor_inplace(&mut xored, &payload);
            assert_ne!(key, xored);

            // a single flipped plaintext bit spreads over the block
            let mut flipped = vec![0; size];
            flipped[0] = 1;
            let flipped = mes.encrypt(&flipped).unwrap();
            let changed = zero.iter().zip(&flipped).filter(|(a, b)| a != b).count();
            assert!(changed > 1);
        }
        check(keyed(AesMultiKeyEncryption::new(), &[7; 16], 3));
        check(keyed(Blake3MultiKeyEncryption::new(32), &[7; 16], 3));
        check(keyed(Blake3MultiKeyEncryption::new(17), &[7; 16], 3));
    }

    #[test]
    fn odd_cipher_size_round_trips() {
        let blake = keyed(Blake3MultiKeyEncryption::new(17), &[5; 3], 9);
        let plaintext = [0x42; 17];
        let ciphertext = blake.encrypt(&plaintext).unwrap();
        assert_ne!(plaintext.to_vec(), ciphertext);
        assert_eq!(plaintext.to_vec(), blake.decrypt(&ciphertext).unwrap());
    }

    #[test]
    fn one_byte_blocks_are_rejected() {
        let blake = keyed(Blake3MultiKeyEncryption::new(1), &[5; 1], 0);
        assert_eq!(Err(Error::InvalidCipherSize(1)), blake.encrypt(&[0]));
    }
}
