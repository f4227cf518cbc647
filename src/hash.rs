//! The cryptographic hash used to commit to garbled circuits.

/// An incremental cryptographic hash function.
pub trait CryptographicHash {
    /// Size of the digest in bytes.
    fn hashed_msg_size(&self) -> usize;

    /// Absorbs `bytes`.
    fn update(&mut self, bytes: &[u8]);

    /// Returns the digest of everything absorbed so far and resets the state.
    fn finalize_reset(&mut self) -> Vec<u8>;
}

/// BLAKE3 with its default 32 byte output.
#[derive(Debug, Clone, Default)]
pub struct Blake3Hash {
    hasher: blake3::Hasher,
}

impl Blake3Hash {
    /// Creates a hash with an empty state.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CryptographicHash for Blake3Hash {
    fn hashed_msg_size(&self) -> usize {
        blake3::OUT_LEN
    }

    fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        let digest = self.hasher.finalize();
        self.hasher.reset();
        digest.as_bytes().to_vec()
    }
}
