//! RNG based on AES in CTR mode.
//!
//! Modeled after the `AesRng` of the
//! [scuttlebutt](https://github.com/GaloisInc/swanky/blob/4455754abadee07f168079ac45ef33535b0df27d/scuttlebutt/src/rand_aes.rs)
//! crate, but using the [aes](`aes`) crate. The keystream is `E_seed(0) ‖ E_seed(1) ‖ …`
//! with the counter encoded little endian, so the output only depends on the seed.
use aes::{
    Aes128,
    cipher::{BlockCipherEncrypt, KeyInit},
};
use rand::{CryptoRng, RngCore, SeedableRng};

use crate::block::Block;

/// A PRG using AES in counter mode.
#[derive(Clone)]
pub struct AesRng {
    aes: Aes128,
    counter: u128,
    buffer: [u8; Block::BYTES],
    // number of bytes of `buffer` already handed out
    used: usize,
}

impl std::fmt::Debug for AesRng {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "AesRng {{ counter: {} }}", self.counter)
    }
}

impl AesRng {
    /// Create a new random number generator using a random seed from
    /// `rand::random`.
    #[inline]
    pub fn new() -> Self {
        AesRng::from_seed(rand::random())
    }

    fn refill(&mut self) {
        let mut block = aes::cipher::Array(self.counter.to_le_bytes());
        self.aes.encrypt_block(&mut block);
        self.buffer = block.0;
        self.counter += 1;
        self.used = 0;
    }
}

impl Default for AesRng {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for AesRng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0; 4];
        self.fill_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0; 8];
        self.fill_bytes(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut written = 0;
        while written < dest.len() {
            if self.used == Block::BYTES {
                self.refill();
            }
            let n = (Block::BYTES - self.used).min(dest.len() - written);
            dest[written..written + n].copy_from_slice(&self.buffer[self.used..self.used + n]);
            self.used += n;
            written += n;
        }
    }
}

impl SeedableRng for AesRng {
    type Seed = [u8; Block::BYTES];

    #[inline]
    fn from_seed(seed: Self::Seed) -> Self {
        AesRng {
            aes: Aes128::new(&seed.into()),
            counter: 0,
            buffer: [0; Block::BYTES],
            used: Block::BYTES,
        }
    }
}

impl CryptoRng for AesRng {}

#[cfg(test)]
mod tests {
    use rand::{Rng, RngCore, SeedableRng};

    use super::AesRng;
    use crate::block::Block;

    #[test]
    fn test_generate() {
        let mut rng = AesRng::new();
        let a = rng.random::<[Block; 8]>();
        let b = rng.random::<[Block; 8]>();
        assert_ne!(a, b);
    }

    #[test]
    fn same_seed_same_stream_regardless_of_chunking() {
        let mut a = AesRng::from_seed([9; 16]);
        let mut b = AesRng::from_seed([9; 16]);
        let mut whole = [0_u8; 45];
        a.fill_bytes(&mut whole);
        let mut pieces = [0_u8; 45];
        for chunk in pieces.chunks_mut(7) {
            b.fill_bytes(chunk);
        }
        assert_eq!(whole, pieces);
    }
}
