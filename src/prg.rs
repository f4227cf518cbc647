//! Seed-keyed pseudorandom generators, used for reproducible garbling.
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

use crate::crypto::AesRng;

/// Errors raised by a [`PseudorandomGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The seed cannot be used as a key of this generator.
    #[error("seed of {actual} bytes is invalid, expected {expected} bytes")]
    InvalidSeedLength {
        /// The seed length required by the generator.
        expected: usize,
        /// The length of the given seed.
        actual: usize,
    },
    /// Bytes were requested before a seed was set.
    #[error("no seed was set for the PRG")]
    KeyNotSet,
}

/// A deterministic generator keyed by a seed.
pub trait PseudorandomGenerator {
    /// (Re-)keys the generator. The output stream restarts from the beginning.
    fn set_key(&mut self, seed: &[u8]) -> Result<(), Error>;

    /// Fills `out` with the next bytes of the stream.
    fn get_bytes(&mut self, out: &mut [u8]) -> Result<(), Error>;
}

/// Seeds `R` from a byte seed of exactly `N` bytes.
fn rekey<R: SeedableRng<Seed = [u8; N]>, const N: usize>(seed: &[u8]) -> Result<R, Error> {
    let seed: [u8; N] = seed.try_into().map_err(|_| Error::InvalidSeedLength {
        expected: N,
        actual: seed.len(),
    })?;
    Ok(R::from_seed(seed))
}

/// AES-CTR based PRG, keyed by 16 byte seeds.
#[derive(Debug, Clone, Default)]
pub struct AesPrg {
    rng: Option<AesRng>,
}

impl PseudorandomGenerator for AesPrg {
    fn set_key(&mut self, seed: &[u8]) -> Result<(), Error> {
        self.rng = Some(rekey::<AesRng, 16>(seed)?);
        Ok(())
    }

    fn get_bytes(&mut self, out: &mut [u8]) -> Result<(), Error> {
        self.rng.as_mut().ok_or(Error::KeyNotSet)?.fill_bytes(out);
        Ok(())
    }
}

/// ChaCha20 based PRG, keyed by 32 byte seeds.
#[derive(Debug, Clone, Default)]
pub struct ChaChaPrg {
    rng: Option<ChaCha20Rng>,
}

impl PseudorandomGenerator for ChaChaPrg {
    fn set_key(&mut self, seed: &[u8]) -> Result<(), Error> {
        self.rng = Some(rekey::<ChaCha20Rng, 32>(seed)?);
        Ok(())
    }

    fn get_bytes(&mut self, out: &mut [u8]) -> Result<(), Error> {
        self.rng.as_mut().ok_or(Error::KeyNotSet)?.fill_bytes(out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream<P: PseudorandomGenerator + Default>(seed: &[u8]) -> [u8; 40] {
        let mut prg = P::default();
        prg.set_key(seed).unwrap();
        let mut out = [0; 40];
        prg.get_bytes(&mut out).unwrap();
        out
    }

    #[test]
    fn deterministic_in_seed() {
        assert_eq!(stream::<AesPrg>(&[1; 16]), stream::<AesPrg>(&[1; 16]));
        assert_ne!(stream::<AesPrg>(&[1; 16]), stream::<AesPrg>(&[2; 16]));
        assert_eq!(stream::<ChaChaPrg>(&[1; 32]), stream::<ChaChaPrg>(&[1; 32]));
    }

    #[test]
    fn rekeying_restarts_the_stream() {
        let mut prg = AesPrg::default();
        prg.set_key(&[5; 16]).unwrap();
        let mut first = [0; 8];
        prg.get_bytes(&mut first).unwrap();
        prg.set_key(&[5; 16]).unwrap();
        let mut again = [0; 8];
        prg.get_bytes(&mut again).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn invalid_seeds_and_unkeyed_use() {
        let mut prg = AesPrg::default();
        assert_eq!(Err(Error::KeyNotSet), prg.get_bytes(&mut [0; 1]));
        assert_eq!(
            Err(Error::InvalidSeedLength {
                expected: 16,
                actual: 32
            }),
            prg.set_key(&[0; 32])
        );
        let mut prg = ChaChaPrg::default();
        assert_eq!(
            Err(Error::InvalidSeedLength {
                expected: 32,
                actual: 16
            }),
            prg.set_key(&[0; 16])
        );
    }
}
