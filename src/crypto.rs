//! AES based building blocks: a correlation robust hash and a counter-mode RNG.

mod aes_hash;
mod aes_rng;

pub(crate) use aes_hash::FIXED_KEY_HASH;
pub use aes_rng::AesRng;
