//! CTR_DRBG (NIST SP 800-90A, AES-256, no derivation function) — the sole
//! source of randomness for key generation and signing. Every byte the rest
//! of the crate treats as "random" comes from here, seeded deterministically
//! from the caller-supplied key-generation seed or from the secret key's
//! `sk_seed` chained with the message digest, so that signing is
//! reproducible given the same secret key and message.

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes256;
use zeroize::Zeroize;

const KEY_LEN: usize = 32;
const BLOCK_LEN: usize = 16;
const SEED_LEN: usize = KEY_LEN + BLOCK_LEN;

/// Per SP 800-90A §8.3, the maximum number of bytes a single `generate`
/// call may request before a reseed is required. This crate never reseeds,
/// so callers must keep individual requests under this bound.
pub const MAX_GENERATE_LEN: usize = 4096;

/// A CTR_DRBG instance. Not `Clone`: each instance owns its own evolving
/// (Key, V) state, and that state is wiped on drop.
pub struct Provider {
    key: [u8; KEY_LEN],
    v: [u8; BLOCK_LEN],
}

impl Provider {
    /// Instantiate from 48 bytes of seed material, per the no-DF
    /// instantiate function: Key and V start at all-zero, then one
    /// CTR_DRBG_Update pass folds in the seed.
    pub fn new(seed_material: &[u8; SEED_LEN]) -> Self {
        let mut provider = Provider {
            key: [0u8; KEY_LEN],
            v: [0u8; BLOCK_LEN],
        };
        provider.update(seed_material);
        provider
    }

    fn encrypt_block(&self) -> [u8; BLOCK_LEN] {
        let cipher = Aes256::new(GenericArray::from_slice(&self.key));
        let mut block = GenericArray::clone_from_slice(&self.v);
        cipher.encrypt_block(&mut block);
        block.into()
    }

    fn increment_v(&mut self) {
        for byte in self.v.iter_mut().rev() {
            *byte = byte.wrapping_add(1);
            if *byte != 0 {
                break;
            }
        }
    }

    /// CTR_DRBG_Update: mix `provided_data` into (Key, V) by XORing it with
    /// a block of keystream generated from the *current* state.
    fn update(&mut self, provided_data: &[u8; SEED_LEN]) {
        let mut temp = [0u8; SEED_LEN];
        let mut offset = 0;
        while offset < SEED_LEN {
            self.increment_v();
            let block = self.encrypt_block();
            let n = core::cmp::min(BLOCK_LEN, SEED_LEN - offset);
            temp[offset..offset + n].copy_from_slice(&block[..n]);
            offset += n;
        }
        for (t, p) in temp.iter_mut().zip(provided_data.iter()) {
            *t ^= p;
        }
        self.key.copy_from_slice(&temp[..KEY_LEN]);
        self.v.copy_from_slice(&temp[KEY_LEN..]);
        temp.zeroize();
    }

    /// Fill `out` with the next `out.len()` pseudorandom bytes.
    /// `out.len()` must not exceed [`MAX_GENERATE_LEN`].
    pub fn generate(&mut self, out: &mut [u8]) {
        debug_assert!(out.len() <= MAX_GENERATE_LEN);
        let mut offset = 0;
        while offset < out.len() {
            self.increment_v();
            let block = self.encrypt_block();
            let n = core::cmp::min(BLOCK_LEN, out.len() - offset);
            out[offset..offset + n].copy_from_slice(&block[..n]);
            offset += n;
        }
        // Backtracking resistance: refresh (Key, V) after every request.
        self.update(&[0u8; SEED_LEN]);
    }

    /// Generate a single byte. Convenience wrapper used by rejection-sampling
    /// loops (vinegar/salt resampling) that only need a handful of bytes at
    /// a time.
    pub fn generate_byte(&mut self) -> u8 {
        let mut b = [0u8; 1];
        self.generate(&mut b);
        b[0]
    }
}

impl Drop for Provider {
    fn drop(&mut self) {
        self.key.zeroize();
        self.v.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_deterministic_given_the_same_seed() {
        let seed = [7u8; SEED_LEN];
        let mut a = Provider::new(&seed);
        let mut b = Provider::new(&seed);
        let mut out_a = [0u8; 100];
        let mut out_b = [0u8; 100];
        a.generate(&mut out_a);
        b.generate(&mut out_b);
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Provider::new(&[1u8; SEED_LEN]);
        let mut b = Provider::new(&[2u8; SEED_LEN]);
        let mut out_a = [0u8; 64];
        let mut out_b = [0u8; 64];
        a.generate(&mut out_a);
        b.generate(&mut out_b);
        assert_ne!(out_a, out_b);
    }

    #[test]
    fn successive_generates_do_not_repeat() {
        let mut p = Provider::new(&[3u8; SEED_LEN]);
        let mut first = [0u8; 32];
        let mut second = [0u8; 32];
        p.generate(&mut first);
        p.generate(&mut second);
        assert_ne!(first, second);
    }
}
