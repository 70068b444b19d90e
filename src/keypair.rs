//! Secret and public key types, and the key-composition dataflow that
//! derives a public key from a secret one.
//!
//! A secret key is a seed plus the central map's coefficient tables and the
//! two secret affine maps `S` and `T` that hide it. A public key is the
//! single composed multi-quadratic system `P = S . F . T^-1` those maps
//! produce, packed the way [`crate::linalg::mq`] expects to walk it.

use zeroize::Zeroize;

use crate::{basis, central, field, hash, linalg, params};

/// A packed secret key. Every byte is stored in the crate's internal
/// working basis except the leading seed span, which is the raw
/// key-generation seed and is never a field element.
pub struct SecretKey {
    buf: Vec<u8>,
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.buf.zeroize();
    }
}

macro_rules! field_accessor {
    ($name:ident, $off:ident, $len:ident) => {
        pub fn $name(&self) -> &[u8] {
            &self.buf[params::$off..params::$off + params::$len]
        }
    };
}

impl SecretKey {
    pub fn seed(&self) -> &[u8] {
        &self.buf[params::SK_OFF_SEED..params::SK_OFF_SEED + params::SEED_LEN]
    }

    field_accessor!(s1, SK_OFF_S1, S1_LEN);
    field_accessor!(t1, SK_OFF_T1, T1_LEN);
    field_accessor!(t4, SK_OFF_T4, T4_LEN);
    field_accessor!(t3, SK_OFF_T3, T3_LEN);
    field_accessor!(l1_f1, SK_OFF_L1_F1, L1_F1_LEN);
    field_accessor!(l1_f2, SK_OFF_L1_F2, L1_F2_LEN);
    field_accessor!(l2_f1, SK_OFF_L2_F1, L2_F1_LEN);
    field_accessor!(l2_f2, SK_OFF_L2_F2, L2_F2_LEN);
    field_accessor!(l2_f3, SK_OFF_L2_F3, L2_F3_LEN);
    field_accessor!(l2_f5, SK_OFF_L2_F5, L2_F5_LEN);
    field_accessor!(l2_f6, SK_OFF_L2_F6, L2_F6_LEN);

    /// Serialize to the external (native-basis) wire format. The seed span
    /// is copied verbatim; every other span goes through the basis bridge.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.buf.clone();
        basis::to_native(&mut out[params::SEED_LEN..]);
        out
    }

    /// Parse a packed secret key from its external wire format.
    pub fn from_bytes(bytes: &[u8]) -> crate::error::Result<Self> {
        if bytes.len() != params::SK_LEN {
            return Err(crate::error::RainbowError::InvalidEncoding {
                expected: params::SK_LEN,
                actual: bytes.len(),
            });
        }
        let mut buf = bytes.to_vec();
        basis::to_aes(&mut buf[params::SEED_LEN..]);
        Ok(SecretKey { buf })
    }

    /// T^-1: recover the internal (v, o1, o2) variables from the public
    /// variables `x`, the inverse of the forward map
    /// `x_v = v + T1.o1 + T4.o2, x_o1 = o1 + T3.o2, x_o2 = o2`.
    ///
    /// Not used by `calc_pk` (key composition builds the public map from the
    /// extended-Q blocks directly, never evaluating it at the standard
    /// basis), but kept to cross-check `calc_pk` against a direct evaluation
    /// of the composed map in tests.
    #[cfg(test)]
    fn invert_t(&self, x: &[u8]) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        debug_assert_eq!(x.len(), params::N);
        let x_v = &x[..params::V1];
        let x_o1 = &x[params::V1..params::V2];
        let x_o2 = &x[params::V2..];

        let o2 = x_o2.to_vec();

        let mut t3_o2 = vec![0u8; params::O1];
        linalg::mat_vec(&mut t3_o2, self.t3(), params::O2, &o2);
        let mut o1 = x_o1.to_vec();
        field::add(&mut o1, &t3_o2);

        let mut t1_o1 = vec![0u8; params::V1];
        linalg::mat_vec(&mut t1_o1, self.t1(), params::O1, &o1);
        let mut t4_o2 = vec![0u8; params::V1];
        linalg::mat_vec(&mut t4_o2, self.t4(), params::O2, &o2);
        let mut v = x_v.to_vec();
        field::add(&mut v, &t1_o1);
        field::add(&mut v, &t4_o2);

        (v, o1, o2)
    }

    /// T: the forward affine map, from internal variables to public ones.
    /// Used by the signer once (v, o1, o2) solving the central map has
    /// succeeded, to assemble the public preimage it actually publishes.
    pub(crate) fn apply_t(&self, v: &[u8], o1: &[u8], o2: &[u8]) -> Vec<u8> {
        let mut t1_o1 = vec![0u8; params::V1];
        linalg::mat_vec(&mut t1_o1, self.t1(), params::O1, o1);
        let mut t4_o2 = vec![0u8; params::V1];
        linalg::mat_vec(&mut t4_o2, self.t4(), params::O2, o2);
        let mut x_v = v.to_vec();
        field::add(&mut x_v, &t1_o1);
        field::add(&mut x_v, &t4_o2);

        let mut t3_o2 = vec![0u8; params::O1];
        linalg::mat_vec(&mut t3_o2, self.t3(), params::O2, o2);
        let mut x_o1 = o1.to_vec();
        field::add(&mut x_o1, &t3_o2);

        let mut x = Vec::with_capacity(params::N);
        x.extend_from_slice(&x_v);
        x.extend_from_slice(&x_o1);
        x.extend_from_slice(o2);
        x
    }

    /// Evaluate the fully composed public map `P(x) = S . F . T^-1 (x)`
    /// directly, by substitution rather than via the packed public key.
    /// Test-only cross-check for `calc_pk`.
    #[cfg(test)]
    fn eval_composed(&self, x: &[u8]) -> Vec<u8> {
        let (v, o1, o2) = self.invert_t(x);
        let mut out = vec![0u8; params::M];
        central::eval(
            self.l1_f1(),
            self.l1_f2(),
            self.l2_f1(),
            self.l2_f2(),
            self.l2_f3(),
            self.l2_f5(),
            self.l2_f6(),
            &v,
            &o1,
            &o2,
            &mut out,
        );
        central::apply_s(self.s1(), &mut out);
        out
    }

    /// Derive the public key that corresponds to this secret key.
    ///
    /// Builds the extended public-key coefficient tables (the twelve
    /// `l{1,2}_q{1,2,3,5,6,9}` arrays) by composing each layer's F tables
    /// with the T map via the block multiply-add primitives, mixes layer 1
    /// with S1's contribution from layer 2, then packs the result into the
    /// flat triangular layout [`crate::linalg::mq`] expects. See DESIGN.md
    /// for the term-by-term derivation of each composition step.
    pub fn calc_pk(&self) -> Vec<u8> {
        let layer1 = central::compose_layer(
            self.l1_f1(),
            self.l1_f2(),
            None,
            None,
            None,
            self.t1(),
            self.t3(),
            self.t4(),
            params::O1,
        );
        let mut layer2 = central::compose_layer(
            self.l2_f1(),
            self.l2_f2(),
            Some(self.l2_f3()),
            Some(self.l2_f5()),
            Some(self.l2_f6()),
            self.t1(),
            self.t3(),
            self.t4(),
            params::O2,
        );

        // S-obfuscation: mix S1's contribution from each layer-2 block into
        // the matching layer-1 block. Layer 2's own arrays are untouched —
        // S = [[I, S1], [0, I]] only ever adds into the first block.
        let mut q1 = layer1.q1;
        central::obfuscate(&mut q1, &layer2.q1, self.s1(), params::tri(params::V1));
        let mut q2 = layer1.q2;
        central::obfuscate(&mut q2, &layer2.q2, self.s1(), params::V1 * params::O1);
        let mut q3 = layer1.q3;
        central::obfuscate(&mut q3, &layer2.q3, self.s1(), params::V1 * params::O2);
        let mut q5 = layer1.q5;
        central::obfuscate(&mut q5, &layer2.q5, self.s1(), params::tri(params::O1));
        let mut q6 = layer1.q6;
        central::obfuscate(&mut q6, &layer2.q6, self.s1(), params::O1 * params::O2);
        let mut q9 = layer1.q9;
        central::obfuscate(&mut q9, &layer2.q9, self.s1(), params::tri(params::O2));

        pack(
            &q1, &layer2.q1, &q2, &layer2.q2, &q3, &layer2.q3, &q5, &layer2.q5, &q6, &layer2.q6, &q9,
            &layer2.q9,
        )
    }
}

/// Copy a pair of extended-Q blocks (already-obfuscated layer-1, raw
/// layer-2) into their destination range of the flat packed public key, one
/// M-byte slot per (i, j) with i in `row_range`, j in `col_range`, taking the
/// per-slot entry index from `entry_of(local_i, local_j)` into the blocks'
/// own (rows x cols or triangular) layout.
#[allow(clippy::too_many_arguments)]
fn pack_block(
    pk: &mut [u8],
    l1: &[u8],
    l2: &[u8],
    row_range: std::ops::Range<usize>,
    col_of: impl Fn(usize) -> std::ops::Range<usize>,
    entry_of: impl Fn(usize, usize) -> usize,
) {
    let m = params::M;
    let o1 = params::O1;
    for i in row_range {
        for j in col_of(i) {
            let entry = entry_of(i, j);
            let dest = params::idx_tri(i, j, params::N) * m;
            pk[dest..dest + o1].copy_from_slice(&l1[entry * o1..(entry + 1) * o1]);
            pk[dest + o1..dest + m].copy_from_slice(&l2[entry * params::O2..(entry + 1) * params::O2]);
        }
    }
}

/// Pack the six obfuscated layer-1 / raw layer-2 extended-Q block pairs into
/// the flat public key, per the pack step of key composition: Q2/Q3/Q6 as
/// off-diagonal blocks, Q1/Q5/Q9 as the three diagonal triangular blocks.
#[allow(clippy::too_many_arguments)]
fn pack(
    q1_l1: &[u8],
    q1_l2: &[u8],
    q2_l1: &[u8],
    q2_l2: &[u8],
    q3_l1: &[u8],
    q3_l2: &[u8],
    q5_l1: &[u8],
    q5_l2: &[u8],
    q6_l1: &[u8],
    q6_l2: &[u8],
    q9_l1: &[u8],
    q9_l2: &[u8],
) -> Vec<u8> {
    let v1 = params::V1;
    let o1 = params::O1;
    let o2 = params::O2;
    let n = params::N;
    let mut pk = vec![0u8; params::PK_LEN];

    // Q1: vinegar x vinegar, triangular.
    pack_block(&mut pk, q1_l1, q1_l2, 0..v1, |i| i..v1, |i, j| params::idx_tri(i, j, v1));
    // Q2: vinegar x oil-1, dense.
    pack_block(&mut pk, q2_l1, q2_l2, 0..v1, |_| v1..v1 + o1, |i, j| i * o1 + (j - v1));
    // Q3: vinegar x oil-2, dense.
    pack_block(&mut pk, q3_l1, q3_l2, 0..v1, |_| v1 + o1..n, |i, j| i * o2 + (j - v1 - o1));
    // Q5: oil-1 x oil-1, triangular.
    pack_block(&mut pk, q5_l1, q5_l2, v1..v1 + o1, |i| i..v1 + o1, |i, j| {
        params::idx_tri(i - v1, j - v1, o1)
    });
    // Q6: oil-1 x oil-2, dense.
    pack_block(&mut pk, q6_l1, q6_l2, v1..v1 + o1, |_| v1 + o1..n, |i, j| {
        (i - v1) * o2 + (j - v1 - o1)
    });
    // Q9: oil-2 x oil-2, triangular.
    pack_block(&mut pk, q9_l1, q9_l2, v1 + o1..n, |i| i..n, |i, j| {
        params::idx_tri(i - v1 - o1, j - v1 - o1, o2)
    });

    pk
}

/// A packed public key: one flat `Vec<u8>` in the crate's working basis,
/// laid out exactly the way [`crate::linalg::mq`] walks it.
#[derive(Clone)]
pub struct PublicKey {
    buf: Vec<u8>,
}

impl PublicKey {
    pub(crate) fn coeffs(&self) -> &[u8] {
        &self.buf
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.buf.clone();
        basis::to_native(&mut out);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> crate::error::Result<Self> {
        if bytes.len() != params::PK_LEN {
            return Err(crate::error::RainbowError::InvalidEncoding {
                expected: params::PK_LEN,
                actual: bytes.len(),
            });
        }
        let mut buf = bytes.to_vec();
        basis::to_aes(&mut buf);
        Ok(PublicKey { buf })
    }
}

/// Derive a keypair from a 32-byte seed. Generation is fully deterministic:
/// the same seed always yields the same keypair, with every coefficient
/// table drawn from a CTR_DRBG stream seeded by the hash-extended seed.
pub fn keypair(seed: &[u8; params::SEED_LEN]) -> (PublicKey, SecretKey) {
    let drbg_seed = hash::extend48(seed);
    let mut rng = crate::drbg::Provider::new(&drbg_seed);

    let mut buf = vec![0u8; params::SK_LEN];
    buf[..params::SEED_LEN].copy_from_slice(seed);
    rng.generate(&mut buf[params::SEED_LEN..]);

    // Fold the T1.T3 cross term into T4 in place, so signing and key
    // composition both read a single combined `t4` field instead of
    // recomputing T1.T3 on every use.
    let t1 = buf[params::SK_OFF_T1..params::SK_OFF_T1 + params::T1_LEN].to_vec();
    let t3 = buf[params::SK_OFF_T3..params::SK_OFF_T3 + params::T3_LEN].to_vec();
    let mut t1_t3 = vec![0u8; params::T4_LEN];
    for j in 0..params::O2 {
        let t3_col = &t3[j * params::O1..(j + 1) * params::O1];
        let mut col = vec![0u8; params::V1];
        linalg::mat_vec(&mut col, &t1, params::O1, t3_col);
        t1_t3[j * params::V1..(j + 1) * params::V1].copy_from_slice(&col);
    }
    field::add(
        &mut buf[params::SK_OFF_T4..params::SK_OFF_T4 + params::T4_LEN],
        &t1_t3,
    );

    let sk = SecretKey { buf };
    let pk_buf = sk.calc_pk();
    (PublicKey { buf: pk_buf }, sk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypair_generation_is_deterministic() {
        let seed = [9u8; params::SEED_LEN];
        let (pk_a, sk_a) = keypair(&seed);
        let (pk_b, sk_b) = keypair(&seed);
        assert_eq!(sk_a.to_bytes(), sk_b.to_bytes());
        assert_eq!(pk_a.to_bytes(), pk_b.to_bytes());
    }

    #[test]
    fn different_seeds_diverge() {
        let (pk_a, _sk_a) = keypair(&[1u8; params::SEED_LEN]);
        let (pk_b, _sk_b) = keypair(&[2u8; params::SEED_LEN]);
        assert_ne!(pk_a.to_bytes(), pk_b.to_bytes());
    }

    #[test]
    fn secret_key_round_trips_through_wire_format() {
        let (_pk, sk) = keypair(&[5u8; params::SEED_LEN]);
        let bytes = sk.to_bytes();
        let sk2 = SecretKey::from_bytes(&bytes).unwrap();
        assert_eq!(sk.to_bytes(), sk2.to_bytes());
    }

    #[test]
    fn public_key_round_trips_through_wire_format() {
        let (pk, _sk) = keypair(&[6u8; params::SEED_LEN]);
        let bytes = pk.to_bytes();
        let pk2 = PublicKey::from_bytes(&bytes).unwrap();
        assert_eq!(pk.to_bytes(), pk2.to_bytes());
    }

    #[test]
    fn calc_pk_agrees_with_eval_composed_at_basis_vectors() {
        // calc_pk's diagonal entries are exactly eval_composed(e_i); spot
        // check a couple of positions against a direct mq() evaluation.
        let (pk, sk) = keypair(&[2u8; params::SEED_LEN]);
        let mut e = vec![0u8; params::N];
        e[3] = 1;
        let direct = sk.eval_composed(&e);
        let mut via_mq = vec![0u8; params::M];
        linalg::mq(&mut via_mq, pk.coeffs(), &e);
        assert_eq!(direct, via_mq);
    }
}
