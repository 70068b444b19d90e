//! The signing state machine: derive a per-message target from the digest
//! and a resampled salt, solve the two triangular oil-and-vinegar linear
//! systems for fixed vinegar, and assemble the public preimage.

use zeroize::Zeroize;

use crate::drbg::Provider;
use crate::error::{RainbowError, Result};
use crate::keypair::SecretKey;
use crate::{central, field, hash, linalg, params};

/// Hash the digest and salt together into the M-byte target the central
/// map must hit. Both `sign` and `verify` call this so they agree on what
/// a signature actually attests to.
pub(crate) fn target_bytes(digest: &[u8; params::HASH_LEN], salt: &[u8; params::SALT_LEN]) -> Vec<u8> {
    let mut msg = Vec::with_capacity(params::HASH_LEN + params::SALT_LEN);
    msg.extend_from_slice(digest);
    msg.extend_from_slice(salt);
    let mut z = vec![0u8; params::M];
    hash::extend(&mut z, &msg);
    z
}

/// Try to solve layer 1 for `o1` given fixed vinegar `v` and target `g1`.
/// Returns `None` if layer 1's O1 x O1 system is singular for this vinegar.
fn solve_layer1(sk: &SecretKey, v: &[u8], g1_target: &[u8]) -> Option<Vec<u8>> {
    let mut rhs = vec![0u8; params::O1];
    linalg::tri_form(&mut rhs, sk.l1_f1(), v, params::V1);
    field::add(&mut rhs, g1_target);

    let mat = central::mat_l1(sk.l1_f2(), v);
    let mut inv = vec![0u8; params::O1 * params::O1];
    if !linalg::mat_inv(&mut inv, &mat, params::O1) {
        return None;
    }
    let mut o1 = vec![0u8; params::O1];
    linalg::mat_vec(&mut o1, &inv, params::O1, &rhs);
    Some(o1)
}

/// Try to solve layer 2 for `o2` given fixed vinegar `v`, the solved `o1`,
/// and target `g2`. Returns `None` if layer 2's O2 x O2 system is singular.
fn solve_layer2(sk: &SecretKey, v: &[u8], o1: &[u8], g2_target: &[u8]) -> Option<Vec<u8>> {
    let mut rhs = vec![0u8; params::O2];
    linalg::tri_form(&mut rhs, sk.l2_f1(), v, params::V1);
    field::add(&mut rhs, g2_target);

    let m2 = central::mat_l2_f2(sk.l2_f2(), v);
    let mut c2 = vec![0u8; params::O2];
    linalg::mat_vec(&mut c2, &m2, params::O1, o1);
    field::add(&mut rhs, &c2);

    let mut f5 = vec![0u8; params::O2];
    linalg::tri_form(&mut f5, sk.l2_f5(), o1, params::O1);
    field::add(&mut rhs, &f5);

    let mut mat = central::mat_l2_f3(sk.l2_f3(), v);
    let m6 = central::mat_l2_f6(sk.l2_f6(), o1);
    field::add(&mut mat, &m6);

    let mut inv = vec![0u8; params::O2 * params::O2];
    if !linalg::mat_inv(&mut inv, &mat, params::O2) {
        return None;
    }
    let mut o2 = vec![0u8; params::O2];
    linalg::mat_vec(&mut o2, &inv, params::O2, &rhs);
    Some(o2)
}

/// Sign a 48-byte digest with `sk`, returning a [`params::SIG_LEN`]-byte
/// signature (the public preimage followed by the salt that selected it).
///
/// Deterministic given (sk, digest): the vinegar/salt resampling stream is
/// itself seeded from `sk.seed() || digest`, so signing the same digest
/// twice with the same key produces the same signature.
pub fn sign(sk: &SecretKey, digest: &[u8]) -> Result<Vec<u8>> {
    if digest.len() != params::HASH_LEN {
        return Err(RainbowError::InvalidDigestLength {
            expected: params::HASH_LEN,
            actual: digest.len(),
        });
    }
    let mut digest_arr = [0u8; params::HASH_LEN];
    digest_arr.copy_from_slice(digest);

    let mut seed_material = Vec::with_capacity(sk.seed().len() + digest.len());
    seed_material.extend_from_slice(sk.seed());
    seed_material.extend_from_slice(digest);
    let drbg_seed = hash::extend48(&seed_material);
    let mut rng = Provider::new(&drbg_seed);

    for _ in 0..params::MAX_ATTEMPTS {
        let mut salt = [0u8; params::SALT_LEN];
        rng.generate(&mut salt);

        let mut v = vec![0u8; params::V1];
        rng.generate(&mut v);

        let mut z = target_bytes(&digest_arr, &salt);
        central::apply_s(sk.s1(), &mut z);
        let (g1_target, g2_target) = z.split_at(params::O1);

        let attempt = solve_layer1(sk, &v, g1_target).and_then(|o1| {
            solve_layer2(sk, &v, &o1, g2_target).map(|o2| (o1, o2))
        });

        let Some((mut o1, mut o2)) = attempt else {
            v.zeroize();
            z.zeroize();
            continue;
        };

        let x = sk.apply_t(&v, &o1, &o2);
        let mut sig = Vec::with_capacity(params::SIG_LEN);
        sig.extend_from_slice(&x);
        sig.extend_from_slice(&salt);

        v.zeroize();
        o1.zeroize();
        o2.zeroize();
        z.zeroize();
        return Ok(sig);
    }

    Err(RainbowError::SigningFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair::keypair;
    use crate::verify::verify;

    #[test]
    fn sign_is_deterministic_for_the_same_key_and_digest() {
        let (_, sk) = keypair(&[4u8; params::SEED_LEN]);
        let digest = [9u8; params::HASH_LEN];
        let sig_a = sign(&sk, &digest).unwrap();
        let sig_b = sign(&sk, &digest).unwrap();
        assert_eq!(sig_a, sig_b);
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let (pk, sk) = keypair(&[10u8; params::SEED_LEN]);
        let digest = [42u8; params::HASH_LEN];
        let sig = sign(&sk, &digest).unwrap();
        assert!(verify(&pk, &digest, &sig).is_ok());
    }

    #[test]
    fn rejects_wrong_length_digest() {
        let (_, sk) = keypair(&[11u8; params::SEED_LEN]);
        let err = sign(&sk, &[0u8; 10]).unwrap_err();
        assert!(matches!(err, RainbowError::InvalidDigestLength { .. }));
    }
}
