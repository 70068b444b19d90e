//! Signature verification: recompute the public-key evaluation at the
//! claimed preimage and compare it, in constant time, against the target
//! derived from the digest and the signature's salt.

use subtle::ConstantTimeEq;

use crate::error::{RainbowError, Result};
use crate::keypair::PublicKey;
use crate::sign::target_bytes;
use crate::{linalg, params};

/// Verify a [`params::SIG_LEN`]-byte signature over a 48-byte digest
/// against `pk`.
pub fn verify(pk: &PublicKey, digest: &[u8], sig: &[u8]) -> Result<()> {
    if digest.len() != params::HASH_LEN {
        return Err(RainbowError::InvalidDigestLength {
            expected: params::HASH_LEN,
            actual: digest.len(),
        });
    }
    if sig.len() != params::SIG_LEN {
        return Err(RainbowError::InvalidEncoding {
            expected: params::SIG_LEN,
            actual: sig.len(),
        });
    }
    let mut digest_arr = [0u8; params::HASH_LEN];
    digest_arr.copy_from_slice(digest);

    let (x, salt) = sig.split_at(params::N);
    let mut salt_arr = [0u8; params::SALT_LEN];
    salt_arr.copy_from_slice(salt);

    let expected = target_bytes(&digest_arr, &salt_arr);

    let mut actual = vec![0u8; params::M];
    linalg::mq(&mut actual, pk.coeffs(), x);

    if expected.ct_eq(&actual).into() {
        Ok(())
    } else {
        Err(RainbowError::VerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair::keypair;
    use crate::sign::sign;

    #[test]
    fn tampered_signature_is_rejected() {
        let (pk, sk) = keypair(&[12u8; params::SEED_LEN]);
        let digest = [7u8; params::HASH_LEN];
        let mut sig = sign(&sk, &digest).unwrap();
        sig[0] ^= 1;
        assert!(verify(&pk, &digest, &sig).is_err());
    }

    #[test]
    fn tampered_digest_is_rejected() {
        let (pk, sk) = keypair(&[13u8; params::SEED_LEN]);
        let digest = [8u8; params::HASH_LEN];
        let sig = sign(&sk, &digest).unwrap();
        let mut other_digest = digest;
        other_digest[0] ^= 1;
        assert!(verify(&pk, &other_digest, &sig).is_err());
    }

    #[test]
    fn rejects_wrong_length_signature() {
        let (pk, _sk) = keypair(&[14u8; params::SEED_LEN]);
        let digest = [1u8; params::HASH_LEN];
        let err = verify(&pk, &digest, &[0u8; 5]).unwrap_err();
        assert!(matches!(err, RainbowError::InvalidEncoding { .. }));
    }
}
