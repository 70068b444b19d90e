//! Fixed parameter set for this build: (v1, o1, o2) = (68, 36, 36).
//!
//! Every size used elsewhere in the crate is derived from these constants
//! rather than hand-computed at the call site.

/// Vinegar variables.
pub const V1: usize = 68;
/// Layer-1 oil variables.
pub const O1: usize = 36;
/// Layer-2 oil variables.
pub const O2: usize = 36;
/// v1 + o1, the boundary between vinegar and layer-2 oil.
pub const V2: usize = V1 + O1;
/// Total number of input variables.
pub const N: usize = V1 + O1 + O2;
/// Total number of central-map equations.
pub const M: usize = O1 + O2;

/// Seed length for deterministic key generation.
pub const SEED_LEN: usize = 32;
/// Digest length accepted by `sign`/`verify`.
pub const HASH_LEN: usize = 48;
/// Salt length appended to every signature.
pub const SALT_LEN: usize = 16;
/// Total signature length: the preimage plus the salt.
pub const SIG_LEN: usize = N + SALT_LEN;

/// Maximum number of vinegar/salt resampling attempts before signing fails.
pub const MAX_ATTEMPTS: usize = 128;

/// Triangle number T(k) = k(k+1)/2, the number of distinct (i,j) pairs with
/// i <= j < k.
pub const fn tri(k: usize) -> usize {
    k * (k + 1) / 2
}

/// Offset of the (i, j) batch (j >= i) within a d x d upper-triangular
/// batched array, counting batches (not bytes) from the start of row 0.
pub const fn idx_tri(i: usize, j: usize, d: usize) -> usize {
    (2 * d - i + 1) * i / 2 + (j - i)
}

pub const S1_LEN: usize = O1 * O2;
pub const T1_LEN: usize = V1 * O1;
pub const T4_LEN: usize = V1 * O2;
pub const T3_LEN: usize = O1 * O2;

pub const L1_F1_LEN: usize = O1 * tri(V1);
pub const L1_F2_LEN: usize = O1 * V1 * O1;

pub const L2_F1_LEN: usize = O2 * tri(V1);
pub const L2_F2_LEN: usize = O2 * V1 * O1;
pub const L2_F3_LEN: usize = O2 * V1 * O2;
pub const L2_F5_LEN: usize = O2 * tri(O1);
pub const L2_F6_LEN: usize = O2 * O1 * O2;

/// Total byte length of a packed secret key.
pub const SK_LEN: usize = SEED_LEN
    + S1_LEN
    + T1_LEN
    + T4_LEN
    + T3_LEN
    + L1_F1_LEN
    + L1_F2_LEN
    + L2_F1_LEN
    + L2_F2_LEN
    + L2_F3_LEN
    + L2_F5_LEN
    + L2_F6_LEN;

/// Byte offsets of each secret-key sub-field within the packed buffer, in
/// declaration order. `sk_seed` is the only span not run through the
/// native/AES basis bridge.
pub const SK_OFF_SEED: usize = 0;
pub const SK_OFF_S1: usize = SK_OFF_SEED + SEED_LEN;
pub const SK_OFF_T1: usize = SK_OFF_S1 + S1_LEN;
pub const SK_OFF_T4: usize = SK_OFF_T1 + T1_LEN;
pub const SK_OFF_T3: usize = SK_OFF_T4 + T4_LEN;
pub const SK_OFF_L1_F1: usize = SK_OFF_T3 + T3_LEN;
pub const SK_OFF_L1_F2: usize = SK_OFF_L1_F1 + L1_F1_LEN;
pub const SK_OFF_L2_F1: usize = SK_OFF_L1_F2 + L1_F2_LEN;
pub const SK_OFF_L2_F2: usize = SK_OFF_L2_F1 + L2_F1_LEN;
pub const SK_OFF_L2_F3: usize = SK_OFF_L2_F2 + L2_F2_LEN;
pub const SK_OFF_L2_F5: usize = SK_OFF_L2_F3 + L2_F3_LEN;
pub const SK_OFF_L2_F6: usize = SK_OFF_L2_F5 + L2_F5_LEN;

/// Total byte length of a packed public key: m batches of n-choose-2-plus-n
/// (i.e. T(n)) coefficients each.
pub const PK_LEN: usize = M * tri(N);

pub const L1_Q1_LEN: usize = O1 * tri(V1);
pub const L1_Q2_LEN: usize = O1 * V1 * O1;
pub const L1_Q3_LEN: usize = O1 * V1 * O2;
pub const L1_Q5_LEN: usize = O1 * tri(O1);
pub const L1_Q6_LEN: usize = O1 * O1 * O2;
pub const L1_Q9_LEN: usize = O1 * tri(O2);

pub const L2_Q1_LEN: usize = O2 * tri(V1);
pub const L2_Q2_LEN: usize = O2 * V1 * O1;
pub const L2_Q3_LEN: usize = O2 * V1 * O2;
pub const L2_Q5_LEN: usize = O2 * tri(O1);
pub const L2_Q6_LEN: usize = O2 * O1 * O2;
pub const L2_Q9_LEN: usize = O2 * tri(O2);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_reference_layout() {
        assert_eq!(N, 140);
        assert_eq!(M, 72);
        assert_eq!(SIG_LEN, 156);
        assert_eq!(tri(N), 9870);
        assert_eq!(PK_LEN, 710_640);
    }

    #[test]
    fn secret_key_offsets_tile_the_buffer_exactly() {
        assert_eq!(SK_OFF_L2_F6 + L2_F6_LEN, SK_LEN);
    }

    #[test]
    fn idx_tri_is_row_major_upper_triangular() {
        // Row 0 starts at offset 0; row 1 starts right after row 0's N entries.
        assert_eq!(idx_tri(0, 0, N), 0);
        assert_eq!(idx_tri(0, 1, N), 1);
        assert_eq!(idx_tri(1, 1, N), N);
    }
}
