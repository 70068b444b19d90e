//! The central (trapdoor) map: the easy-to-invert multivariate-quadratic
//! system an oil-and-vinegar signer solves internally. Shared between key
//! generation (which evaluates it to derive the public key) and signing
//! (which builds and solves its linear sub-systems for fixed vinegar).
//!
//! Layer 1's O1 equations are quadratic in vinegar and linear in o1.
//! Layer 2's O2 equations are quadratic in vinegar and in o1, and linear in
//! o2 — the defining "oil and vinegar" property at each layer.

use crate::{field, linalg, params};

/// Σ_i v_i · F2_i, producing the O1 x O1 matrix (column-major, O1 columns
/// of O1 bytes) that's linear in o1 for the fixed vinegar `v`.
pub fn mat_l1(l1_f2: &[u8], v: &[u8]) -> Vec<u8> {
    let mut m = vec![0u8; params::O1 * params::O1];
    linalg::mat_vec(&mut m, l1_f2, params::V1, v);
    m
}

/// Σ_i v_i · (layer-2 v×o1 cross block)_i, an O1 x O2 matrix.
pub fn mat_l2_f2(l2_f2: &[u8], v: &[u8]) -> Vec<u8> {
    let mut m = vec![0u8; params::O1 * params::O2];
    linalg::mat_vec(&mut m, l2_f2, params::V1, v);
    m
}

/// Σ_i v_i · (layer-2 v×o2 cross block)_i, an O2 x O2 matrix.
pub fn mat_l2_f3(l2_f3: &[u8], v: &[u8]) -> Vec<u8> {
    let mut m = vec![0u8; params::O2 * params::O2];
    linalg::mat_vec(&mut m, l2_f3, params::V1, v);
    m
}

/// Σ_k o1_k · (layer-2 o1×o2 cross block)_k, an O2 x O2 matrix.
pub fn mat_l2_f6(l2_f6: &[u8], o1: &[u8]) -> Vec<u8> {
    let mut m = vec![0u8; params::O2 * params::O2];
    linalg::mat_vec(&mut m, l2_f6, params::O1, o1);
    m
}

/// Apply the output mixing map S in place: `g[0..O1] ^= S1 . g[O1..M]`.
/// S has the block form `[[I, S1], [0, I]]`, which over GF(2^8)-additive
/// (characteristic 2) makes it self-inverse — applying it twice is the
/// identity, so the same function serves both S and S^-1. `s1` is stored
/// column-major as O2 columns of O1 bytes, so `S1 . g2` lands O1 bytes.
pub fn apply_s(s1: &[u8], g: &mut [u8]) {
    debug_assert_eq!(g.len(), params::M);
    debug_assert_eq!(s1.len(), params::S1_LEN);
    let (g1, g2) = g.split_at_mut(params::O1);
    let mut s1g2 = vec![0u8; params::O1];
    linalg::mat_vec(&mut s1g2, s1, params::O2, g2);
    field::add(g1, &s1g2);
}

/// The six extended-Q coefficient arrays one layer contributes to the
/// key-composition pack step: diagonal vinegar block (`q1`), the v x o1
/// and v x o2 off-diagonal blocks (`q2`, `q3`), the o1 x o1 and o1 x o2
/// blocks (`q5`, `q6`), and the o2 x o2 block (`q9`). Sized and shaped
/// exactly as the packed public key's own blocks, just not yet mixed by
/// S or interleaved with the other layer.
pub struct LayerQ {
    pub q1: Vec<u8>,
    pub q2: Vec<u8>,
    pub q3: Vec<u8>,
    pub q5: Vec<u8>,
    pub q6: Vec<u8>,
    pub q9: Vec<u8>,
}

/// Compose one layer's F-coefficient tables with the T map into its six
/// extended-Q blocks. `batch` is the layer's own equation count (O1 for
/// layer 1, O2 for layer 2); `f3`/`f5`/`f6` are `None` for layer 1, which
/// has no central-map dependence on o2.
///
/// This mirrors substituting `v = x_v + T1.x_o1 + t4.x_o2` and
/// `o1 = x_o1 + T3.x_o2` into the layer's own central-map formula and
/// collecting the result by destination block; see DESIGN.md for the
/// term-by-term account of where each MAD call's contribution lands.
#[allow(clippy::too_many_arguments)]
pub fn compose_layer(
    f1: &[u8],
    f2: &[u8],
    f3: Option<&[u8]>,
    f5: Option<&[u8]>,
    f6: Option<&[u8]>,
    t1: &[u8],
    t3: &[u8],
    t4: &[u8],
    batch: usize,
) -> LayerQ {
    let v1 = params::V1;
    let o1 = params::O1;
    let o2 = params::O2;

    let mut q2 = f2.to_vec();
    linalg::madd_trimat(&mut q2, f1, t1, v1, v1, o1, batch);
    let mut temp_a = vec![0u8; o1 * o1 * batch];
    linalg::madd_mat_tr(&mut temp_a, t1, v1, o1, &q2, o1, batch);
    linalg::madd_trimat_tr(&mut q2, f1, t1, v1, v1, o1, batch);
    let mut q5 = vec![0u8; params::tri(o1) * batch];
    linalg::upper_trianglize(&mut q5, &temp_a, o1, batch);
    if let Some(f5) = f5 {
        field::add(&mut q5, f5);
    }

    let mut q3 = match f3 {
        Some(f3) => f3.to_vec(),
        None => vec![0u8; v1 * o2 * batch],
    };
    linalg::madd_trimat(&mut q3, f1, t4, v1, v1, o2, batch);
    linalg::madd_mat(&mut q3, f2, v1, t3, o1, o1, o2, batch);
    let mut temp_b = vec![0u8; o2 * o2 * batch];
    linalg::madd_mat_tr(&mut temp_b, t4, v1, o2, &q3, o2, batch);
    let mut q9 = vec![0u8; params::tri(o2) * batch];
    linalg::upper_trianglize(&mut q9, &temp_b, o2, batch);
    linalg::madd_trimat_tr(&mut q3, f1, t4, v1, v1, o2, batch);

    let mut q6 = match f6 {
        Some(f6) => f6.to_vec(),
        None => vec![0u8; o1 * o2 * batch],
    };
    linalg::madd_bmat_tr(&mut q6, f2, o1, t4, v1, o2, batch);

    if let Some(f5) = f5 {
        linalg::madd_trimat(&mut q6, f5, t3, o1, o1, o2, batch);
        linalg::madd_trimat_tr(&mut q6, f5, t3, o1, o1, o2, batch);

        // F5's own quadratic-in-o2 remainder after substituting o1 = x_o1 +
        // T3.x_o2: the pure (T3.x_o2, T3.x_o2) term, a congruence T3^T.F5.T3
        // that lands in Q9 alongside the v-substitution terms above.
        let mut temp_c = vec![0u8; o1 * o2 * batch];
        linalg::madd_trimat(&mut temp_c, f5, t3, o1, o1, o2, batch);
        let mut temp_d = vec![0u8; o2 * o2 * batch];
        linalg::madd_mat_tr(&mut temp_d, t3, o1, o2, &temp_c, o2, batch);
        let mut extra = vec![0u8; params::tri(o2) * batch];
        linalg::upper_trianglize(&mut extra, &temp_d, o2, batch);
        field::add(&mut q9, &extra);
    }

    if let Some(f6) = f6 {
        // F6's remainder after the same o1 substitution: the bilinear
        // (T3.x_o2, x_o2) term, purely in x_o2, folded into Q9.
        let mut temp_e = vec![0u8; o2 * o2 * batch];
        linalg::madd_mat_tr(&mut temp_e, t3, o1, o2, f6, o2, batch);
        let mut extra = vec![0u8; params::tri(o2) * batch];
        linalg::upper_trianglize(&mut extra, &temp_e, o2, batch);
        field::add(&mut q9, &extra);
    }

    linalg::madd_mat_tr(&mut q6, t1, v1, o1, &q3, o2, batch);

    LayerQ { q1: f1.to_vec(), q2, q3, q5, q6, q9 }
}

/// Mix `s1 . l2` into `l1` in place, entry by entry: the S-obfuscation step
/// of key composition, applied separately to each of the six Q-block pairs.
/// `l1` holds `entries` batches of O1 bytes, `l2` the same entry count in
/// O2-byte batches.
pub fn obfuscate(l1: &mut [u8], l2: &[u8], s1: &[u8], entries: usize) {
    debug_assert_eq!(l1.len(), entries * params::O1);
    debug_assert_eq!(l2.len(), entries * params::O2);
    let mut contrib = vec![0u8; params::O1];
    for e in 0..entries {
        linalg::mat_vec(&mut contrib, s1, params::O2, &l2[e * params::O2..(e + 1) * params::O2]);
        field::add(&mut l1[e * params::O1..(e + 1) * params::O1], &contrib);
    }
}

/// Evaluate the full central map at (v, o1, o2), writing the M = O1 + O2
/// equation outputs into `out`.
#[allow(clippy::too_many_arguments)]
pub fn eval(
    l1_f1: &[u8],
    l1_f2: &[u8],
    l2_f1: &[u8],
    l2_f2: &[u8],
    l2_f3: &[u8],
    l2_f5: &[u8],
    l2_f6: &[u8],
    v: &[u8],
    o1: &[u8],
    o2: &[u8],
    out: &mut [u8],
) {
    debug_assert_eq!(out.len(), params::M);
    let (out1, out2) = out.split_at_mut(params::O1);

    linalg::tri_form(out1, l1_f1, v, params::V1);
    let m1 = mat_l1(l1_f2, v);
    let mut c = vec![0u8; params::O1];
    linalg::mat_vec(&mut c, &m1, params::O1, o1);
    field::add(out1, &c);

    linalg::tri_form(out2, l2_f1, v, params::V1);

    let m2 = mat_l2_f2(l2_f2, v);
    let mut c2 = vec![0u8; params::O2];
    linalg::mat_vec(&mut c2, &m2, params::O1, o1);
    field::add(out2, &c2);

    let m3 = mat_l2_f3(l2_f3, v);
    let mut c3 = vec![0u8; params::O2];
    linalg::mat_vec(&mut c3, &m3, params::O2, o2);
    field::add(out2, &c3);

    let mut f5 = vec![0u8; params::O2];
    linalg::tri_form(&mut f5, l2_f5, o1, params::O1);
    field::add(out2, &f5);

    let m6 = mat_l2_f6(l2_f6, o1);
    let mut c6 = vec![0u8; params::O2];
    linalg::mat_vec(&mut c6, &m6, params::O2, o2);
    field::add(out2, &c6);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_is_deterministic_and_zero_at_zero() {
        let l1_f1 = vec![3u8; params::L1_F1_LEN];
        let l1_f2 = vec![5u8; params::L1_F2_LEN];
        let l2_f1 = vec![7u8; params::L2_F1_LEN];
        let l2_f2 = vec![11u8; params::L2_F2_LEN];
        let l2_f3 = vec![13u8; params::L2_F3_LEN];
        let l2_f5 = vec![17u8; params::L2_F5_LEN];
        let l2_f6 = vec![19u8; params::L2_F6_LEN];

        let v = vec![0u8; params::V1];
        let o1 = vec![0u8; params::O1];
        let o2 = vec![0u8; params::O2];
        let mut out = vec![0u8; params::M];
        eval(
            &l1_f1, &l1_f2, &l2_f1, &l2_f2, &l2_f3, &l2_f5, &l2_f6, &v, &o1, &o2, &mut out,
        );
        assert!(out.iter().all(|&b| b == 0), "homogeneous map is zero at the origin");

        let v2: Vec<u8> = (0..params::V1).map(|i| (i % 251) as u8 + 1).collect();
        let o1a: Vec<u8> = (0..params::O1).map(|i| (i % 200) as u8 + 1).collect();
        let o2a: Vec<u8> = (0..params::O2).map(|i| (i % 180) as u8 + 1).collect();
        let mut out_a = vec![0u8; params::M];
        let mut out_b = vec![0u8; params::M];
        eval(
            &l1_f1, &l1_f2, &l2_f1, &l2_f2, &l2_f3, &l2_f5, &l2_f6, &v2, &o1a, &o2a, &mut out_a,
        );
        eval(
            &l1_f1, &l1_f2, &l2_f1, &l2_f2, &l2_f3, &l2_f5, &l2_f6, &v2, &o1a, &o2a, &mut out_b,
        );
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn apply_s_is_an_involution() {
        let s1: Vec<u8> = (0..params::S1_LEN).map(|i| (i % 97) as u8).collect();
        let mut g: Vec<u8> = (0..params::M).map(|i| (i % 53) as u8 + 1).collect();
        let original = g.clone();
        apply_s(&s1, &mut g);
        assert_ne!(g, original);
        apply_s(&s1, &mut g);
        assert_eq!(g, original);
    }

    fn ramp(n: usize, modulus: u8, offset: u8) -> Vec<u8> {
        (0..n).map(|i| (i as u8).wrapping_mul(modulus).wrapping_add(offset)).collect()
    }

    /// Evaluate one layer's extended-Q blocks directly at (xv, xo1, xo2),
    /// mirroring `mq`'s row-walk over each block in turn.
    fn eval_layer_q(q: &LayerQ, xv: &[u8], xo1: &[u8], xo2: &[u8], batch: usize) -> Vec<u8> {
        fn bilinear(q: &[u8], a: &[u8], b: &[u8], batch: usize) -> Vec<u8> {
            let mut acc = vec![0u8; batch];
            let mut ptr = 0usize;
            for &ai in a {
                let mut row = vec![0u8; batch];
                for &bj in b {
                    field::madd(&mut row, &q[ptr..ptr + batch], bj);
                    ptr += batch;
                }
                field::madd(&mut acc, &row, ai);
            }
            acc
        }

        let mut out = vec![0u8; batch];
        let mut t1 = vec![0u8; batch];
        linalg::tri_form(&mut t1, &q.q1, xv, params::V1);
        field::add(&mut out, &t1);
        field::add(&mut out, &bilinear(&q.q2, xv, xo1, batch));
        field::add(&mut out, &bilinear(&q.q3, xv, xo2, batch));
        let mut t5 = vec![0u8; batch];
        linalg::tri_form(&mut t5, &q.q5, xo1, params::O1);
        field::add(&mut out, &t5);
        field::add(&mut out, &bilinear(&q.q6, xo1, xo2, batch));
        let mut t9 = vec![0u8; batch];
        linalg::tri_form(&mut t9, &q.q9, xo2, params::O2);
        field::add(&mut out, &t9);
        out
    }

    fn invert_t_for_test(t1: &[u8], t3: &[u8], t4: &[u8], xv: &[u8], xo1: &[u8], xo2: &[u8]) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        let mut o1 = xo1.to_vec();
        let mut t3xo2 = vec![0u8; params::O1];
        linalg::mat_vec(&mut t3xo2, t3, params::O2, xo2);
        field::add(&mut o1, &t3xo2);

        let mut v = xv.to_vec();
        let mut t1o1 = vec![0u8; params::V1];
        linalg::mat_vec(&mut t1o1, t1, params::O1, &o1);
        field::add(&mut v, &t1o1);
        let mut t4o2 = vec![0u8; params::V1];
        linalg::mat_vec(&mut t4o2, t4, params::O2, xo2);
        field::add(&mut v, &t4o2);

        (v, o1, xo2.to_vec())
    }

    #[test]
    fn compose_layer1_matches_eval_after_t_substitution() {
        let f1 = ramp(params::L1_F1_LEN, 3, 1);
        let f2 = ramp(params::L1_F2_LEN, 5, 2);
        let t1 = ramp(params::T1_LEN, 7, 1);
        let t3 = ramp(params::T3_LEN, 11, 1);
        let t4 = ramp(params::T4_LEN, 13, 1);

        let q = compose_layer(&f1, &f2, None, None, None, &t1, &t3, &t4, params::O1);

        let xv = ramp(params::V1, 17, 3);
        let xo1 = ramp(params::O1, 19, 5);
        let xo2 = ramp(params::O2, 23, 7);
        let (v, o1, o2) = invert_t_for_test(&t1, &t3, &t4, &xv, &xo1, &xo2);

        let lhs = eval_layer_q(&q, &xv, &xo1, &xo2, params::O1);

        let l2_zero_f1 = vec![0u8; params::L2_F1_LEN];
        let l2_zero_f2 = vec![0u8; params::L2_F2_LEN];
        let l2_zero_f3 = vec![0u8; params::L2_F3_LEN];
        let l2_zero_f5 = vec![0u8; params::L2_F5_LEN];
        let l2_zero_f6 = vec![0u8; params::L2_F6_LEN];
        let mut out = vec![0u8; params::M];
        eval(
            &f1, &f2, &l2_zero_f1, &l2_zero_f2, &l2_zero_f3, &l2_zero_f5, &l2_zero_f6, &v, &o1, &o2,
            &mut out,
        );
        assert_eq!(lhs, out[..params::O1].to_vec());
    }

    #[test]
    fn compose_layer2_matches_eval_after_t_substitution() {
        let f1 = ramp(params::L2_F1_LEN, 3, 2);
        let f2 = ramp(params::L2_F2_LEN, 5, 3);
        let f3 = ramp(params::L2_F3_LEN, 7, 4);
        let f5 = ramp(params::L2_F5_LEN, 11, 5);
        let f6 = ramp(params::L2_F6_LEN, 13, 6);
        let t1 = ramp(params::T1_LEN, 7, 1);
        let t3 = ramp(params::T3_LEN, 11, 1);
        let t4 = ramp(params::T4_LEN, 13, 1);

        let q = compose_layer(&f1, &f2, Some(&f3), Some(&f5), Some(&f6), &t1, &t3, &t4, params::O2);

        let xv = ramp(params::V1, 29, 3);
        let xo1 = ramp(params::O1, 31, 5);
        let xo2 = ramp(params::O2, 37, 7);
        let (v, o1, o2) = invert_t_for_test(&t1, &t3, &t4, &xv, &xo1, &xo2);

        let lhs = eval_layer_q(&q, &xv, &xo1, &xo2, params::O2);

        let l1_zero_f1 = vec![0u8; params::L1_F1_LEN];
        let l1_zero_f2 = vec![0u8; params::L1_F2_LEN];
        let mut out = vec![0u8; params::M];
        eval(&l1_zero_f1, &l1_zero_f2, &f1, &f2, &f3, &f5, &f6, &v, &o1, &o2, &mut out);
        assert_eq!(lhs, out[params::O1..].to_vec());
    }
}
