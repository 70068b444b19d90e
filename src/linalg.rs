//! Matrix–vector products, triangular quadratic forms, the public-key
//! multi-quadratic evaluator, and in-place Gauss–Jordan inversion — the
//! primitive moves the key-composition and signing state machines compose.
//!
//! Storage conventions used throughout this module and by its callers:
//! - A "scalar matrix" (the S/T linear-map blocks, and any square matrix
//!   handed to `gauss_elim`) is stored **column-major**: `a_width` columns,
//!   each `n_a_vec_byte` bytes tall.
//! - A "batched" array (the central-map F/Q coefficient tables) stores one
//!   `size_batch`-byte vector per logical scalar entry. Dense batched
//!   arrays are row-major (row i holds `a_width` batches); upper-triangular
//!   batched arrays of dimension `d` store row i as the `(d - i)` batches
//!   for columns `j = i..d`.

use crate::{field, params};

/// c <- A . b, where A is stored column-major: `a_width` columns of
/// `c.len()` bytes each. `c` and `b` must not alias (they are disjoint
/// mutable/immutable borrows by construction).
pub fn mat_vec(c: &mut [u8], mat: &[u8], a_width: usize, b: &[u8]) {
    debug_assert_eq!(mat.len(), a_width * c.len());
    debug_assert_eq!(b.len(), a_width);
    c.fill(0);
    for i in 0..a_width {
        let col = &mat[i * c.len()..(i + 1) * c.len()];
        field::madd(c, col, b[i]);
    }
}

/// y <- sum_{i<=j<dim} tri[i,j] * x[i] * x[j], where `tri` is an
/// upper-triangular batched array of dimension `dim` and batch size
/// `y.len()`.
pub fn tri_form(y: &mut [u8], tri: &[u8], x: &[u8], dim: usize) {
    let size_batch = y.len();
    debug_assert_eq!(tri.len(), size_batch * params::tri(dim));
    debug_assert_eq!(x.len(), dim);
    y.fill(0);

    let mut acc = vec![0u8; size_batch];
    let mut ptr = 0usize;
    for i in 0..dim {
        acc.iter_mut().for_each(|b| *b = 0);
        for j in i..dim {
            field::madd(&mut acc, &tri[ptr..ptr + size_batch], x[j]);
            ptr += size_batch;
        }
        field::madd(y, &acc, x[i]);
    }
}

/// z <- x^T . Q . x, evaluated over the packed public key's upper-triangular
/// layout (n = x.len() variables, m = z.len() batch size per coefficient).
/// Rows where x[i] == 0 skip their whole contribution (safe only because
/// this evaluator is only ever run on public input, at verification time).
pub fn mq(z: &mut [u8], pk: &[u8], x: &[u8]) {
    let m = z.len();
    let n = x.len();
    debug_assert_eq!(pk.len(), m * params::tri(n));
    z.fill(0);

    let mut row = vec![0u8; m];
    let mut ptr = 0usize;
    for i in 0..(n - 1) {
        let row_len = m * (n - i);
        if x[i] == 0 {
            ptr += row_len;
            continue;
        }
        row.iter_mut().for_each(|b| *b = 0);
        for j in i..n {
            field::madd(&mut row, &pk[ptr..ptr + m], x[j]);
            ptr += m;
        }
        field::madd(z, &row, x[i]);
    }

    // Final diagonal term: GFMUL(x[n-1], x[n-1]) rather than reusing x[n-1]
    // twice independently, matching the reference bit-for-bit (see
    // DESIGN.md / SPEC_FULL.md §9 open question).
    let last_sq = field::mul(x[n - 1], x[n - 1]);
    field::madd(z, &pk[ptr..ptr + m], last_sq);
}

/// Reduce an h x w matrix (h < 64, 64 < w < 128) in place to reduced
/// row-echelon form. Returns true iff every diagonal pivot was non-zero.
/// The row-selection step is a masked XOR with no branch on the
/// field-element values involved, so this is safe to run on secret
/// intermediate matrices during signing as well as public ones during
/// verification.
pub fn gauss_elim(mat: &mut [u8], h: usize, w: usize) -> bool {
    debug_assert!(w >= h);
    debug_assert_eq!(mat.len(), h * w);

    // Pad every row to a 64-byte multiple so the masked row operations have
    // no ragged tail to special-case.
    let w_pad = ((w + 63) / 64) * 64;
    let mut padded = vec![0u8; h * w_pad];
    for i in 0..h {
        padded[i * w_pad..i * w_pad + w].copy_from_slice(&mat[i * w..(i + 1) * w]);
    }

    let mut success = true;

    for i in 0..h {
        // Masked row selection: XOR row j into row i wherever row i's
        // pivot byte is zero and row j's is not. Evaluated for every j > i
        // unconditionally, so the trace does not depend on which (if any)
        // row supplied a non-zero pivot.
        for j in (i + 1)..h {
            let ai_pivot = padded[i * w_pad + i];
            let aj_pivot = padded[j * w_pad + i];
            let select = (ai_pivot == 0) & (aj_pivot != 0);
            let mask = 0u8.wrapping_sub(select as u8);
            for k in 0..w_pad {
                let aj = padded[j * w_pad + k];
                let ai = padded[i * w_pad + k];
                padded[i * w_pad + k] = ai ^ (aj & mask);
            }
        }

        let pivot = padded[i * w_pad + i];
        success &= pivot != 0;
        let pivot_inv = field::inv(pivot);

        let row_i_start = i * w_pad;
        field::mul_scalar(&mut padded[row_i_start..row_i_start + w_pad], pivot_inv);

        let row_i_copy = padded[row_i_start..row_i_start + w_pad].to_vec();
        for j in 0..h {
            if j == i {
                continue;
            }
            let factor = padded[j * w_pad + i];
            let row_j_start = j * w_pad;
            field::madd(
                &mut padded[row_j_start..row_j_start + w_pad],
                &row_i_copy,
                factor,
            );
        }
    }

    for i in 0..h {
        mat[i * w..(i + 1) * w].copy_from_slice(&padded[i * w_pad..i * w_pad + w]);
    }

    success
}

/// Invert an H x H scalar (column-major) matrix by Gauss-Jordan elimination
/// on the augmented [A | I] system. Returns false (and an unspecified
/// `inv_a`) if `a` was singular.
pub fn mat_inv(inv_a: &mut [u8], a: &[u8], h: usize) -> bool {
    debug_assert_eq!(a.len(), h * h);
    debug_assert_eq!(inv_a.len(), h * h);

    let mut aug = vec![0u8; h * 2 * h];
    for i in 0..h {
        for j in 0..h {
            // a is column-major (column j, row i); the augmented system is
            // row-major [A | I] so row i, column j takes a's (j, i) entry.
            aug[i * 2 * h + j] = a[j * h + i];
        }
        aug[i * 2 * h + h + i] = 1;
    }

    let ok = gauss_elim(&mut aug, h, 2 * h);

    for i in 0..h {
        for j in 0..h {
            // inv_a is column-major too.
            inv_a[j * h + i] = aug[i * 2 * h + h + j];
        }
    }

    ok
}

/// C += Aᵗʳⁱ·B, A upper-triangular batched of dimension `b_height`.
pub fn madd_trimat(
    c: &mut [u8],
    tri_a: &[u8],
    b: &[u8],
    b_height: usize,
    size_b_colvec: usize,
    b_width: usize,
    size_batch: usize,
) {
    let a_height = b_height;
    let mut tri_ptr = 0usize;
    let mut c_ptr = 0usize;
    for i in 0..a_height {
        for j in 0..b_width {
            for k in i..b_height {
                let off = tri_ptr + (k - i) * size_batch;
                let coeff = b[j * size_b_colvec + k];
                field::madd(&mut c[c_ptr..c_ptr + size_batch], &tri_a[off..off + size_batch], coeff);
            }
            c_ptr += size_batch;
        }
        tri_ptr += (a_height - i) * size_batch;
    }
}

/// C += (A upper-tri)ᵀ·B, A upper-triangular batched of dimension `b_height`.
pub fn madd_trimat_tr(
    c: &mut [u8],
    tri_a: &[u8],
    b: &[u8],
    b_height: usize,
    size_b_colvec: usize,
    b_width: usize,
    size_batch: usize,
) {
    let a_height = b_height;
    let mut c_ptr = 0usize;
    for i in 0..a_height {
        for j in 0..b_width {
            for k in 0..=i {
                let idx = params::idx_tri(k, i, a_height);
                let off = idx * size_batch;
                let coeff = b[j * size_b_colvec + k];
                field::madd(&mut c[c_ptr..c_ptr + size_batch], &tri_a[off..off + size_batch], coeff);
            }
            c_ptr += size_batch;
        }
    }
}

/// C += A·B dense, A row-major (`a_height` rows of `b_height` batches).
pub fn madd_mat(
    c: &mut [u8],
    a: &[u8],
    a_height: usize,
    b: &[u8],
    b_height: usize,
    size_b_colvec: usize,
    b_width: usize,
    size_batch: usize,
) {
    let a_width = b_height;
    let mut a_ptr = 0usize;
    let mut c_ptr = 0usize;
    for _i in 0..a_height {
        for j in 0..b_width {
            for k in 0..b_height {
                let off = a_ptr + k * size_batch;
                let coeff = b[j * size_b_colvec + k];
                field::madd(&mut c[c_ptr..c_ptr + size_batch], &a[off..off + size_batch], coeff);
            }
            c_ptr += size_batch;
        }
        a_ptr += a_width * size_batch;
    }
}

/// C += Aᵀ·B, with `a` the scalar column-major matrix (`a_width` columns of
/// `vec_len` bytes) and `b` the row-major batched array (`vec_len` rows of
/// `b_width` batches).
pub fn madd_mat_tr(
    c: &mut [u8],
    a: &[u8],
    vec_len: usize,
    a_width: usize,
    b: &[u8],
    b_width: usize,
    size_batch: usize,
) {
    debug_assert_eq!(a.len(), a_width * vec_len);
    let row_bytes = b_width * size_batch;
    debug_assert_eq!(b.len(), vec_len * row_bytes);

    let mut c_ptr = 0usize;
    for i in 0..a_width {
        let col_off = i * vec_len;
        for j in 0..vec_len {
            let coeff = a[col_off + j];
            let b_off = j * row_bytes;
            field::madd(&mut c[c_ptr..c_ptr + row_bytes], &b[b_off..b_off + row_bytes], coeff);
        }
        c_ptr += row_bytes;
    }
}

/// C += (batched-A)ᵀ·B, where `a` is viewed as `b_height` groups of
/// `a_height` batches each (so each group is one "column" of the
/// conceptual A being transposed), and `b` is the usual scalar column-major
/// matrix (`b_width` columns of `b_height` bytes).
pub fn madd_bmat_tr(
    c: &mut [u8],
    a: &[u8],
    a_height: usize,
    b: &[u8],
    b_height: usize,
    b_width: usize,
    size_batch: usize,
) {
    let chunk_bytes = a_height * size_batch;
    debug_assert_eq!(a.len(), b_height * chunk_bytes);
    debug_assert_eq!(b.len(), b_width * b_height);

    let mut c_ptr = 0usize;
    for i in 0..a_height {
        for j in 0..b_width {
            for k in 0..b_height {
                let off = k * chunk_bytes + i * size_batch;
                let coeff = b[j * b_height + k];
                field::madd(&mut c[c_ptr..c_ptr + size_batch], &a[off..off + size_batch], coeff);
            }
            c_ptr += size_batch;
        }
    }
}

/// Fold a square (dim x dim) dense batched matrix `a` into its
/// upper-triangular sum A + Aᵀ, stored batched. `out_tri` is zeroed first.
pub fn upper_trianglize(out_tri: &mut [u8], a: &[u8], dim: usize, size_batch: usize) {
    debug_assert_eq!(a.len(), dim * dim * size_batch);
    debug_assert_eq!(out_tri.len(), params::tri(dim) * size_batch);
    out_tri.fill(0);

    let mut running = 0usize;
    for i in 0..dim {
        for j in 0..i {
            let idx = params::idx_tri(j, i, dim);
            let off = idx * size_batch;
            let a_off = size_batch * (i * dim + j);
            field::add(&mut out_tri[off..off + size_batch], &a[a_off..a_off + size_batch]);
        }
        let len = size_batch * (dim - i);
        let a_off = size_batch * (i * dim + i);
        field::add(&mut out_tri[running..running + len], &a[a_off..a_off + len]);
        running += len;
    }
}
