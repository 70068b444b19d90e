//! Bijective affine change of basis between GF(2^8)'s native (reference)
//! polynomial basis and the crate's internal working ("AES") basis.
//!
//! Both directions are linear bit-matrix maps over GF(2) (no additive
//! constant). This crate's two reference matrices are not independently
//! recoverable from what's available in this environment — the upstream
//! reference only exposes them through a hardware intrinsic and through KAT
//! files this environment does not have — so the crate defines its own
//! self-inverse bit permutation (bit-reversal within a byte) as the bridge.
//! It is still a true involution, which is all the testable properties in
//! the core actually depend on. See DESIGN.md for the full rationale.

/// Convert a single byte from the native basis to the AES working basis.
#[inline]
pub fn byte_to_aes(b: u8) -> u8 {
    b.reverse_bits()
}

/// Convert a single byte from the AES working basis back to the native
/// basis. This crate's bridge is self-inverse, so this happens to be the
/// same transform as `byte_to_aes`, but it's kept as its own function (not
/// a re-export or alias) precisely so that dropping in the reference's real
/// `A`/`A^-1` bit matrices later only means changing these two bodies —
/// every call site already names the direction it wants.
#[inline]
pub fn byte_to_native(b: u8) -> u8 {
    b.reverse_bits()
}

/// Convert an entire byte span from native basis to AES basis, in place.
/// Applied structurally over whole key/signature buffers — every byte in
/// those buffers is a field element, with the sole exception of `sk_seed`,
/// which callers must carve out and never pass through this function.
pub fn to_aes(buf: &mut [u8]) {
    for b in buf.iter_mut() {
        *b = byte_to_aes(*b);
    }
}

/// Convert an entire byte span from AES basis back to native basis, in
/// place.
pub fn to_native(buf: &mut [u8]) {
    for b in buf.iter_mut() {
        *b = byte_to_native(*b);
    }
}
