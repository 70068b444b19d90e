//! SHA-256 chain extender: stretches a single SHA-256 digest into an
//! arbitrary-length byte string by repeatedly re-hashing, used to derive
//! the 48-byte CTR_DRBG seed material from `sk_seed || message digest`.

use sha2::{Digest, Sha256};

/// Fill `out` with `out.len()` bytes derived from `msg`: the first 32 bytes
/// are `SHA256(msg)`, the next 32 are `SHA256(SHA256(msg))`, and so on,
/// truncating the final block as needed.
pub fn extend(out: &mut [u8], msg: &[u8]) {
    let mut block: [u8; 32] = Sha256::digest(msg).into();
    let mut offset = 0;
    loop {
        let n = core::cmp::min(32, out.len() - offset);
        out[offset..offset + n].copy_from_slice(&block[..n]);
        offset += n;
        if offset >= out.len() {
            break;
        }
        block = Sha256::digest(block).into();
    }
}

/// Convenience wrapper returning a fixed 48-byte extension (the length
/// CTR_DRBG seed material needs).
pub fn extend48(msg: &[u8]) -> [u8; 48] {
    let mut out = [0u8; 48];
    extend(&mut out, msg);
    out
}
