//! A pure-Rust implementation of a two-layer unbalanced oil-and-vinegar
//! (Rainbow) multivariate-quadratic signature scheme over GF(2^8), with
//! parameters (v1, o1, o2) = (68, 36, 36).
//!
//! ```
//! let (pk, sk) = rainbow_core::keypair(&[7u8; 32]);
//! let digest = [0u8; 48];
//! let sig = rainbow_core::sign(&sk, &digest).unwrap();
//! assert!(rainbow_core::verify(&pk, &digest, &sig).is_ok());
//! ```

mod basis;
mod central;
mod drbg;
mod error;
mod field;
mod hash;
mod keypair;
mod linalg;
mod params;
mod sign;
mod verify;

pub use error::{RainbowError, Result};
pub use keypair::{keypair, PublicKey, SecretKey};
pub use params::{HASH_LEN, PK_LEN, SEED_LEN, SIG_LEN, SK_LEN};
pub use sign::sign;
pub use verify::verify;
