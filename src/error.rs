use thiserror::Error;

/// Errors this crate's public API can return.
#[derive(Debug, Error)]
pub enum RainbowError {
    #[error("signing failed after exhausting the vinegar/salt resampling budget")]
    SigningFailed,

    #[error("signature verification failed")]
    VerificationFailed,

    #[error("invalid encoding: expected {expected} bytes, got {actual}")]
    InvalidEncoding { expected: usize, actual: usize },

    #[error("invalid digest length: expected {expected} bytes, got {actual}")]
    InvalidDigestLength { expected: usize, actual: usize },
}

pub type Result<T> = core::result::Result<T, RainbowError>;
