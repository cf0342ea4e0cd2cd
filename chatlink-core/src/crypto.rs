//! Verification code derivation
//!
//! Verification codes are derived from activation codes with a keyed hash so that a
//! code can only be produced by a server holding the secret:
//!
//! 1. The activation code is normalized to uppercase
//! 2. `HMAC-SHA256(key = secret, message = activation code)` is computed
//! 3. The first [`VERIFICATION_CODE_BYTES`] bytes are rendered as uppercase hex
//!
//! ## Collisions
//!
//! Truncating to 32 bits keeps the code short enough to type. With a few hundred codes
//! alive inside one validity window the birthday bound is roughly 1 in 2^16. A colliding
//! issuance overwrites the earlier mapping; this is an accepted risk, not a defect.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{
    error::CryptoError,
    record::{ActivationCode, VerificationCode},
};

type HmacSha256 = Hmac<Sha256>;

/// Number of digest bytes kept in a verification code (8 hex characters).
pub const VERIFICATION_CODE_BYTES: usize = 4;

/// Derive the verification code for an activation code.
///
/// Deterministic: the same activation code and secret always yield the same code.
pub fn derive_verification_code(
    secret: &[u8],
    activation: &ActivationCode,
) -> Result<VerificationCode, CryptoError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    mac.update(activation.as_str().as_bytes());
    let digest = mac.finalize().into_bytes();
    Ok(VerificationCode::from_digest_prefix(
        &digest[..VERIFICATION_CODE_BYTES],
    ))
}

/// Perform constant-time comparison of two byte slices.
///
/// Used for shared secrets presented by callers, such as the webhook secret token.
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
