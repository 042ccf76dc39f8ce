//! Signature hook.
//!
//! Paths may carry a 10 character signature segment. Whether a token is
//! acceptable is decided by a [`SignatureValidator`]. The bundled
//! [`AcceptAllSignatures`] accepts every request, with or without a token,
//! whatever the "signatures in use" flag says. No verification scheme is
//! defined for the token yet.

use crate::error::AuthError;

/// Decides whether a request's signature token is acceptable.
pub trait SignatureValidator: Send + Sync {
    /// `token` is the signature segment of the path, `signatures_in_use`
    /// the configured enforcement flag.
    fn validate(&self, token: Option<&str>, signatures_in_use: bool) -> Result<(), AuthError>;
}

/// Validator that accepts every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllSignatures;

impl SignatureValidator for AcceptAllSignatures {
    fn validate(&self, _token: Option<&str>, _signatures_in_use: bool) -> Result<(), AuthError> {
        Ok(())
    }
}
