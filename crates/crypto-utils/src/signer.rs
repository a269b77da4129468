use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use zeroize::Zeroize;

use crate::error::SignerError;

/// Recovery-id byte for an even-parity signature (device convention).
pub const RECOVERY_ID_EVEN: u8 = 0x1B;

/// Recovery-id byte for an odd-parity signature.
pub const RECOVERY_ID_ODD: u8 = 0x1C;

/// A raw ECDSA signature as the device returns it: 32-byte R, 32-byte S,
/// and the recovery-id byte V (0x1B or 0x1C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u8,
}

/// Signs 32-byte digests over secp256k1.
///
/// The production implementation lives on the secure element behind the
/// APDU transport; [`SoftwareSigner`] provides the same contract in
/// software. Implementations are synchronous; callers propagate failures
/// verbatim and never retry.
pub trait HashSigner {
    fn sign_hash(&self, digest: &[u8; 32]) -> Result<RecoverableSignature, SignerError>;
}

/// In-process signer over a raw secp256k1 scalar, for hosts and tests
/// without a secure element.
pub struct SoftwareSigner {
    key: SigningKey,
}

impl SoftwareSigner {
    /// Builds a signer from a 32-byte private scalar. The working copy of
    /// the key material is zeroized before returning.
    pub fn from_bytes(private_key: &[u8; 32]) -> Result<Self, SignerError> {
        let mut key_bytes = *private_key;
        let key = SigningKey::from_bytes((&key_bytes).into())
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        key_bytes.zeroize();
        Ok(Self { key })
    }

    /// The 33-byte compressed public key for this signer.
    pub fn public_key(&self) -> [u8; 33] {
        let point = self.key.verifying_key().to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(point.as_bytes());
        out
    }
}

impl HashSigner for SoftwareSigner {
    fn sign_hash(&self, digest: &[u8; 32]) -> Result<RecoverableSignature, SignerError> {
        let (signature, recovery_id): (Signature, RecoveryId) = self
            .key
            .sign_prehash(digest.as_slice())
            .map_err(|e| SignerError::Failed(e.to_string()))?;

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&signature.r().to_bytes());
        s.copy_from_slice(&signature.s().to_bytes());

        let v = if recovery_id.is_y_odd() {
            RECOVERY_ID_ODD
        } else {
            RECOVERY_ID_EVEN
        };

        Ok(RecoverableSignature { r, s, v })
    }
}
