use thiserror::Error;

use crypto_utils::error::SignerError;

/// Ethereum transaction-construction and address-codec errors.
#[derive(Debug, Error)]
pub enum EthError {
    /// A pre-encoded RLP field fails its shape check.
    #[error("invalid rlp field: {0}")]
    InvalidField(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The summed field sizes exceed the fixed work area.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// The declared list length disagrees with the emitted payload.
    #[error("encoding error: {0}")]
    EncodingError(String),

    /// The signer returned a recovery id outside 0x1B/0x1C.
    #[error("unexpected recovery id 0x{0:02x}")]
    InvalidRecoveryId(u8),

    /// Device signer failure, propagated verbatim.
    #[error("signing failed: {0}")]
    Signer(#[from] SignerError),
}
