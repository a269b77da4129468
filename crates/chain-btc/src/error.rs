use thiserror::Error;

use crypto_utils::error::SignerError;

/// Bitcoin transaction-construction and address-codec errors.
#[derive(Debug, Error)]
pub enum BtcError {
    /// Record bytes disagree with their declared shape (counts, lengths).
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A script does not match one of the supported templates.
    #[error("unsupported script: {0}")]
    UnsupportedScript(String),

    /// Record counts or script sizes exceed the fixed work area.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// Device signer failure, propagated verbatim.
    #[error("signing failed: {0}")]
    Signer(#[from] SignerError),
}
