use thiserror::Error;

use chain_btc::error::BtcError;
use chain_eth::error::EthError;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unsupported account: {0}")]
    UnsupportedAccount(String),

    #[error("transaction build failed: {0}")]
    TransactionFailed(String),
}

impl From<BtcError> for WalletError {
    fn from(e: BtcError) -> Self {
        match e {
            BtcError::InvalidAddress(_) | BtcError::UnsupportedScript(_) => {
                WalletError::InvalidAddress(format!("BTC: {e}"))
            }
            _ => WalletError::TransactionFailed(format!("BTC: {e}")),
        }
    }
}

impl From<EthError> for WalletError {
    fn from(e: EthError) -> Self {
        match e {
            EthError::InvalidAddress(_) | EthError::InvalidPublicKey(_) => {
                WalletError::InvalidAddress(format!("ETH: {e}"))
            }
            _ => WalletError::TransactionFailed(format!("ETH: {e}")),
        }
    }
}
