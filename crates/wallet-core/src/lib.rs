//! # wallet-core
//!
//! Account metadata types and the multi-format address codec sitting above
//! the per-chain crates: decode any supported address string into spendable
//! script bytes, and render an account's receive address from its public
//! key and metadata. Transaction construction itself lives in `chain-btc`
//! and `chain-eth`.

pub mod address;
pub mod error;
pub mod types;

pub use address::{decode_address, receive_address};
pub use error::WalletError;
pub use types::{AccountMetadata, Chain, Purpose};
