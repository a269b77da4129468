//! Ethereum transaction construction and address codec.
//!
//! Builds signed EIP-1559 (type 2) transactions from pre-RLP-encoded
//! fields, and converts between EIP-55 checksummed addresses and raw
//! 20-byte hashes. Signing is delegated to a
//! [`crypto_utils::signer::HashSigner`].

pub mod address;
pub mod error;
pub mod rlp;
pub mod transaction;
