//! Bitcoin transaction construction and address codec.
//!
//! Builds byte-exact segwit transactions from raw input/output records: the
//! BIP143 signature-hash engine, the assembler for single-key and
//! pre-signed multisig spends, and the Bech32/Base58Check address codec.
//! Signing itself is delegated to a [`crypto_utils::signer::HashSigner`].

pub mod address;
pub mod error;
pub mod network;
pub mod record;
pub mod sighash;
pub mod transaction;
