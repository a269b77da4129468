//! # crypto-utils
//!
//! Shared low-level building blocks for the transaction-construction crates:
//! the hash primitives (double SHA-256, Keccak-256, Hash160), the
//! device-signer abstraction with a software implementation, and the
//! bounds-checked byte reader used by every wire-format parser.

pub mod bytes;
pub mod digest;
pub mod error;
pub mod signer;

pub use error::{CryptoError, SignerError};
