use serde::{Deserialize, Serialize};

use chain_btc::network::BtcNetwork;

/// Chains the device can construct transactions for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    Bitcoin,
    BitcoinTestnet,
    Ethereum,
}

impl Chain {
    /// Registered coin id, matching the account record on the device.
    pub fn coin_type(&self) -> u32 {
        match self {
            Chain::Bitcoin => 0,
            Chain::BitcoinTestnet => 1,
            Chain::Ethereum => 60,
        }
    }

    /// Bitcoin network parameters, when this is a Bitcoin chain.
    pub fn btc_network(&self) -> Option<BtcNetwork> {
        match self {
            Chain::Bitcoin => Some(BtcNetwork::Mainnet),
            Chain::BitcoinTestnet => Some(BtcNetwork::Testnet),
            Chain::Ethereum => None,
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Chain::BitcoinTestnet)
    }

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Chain::Bitcoin => "Bitcoin",
            Chain::BitcoinTestnet => "Bitcoin Testnet",
            Chain::Ethereum => "Ethereum",
        }
    }
}

/// BIP derivation purpose of an account; selects the address family its
/// receive addresses render in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Purpose {
    /// Legacy: Base58Check P2PKH for Bitcoin, hex for Ethereum.
    Bip44,
    /// Wrapped-script: Base58Check P2SH.
    Bip49,
    /// Native segwit: bech32.
    Bip84,
}

impl Purpose {
    /// The purpose number as it appears in the account record.
    pub fn value(&self) -> u8 {
        match self {
            Purpose::Bip44 => 44,
            Purpose::Bip49 => 49,
            Purpose::Bip84 => 84,
        }
    }
}

/// Metadata the device reports for the selected account, passed explicitly
/// into address rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMetadata {
    pub chain: Chain,
    pub purpose: Purpose,
}
