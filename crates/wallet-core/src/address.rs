use chain_btc::address::{self as btc_address, LegacyFormat};
use chain_btc::network::BtcNetwork;
use chain_eth::address as eth_address;
use crypto_utils::digest::hash160;

use crate::error::WalletError;
use crate::types::{AccountMetadata, Chain, Purpose};

/// Converts a display address into spendable script bytes.
///
/// Dispatch is by prefix, the way the device does it: `0x` selects the
/// Ethereum path (yielding the raw 20-byte hash, no script wrapper), a
/// known bech32 human-readable part selects native segwit (yielding the
/// witness scriptPubKey), and anything else is tried as Base58Check
/// (yielding the legacy template script).
pub fn decode_address(address: &str) -> Result<Vec<u8>, WalletError> {
    if address.is_empty() {
        return Err(WalletError::InvalidAddress("empty address".into()));
    }
    if address.starts_with("0x") {
        return Ok(eth_address::decode_address(address)?.to_vec());
    }
    for network in [BtcNetwork::Mainnet, BtcNetwork::Testnet] {
        if address.starts_with(network.bech32_hrp()) {
            return Ok(btc_address::segwit_address_to_script(address, network)?);
        }
    }
    Ok(btc_address::legacy_address_to_script(address)?)
}

/// Renders the display address for an account's receive public key.
///
/// The account's derivation purpose selects the family: BIP-84 renders
/// native segwit over `hash160(pubkey)`, BIP-49 a P2SH Base58Check
/// address, BIP-44 a legacy P2PKH address for Bitcoin or the EIP-55 form
/// for Ethereum.
pub fn receive_address(
    pubkey: &[u8; 33],
    meta: &AccountMetadata,
) -> Result<String, WalletError> {
    if let Some(network) = meta.chain.btc_network() {
        let hash = hash160(pubkey);
        match meta.purpose {
            Purpose::Bip84 => {
                let mut script = Vec::with_capacity(22);
                script.push(0x00);
                script.push(0x14);
                script.extend_from_slice(&hash);
                Ok(btc_address::segwit_script_to_address(&script, network)?)
            }
            Purpose::Bip44 => Ok(btc_address::legacy_hash_to_address(
                &hash,
                LegacyFormat::P2pkh,
                network,
            )),
            Purpose::Bip49 => Ok(btc_address::legacy_hash_to_address(
                &hash,
                LegacyFormat::P2sh,
                network,
            )),
        }
    } else {
        match (meta.chain, meta.purpose) {
            (Chain::Ethereum, Purpose::Bip44) => Ok(eth_address::pubkey_to_address(pubkey)?),
            (chain, purpose) => Err(WalletError::UnsupportedAccount(format!(
                "purpose {} on {}",
                purpose.value(),
                chain.display_name()
            ))),
        }
    }
}
