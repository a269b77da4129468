use bech32::{self, ToBase32, Variant};

use crate::error::BtcError;
use crate::network::BtcNetwork;

/// Legacy (Base58Check) address families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyFormat {
    P2pkh,
    P2sh,
}

/// `OP_DUP OP_HASH160 <20-byte hash> OP_EQUALVERIFY OP_CHECKSIG`
pub fn p2pkh_script(hash: &[u8; 20]) -> Vec<u8> {
    let mut script = Vec::with_capacity(25);
    script.extend_from_slice(&[0x76, 0xA9, 0x14]);
    script.extend_from_slice(hash);
    script.extend_from_slice(&[0x88, 0xAC]);
    script
}

/// `OP_HASH160 <20-byte hash> OP_EQUAL`
pub fn p2sh_script(hash: &[u8; 20]) -> Vec<u8> {
    let mut script = Vec::with_capacity(23);
    script.extend_from_slice(&[0xA9, 0x14]);
    script.extend_from_slice(hash);
    script.push(0x87);
    script
}

/// Encodes a native-segwit scriptPubKey (`OP_0 <push> <program>`) as a
/// bech32 address.
pub fn segwit_script_to_address(script: &[u8], network: BtcNetwork) -> Result<String, BtcError> {
    if script.len() < 4 {
        return Err(BtcError::InvalidAddress(format!(
            "witness script of {} bytes is below the minimum",
            script.len()
        )));
    }
    if script[0] != 0x00 {
        return Err(BtcError::UnsupportedScript(format!(
            "witness version opcode 0x{:02x}, only version 0 is supported",
            script[0]
        )));
    }
    let program = &script[2..];
    if script[1] as usize != program.len() || (program.len() != 20 && program.len() != 32) {
        return Err(BtcError::UnsupportedScript(format!(
            "witness program push 0x{:02x} over {} bytes",
            script[1],
            program.len()
        )));
    }

    let version =
        bech32::u5::try_from_u8(0).map_err(|e| BtcError::InvalidAddress(e.to_string()))?;
    let mut data = vec![version];
    data.extend(program.to_base32());

    bech32::encode(network.bech32_hrp(), data, Variant::Bech32)
        .map_err(|e| BtcError::InvalidAddress(e.to_string()))
}

/// Decodes a bech32 address back into its native-segwit scriptPubKey.
pub fn segwit_address_to_script(addr: &str, network: BtcNetwork) -> Result<Vec<u8>, BtcError> {
    let (hrp, data, variant) =
        bech32::decode(addr).map_err(|e| BtcError::InvalidAddress(e.to_string()))?;
    if hrp != network.bech32_hrp() {
        return Err(BtcError::InvalidAddress(format!(
            "prefix {hrp} does not match the {network} network"
        )));
    }
    if variant != Variant::Bech32 {
        return Err(BtcError::UnsupportedScript(
            "bech32m addresses are not supported".into(),
        ));
    }
    let version = data
        .first()
        .ok_or_else(|| BtcError::InvalidAddress("empty witness payload".into()))?
        .to_u8();
    if version != 0 {
        return Err(BtcError::UnsupportedScript(format!(
            "witness version {version}, only version 0 is supported"
        )));
    }

    let program = bech32::convert_bits(&data[1..], 5, 8, false)
        .map_err(|e| BtcError::InvalidAddress(e.to_string()))?;
    if program.len() != 20 && program.len() != 32 {
        return Err(BtcError::InvalidAddress(format!(
            "witness program of {} bytes",
            program.len()
        )));
    }

    let mut script = Vec::with_capacity(program.len() + 2);
    script.push(0x00);
    script.push(program.len() as u8);
    script.extend_from_slice(&program);
    Ok(script)
}

/// Encodes a 20-byte hash as a Base58Check legacy address, version byte
/// chosen by network and format.
pub fn legacy_hash_to_address(hash: &[u8; 20], format: LegacyFormat, network: BtcNetwork) -> String {
    let version = match format {
        LegacyFormat::P2pkh => network.p2pkh_version(),
        LegacyFormat::P2sh => network.p2sh_version(),
    };
    let mut payload = Vec::with_capacity(21);
    payload.push(version);
    payload.extend_from_slice(hash);
    bs58::encode(payload).with_check().into_string()
}

/// Decodes a Base58Check legacy address into its template scriptPubKey.
///
/// The checksum is the first four bytes of the double SHA-256 over the
/// version byte and hash; a mismatch rejects the address. The version byte
/// selects the template: 0x00/0x6F yields P2PKH, 0x05/0xC4 yields P2SH,
/// anything else is unsupported.
pub fn legacy_address_to_script(addr: &str) -> Result<Vec<u8>, BtcError> {
    let payload = bs58::decode(addr)
        .with_check(None)
        .into_vec()
        .map_err(|e| BtcError::InvalidAddress(format!("base58check decode failed: {e}")))?;
    if payload.len() != 21 {
        return Err(BtcError::InvalidAddress(format!(
            "expected 21 payload bytes, got {}",
            payload.len()
        )));
    }

    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);
    match payload[0] {
        0x00 | 0x6F => Ok(p2pkh_script(&hash)),
        0x05 | 0xC4 => Ok(p2sh_script(&hash)),
        version => Err(BtcError::InvalidAddress(format!(
            "unsupported version byte 0x{version:02x}"
        ))),
    }
}
