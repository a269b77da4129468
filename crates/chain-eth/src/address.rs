use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::{EncodedPoint, PublicKey};

use crypto_utils::digest::keccak256;

use crate::error::EthError;

/// Applies the EIP-55 mixed-case checksum to a raw 20-byte address hash.
///
/// The Keccak-256 of the lowercase hex string drives the casing: a letter
/// is uppercased when its nibble in the digest is 8 or more.
pub fn encode_address(hash: &[u8; 20]) -> String {
    let hex_part = hex::encode(hash);
    let digest = keccak256(hex_part.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in hex_part.chars().enumerate() {
        if c.is_ascii_digit() {
            out.push(c);
        } else {
            let nibble = (digest[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0F;
            if nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
    }
    out
}

/// Decodes an EIP-55 address into its raw 20-byte hash.
///
/// The checksum casing is verified strictly: every one of the 40 hex
/// characters must carry exactly the case the Keccak-256 of the lowercase
/// hex string mandates, so flipping a single letter rejects the address.
/// The output carries no script wrapper; the caller owns the wrapping
/// opcodes.
pub fn decode_address(address: &str) -> Result<[u8; 20], EthError> {
    let hex_part = address.strip_prefix("0x").ok_or_else(|| {
        EthError::InvalidAddress("address must start with 0x".into())
    })?;
    if hex_part.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    let lowered = hex_part.to_lowercase();
    let bytes = hex::decode(&lowered)
        .map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;

    let digest = keccak256(lowered.as_bytes());
    for (i, c) in hex_part.chars().enumerate() {
        if c.is_ascii_digit() {
            continue;
        }
        let nibble = (digest[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0F;
        let wants_upper = nibble >= 8;
        if wants_upper != c.is_ascii_uppercase() {
            return Err(EthError::InvalidAddress(format!(
                "EIP-55 case mismatch at character {i}"
            )));
        }
    }

    let mut hash = [0u8; 20];
    hash.copy_from_slice(&bytes);
    Ok(hash)
}

/// Derives the EIP-55 address for a 33-byte compressed secp256k1 public
/// key: decompress, Keccak-256 the 64-byte point, take the last 20 bytes.
pub fn pubkey_to_address(pubkey: &[u8; 33]) -> Result<String, EthError> {
    let encoded = EncodedPoint::from_bytes(pubkey)
        .map_err(|e| EthError::InvalidPublicKey(format!("invalid key encoding: {e}")))?;

    let key: Option<PublicKey> = PublicKey::from_encoded_point(&encoded).into();
    let key = key.ok_or_else(|| {
        EthError::InvalidPublicKey("point is not on the secp256k1 curve".into())
    })?;

    let uncompressed = key.to_encoded_point(false);
    let digest = keccak256(&uncompressed.as_bytes()[1..]);

    let mut hash = [0u8; 20];
    hash.copy_from_slice(&digest[12..]);
    Ok(encode_address(&hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test vectors from EIP-55.
    const CHECKSUM_CASES: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn encode_matches_eip55_vectors() {
        for expected in CHECKSUM_CASES {
            let hash: [u8; 20] = hex::decode(expected[2..].to_lowercase())
                .unwrap()
                .try_into()
                .unwrap();
            assert_eq!(encode_address(&hash), expected);
        }
    }

    #[test]
    fn decode_accepts_checksummed_vectors() {
        for addr in CHECKSUM_CASES {
            let hash = decode_address(addr).unwrap();
            assert_eq!(hex::encode(hash), addr[2..].to_lowercase());
        }
    }

    #[test]
    fn decode_roundtrips_encode() {
        let hash = [0x42u8; 20];
        let addr = encode_address(&hash);
        assert_eq!(decode_address(&addr).unwrap(), hash);
    }

    #[test]
    fn flipping_any_letter_case_fails_decode() {
        for addr in CHECKSUM_CASES {
            for i in 2..addr.len() {
                let c = addr.as_bytes()[i] as char;
                if !c.is_ascii_alphabetic() {
                    continue;
                }
                let mut mutated = addr.to_string();
                let flipped = if c.is_ascii_uppercase() {
                    c.to_ascii_lowercase()
                } else {
                    c.to_ascii_uppercase()
                };
                mutated.replace_range(i..i + 1, &flipped.to_string());
                assert!(
                    decode_address(&mutated).is_err(),
                    "case flip at {i} in {addr} must be rejected"
                );
            }
        }
    }

    #[test]
    fn all_lowercase_form_of_mixed_address_fails() {
        let lower = format!("0x{}", &CHECKSUM_CASES[0][2..].to_lowercase());
        assert!(decode_address(&lower).is_err());
    }

    #[test]
    fn missing_prefix_fails() {
        assert!(decode_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
    }

    #[test]
    fn short_address_fails() {
        assert!(decode_address("0x5aAeb6053F").is_err());
    }

    #[test]
    fn non_hex_characters_fail() {
        assert!(decode_address("0xZZAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
    }

    #[test]
    fn pubkey_to_address_known_vector() {
        // Compressed public key of private key 1; its address is the
        // well-known 0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf.
        let pubkey: [u8; 33] =
            hex::decode("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798")
                .unwrap()
                .try_into()
                .unwrap();
        assert_eq!(
            pubkey_to_address(&pubkey).unwrap(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn off_curve_pubkey_fails() {
        let mut pubkey = [0u8; 33];
        pubkey[0] = 0x02;
        assert!(pubkey_to_address(&pubkey).is_err());
    }
}
