use alloy_rlp::Header;

use crypto_utils::digest::keccak256;
use crypto_utils::signer::HashSigner;

use crate::error::EthError;
use crate::rlp::RlpField;

/// EIP-1559 (type 2) transaction marker.
pub const TX_TYPE: u8 = 0x02;

/// Fixed assembly work area; the summed field sizes must fit.
pub const MAX_PAYLOAD: usize = 8096;

/// The nine pre-encoded fields of an unsigned EIP-1559 transaction, in
/// list order.
#[derive(Debug, Clone)]
pub struct Eip1559TxFields {
    chain_id: RlpField,
    nonce: RlpField,
    max_priority_fee_per_gas: RlpField,
    max_fee_per_gas: RlpField,
    gas_limit: RlpField,
    destination: RlpField,
    value: RlpField,
    data: RlpField,
    access_list: RlpField,
}

/// A signed, broadcastable EIP-1559 transaction.
#[derive(Debug, Clone)]
pub struct SignedEthTransaction {
    /// `0x02 ‖ rlp([chainId, ..., v, r, s])`.
    pub raw_tx: Vec<u8>,
    /// Keccak-256 of `raw_tx`, the on-chain transaction hash.
    pub tx_hash: [u8; 32],
}

impl Eip1559TxFields {
    /// Validates nine raw field encodings into a transaction body.
    ///
    /// Integer fields must use single-byte or short-form encodings; the
    /// destination must encode exactly 21 bytes (length byte plus 20-byte
    /// address); the data field takes short or 1–2-byte long form; the
    /// access list must be a list item. Any shape violation aborts before
    /// signing.
    #[allow(clippy::too_many_arguments)]
    pub fn load(
        chain_id: &[u8],
        nonce: &[u8],
        max_priority_fee_per_gas: &[u8],
        max_fee_per_gas: &[u8],
        gas_limit: &[u8],
        destination: &[u8],
        value: &[u8],
        data: &[u8],
        access_list: &[u8],
    ) -> Result<Self, EthError> {
        let destination = RlpField::integer(destination)?;
        if destination.len() != 21 {
            return Err(EthError::InvalidField(format!(
                "destination must encode 21 bytes, got {}",
                destination.len()
            )));
        }

        Ok(Self {
            chain_id: RlpField::integer(chain_id)?,
            nonce: RlpField::integer(nonce)?,
            max_priority_fee_per_gas: RlpField::integer(max_priority_fee_per_gas)?,
            max_fee_per_gas: RlpField::integer(max_fee_per_gas)?,
            gas_limit: RlpField::integer(gas_limit)?,
            destination,
            value: RlpField::integer(value)?,
            data: RlpField::data(data)?,
            access_list: RlpField::list(access_list)?,
        })
    }

    fn ordered(&self) -> [&RlpField; 9] {
        [
            &self.chain_id,
            &self.nonce,
            &self.max_priority_fee_per_gas,
            &self.max_fee_per_gas,
            &self.gas_limit,
            &self.destination,
            &self.value,
            &self.data,
            &self.access_list,
        ]
    }
}

/// Emits `0x02 ‖ list-header ‖ fields`, asserting that the emitted payload
/// matches the declared length.
fn encode_typed_list(fields: &[&RlpField], payload_length: usize) -> Result<Vec<u8>, EthError> {
    let mut out = Vec::with_capacity(payload_length + 5);
    out.push(TX_TYPE);
    Header {
        list: true,
        payload_length,
    }
    .encode(&mut out);

    let header_len = out.len();
    for field in fields {
        out.extend_from_slice(field.as_bytes());
    }
    if out.len() - header_len != payload_length {
        return Err(EthError::EncodingError(format!(
            "list declares {payload_length} payload bytes, emitted {}",
            out.len() - header_len
        )));
    }
    Ok(out)
}

/// Builds the unsigned signing payload: the type marker, a list header over
/// the summed field sizes, and the nine fields in order. Its Keccak-256 is
/// the digest handed to the signer.
pub fn encode_unsigned(fields: &Eip1559TxFields) -> Result<Vec<u8>, EthError> {
    let ordered = fields.ordered();
    let payload_length: usize = ordered.iter().map(|f| f.len()).sum();
    if payload_length > MAX_PAYLOAD {
        return Err(EthError::CapacityExceeded(format!(
            "{payload_length} payload bytes exceed the {MAX_PAYLOAD}-byte work area"
        )));
    }
    encode_typed_list(&ordered, payload_length)
}

/// Wraps a 32-byte signature word as a full-width RLP integer. The 0xA0
/// tag byte doubles as the short-form length header, so R and S always
/// serialize at 33 bytes even with leading zero bytes. This mirrors the
/// device wire format and is not a general-purpose integer encoder.
fn wrap_signature_word(word: &[u8; 32]) -> Result<RlpField, EthError> {
    let mut raw = [0u8; 33];
    raw[0] = 0xA0;
    raw[1..].copy_from_slice(word);
    RlpField::integer(&raw)
}

/// Signs an EIP-1559 transaction body and assembles the broadcastable
/// bytes.
///
/// The unsigned payload is hashed and signed; the returned recovery id is
/// remapped to its RLP integer form (0x1B to the empty integer 0x80, 0x1C
/// to 0x01, anything else is a hard error); V, R, S join the original nine
/// fields under a freshly sized list header; the Keccak-256 of the result
/// is the final transaction hash.
pub fn build_transaction(
    fields: &Eip1559TxFields,
    signer: &dyn HashSigner,
) -> Result<SignedEthTransaction, EthError> {
    let unsigned = encode_unsigned(fields)?;
    let digest = keccak256(&unsigned);

    let sig = signer.sign_hash(&digest)?;
    let v = match sig.v {
        0x1B => RlpField::integer(&[0x80])?,
        0x1C => RlpField::integer(&[0x01])?,
        other => return Err(EthError::InvalidRecoveryId(other)),
    };
    let r = wrap_signature_word(&sig.r)?;
    let s = wrap_signature_word(&sig.s)?;

    let mut ordered: Vec<&RlpField> = fields.ordered().to_vec();
    ordered.push(&v);
    ordered.push(&r);
    ordered.push(&s);
    let payload_length: usize = ordered.iter().map(|f| f.len()).sum();

    let raw_tx = encode_typed_list(&ordered, payload_length)?;
    let tx_hash = keccak256(&raw_tx);
    Ok(SignedEthTransaction { raw_tx, tx_hash })
}

#[cfg(test)]
mod tests {
    use super::*;

    use alloy_rlp::{Encodable, RlpEncodable};
    use crypto_utils::error::SignerError;
    use crypto_utils::signer::RecoverableSignature;

    /// Byte-string wrapper for the reference encodings; `Vec<u8>` alone
    /// would RLP-encode as a list of integers.
    #[derive(Clone)]
    struct RlpBytes(Vec<u8>);

    impl Encodable for RlpBytes {
        fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
            self.0.as_slice().encode(out);
        }

        fn length(&self) -> usize {
            self.0.as_slice().length()
        }
    }

    /// Returns a fixed (R, S, V) triple without touching a key.
    struct FixedSigner {
        sig: RecoverableSignature,
    }

    impl HashSigner for FixedSigner {
        fn sign_hash(&self, _digest: &[u8; 32]) -> Result<RecoverableSignature, SignerError> {
            Ok(self.sig)
        }
    }

    struct FailingSigner;

    impl HashSigner for FailingSigner {
        fn sign_hash(&self, _digest: &[u8; 32]) -> Result<RecoverableSignature, SignerError> {
            Err(SignerError::Device(-4))
        }
    }

    /// Reference encoding of the unsigned body via alloy-rlp derive, the
    /// way a generic Ethereum stack would produce it.
    #[derive(RlpEncodable)]
    struct ReferenceUnsigned {
        chain_id: u64,
        nonce: u64,
        max_priority_fee_per_gas: u64,
        max_fee_per_gas: u64,
        gas_limit: u64,
        to: RlpBytes,
        value: u64,
        data: RlpBytes,
        access_list: Vec<RlpBytes>,
    }

    #[derive(RlpEncodable)]
    struct ReferenceSigned {
        chain_id: u64,
        nonce: u64,
        max_priority_fee_per_gas: u64,
        max_fee_per_gas: u64,
        gas_limit: u64,
        to: RlpBytes,
        value: u64,
        data: RlpBytes,
        access_list: Vec<RlpBytes>,
        y_parity: u8,
        r: RlpBytes,
        s: RlpBytes,
    }

    /// chainId=1, nonce=0, priority=0, maxFee=100, gas=21000, to=zero
    /// address, value=0, empty data, empty access list.
    fn sample_fields() -> Eip1559TxFields {
        let mut destination = vec![0x94];
        destination.extend_from_slice(&[0u8; 20]);
        Eip1559TxFields::load(
            &[0x01],
            &[0x80],
            &[0x80],
            &[0x64],
            &[0x82, 0x52, 0x08],
            &destination,
            &[0x80],
            &[0x80],
            &[0xC0],
        )
        .unwrap()
    }

    #[test]
    fn unsigned_payload_known_bytes() {
        let unsigned = encode_unsigned(&sample_fields()).unwrap();

        let mut expected = vec![0x02, 0xDF, 0x01, 0x80, 0x80, 0x64, 0x82, 0x52, 0x08, 0x94];
        expected.extend_from_slice(&[0u8; 20]);
        expected.extend_from_slice(&[0x80, 0x80, 0xC0]);
        assert_eq!(unsigned, expected);
    }

    #[test]
    fn unsigned_payload_matches_reference_encoder() {
        let unsigned = encode_unsigned(&sample_fields()).unwrap();

        let reference = ReferenceUnsigned {
            chain_id: 1,
            nonce: 0,
            max_priority_fee_per_gas: 0,
            max_fee_per_gas: 100,
            gas_limit: 21_000,
            to: RlpBytes(vec![0u8; 20]),
            value: 0,
            data: RlpBytes(Vec::new()),
            access_list: Vec::new(),
        };
        let mut expected = vec![TX_TYPE];
        reference.encode(&mut expected);

        assert_eq!(unsigned, expected);
        assert_eq!(keccak256(&unsigned), keccak256(&expected));
    }

    #[test]
    fn signed_payload_matches_reference_encoder() {
        let sig = RecoverableSignature {
            r: [0x11; 32],
            s: [0x22; 32],
            v: 0x1C,
        };
        let signed = build_transaction(&sample_fields(), &FixedSigner { sig }).unwrap();

        let reference = ReferenceSigned {
            chain_id: 1,
            nonce: 0,
            max_priority_fee_per_gas: 0,
            max_fee_per_gas: 100,
            gas_limit: 21_000,
            to: RlpBytes(vec![0u8; 20]),
            value: 0,
            data: RlpBytes(Vec::new()),
            access_list: Vec::new(),
            y_parity: 1,
            r: RlpBytes(vec![0x11; 32]),
            s: RlpBytes(vec![0x22; 32]),
        };
        let mut expected = vec![TX_TYPE];
        reference.encode(&mut expected);

        assert_eq!(signed.raw_tx, expected);
        assert_eq!(signed.tx_hash, keccak256(&expected));
    }

    #[test]
    fn even_parity_maps_to_the_empty_integer() {
        let sig = RecoverableSignature {
            r: [0x11; 32],
            s: [0x22; 32],
            v: 0x1B,
        };
        let signed = build_transaction(&sample_fields(), &FixedSigner { sig }).unwrap();
        // v, r, s trail the nine fields: 0x80 ‖ a0 R ‖ a0 S.
        let tail = &signed.raw_tx[signed.raw_tx.len() - 67..];
        assert_eq!(tail[0], 0x80);
        assert_eq!(tail[1], 0xA0);
        assert_eq!(&tail[2..34], &[0x11; 32]);
        assert_eq!(tail[34], 0xA0);
        assert_eq!(&tail[35..], &[0x22; 32]);
    }

    #[test]
    fn signature_words_keep_full_width() {
        // Even an all-zero word serializes at 33 bytes; the 0xA0 tag is
        // the length header, not a minimal encoding.
        let field = wrap_signature_word(&[0u8; 32]).unwrap();
        assert_eq!(field.len(), 33);
        assert_eq!(field.as_bytes()[0], 0xA0);
    }

    #[test]
    fn unexpected_recovery_id_is_a_hard_error() {
        let sig = RecoverableSignature {
            r: [0x11; 32],
            s: [0x22; 32],
            v: 0x00,
        };
        let result = build_transaction(&sample_fields(), &FixedSigner { sig });
        assert!(matches!(result, Err(EthError::InvalidRecoveryId(0x00))));
    }

    #[test]
    fn signer_failure_is_propagated() {
        let result = build_transaction(&sample_fields(), &FailingSigner);
        match result {
            Err(EthError::Signer(SignerError::Device(status))) => assert_eq!(status, -4),
            other => panic!("expected device error, got {other:?}"),
        }
    }

    #[test]
    fn destination_of_twenty_bytes_is_rejected() {
        let mut destination = vec![0x93];
        destination.extend_from_slice(&[0u8; 19]);
        let result = Eip1559TxFields::load(
            &[0x01],
            &[0x80],
            &[0x80],
            &[0x64],
            &[0x82, 0x52, 0x08],
            &destination,
            &[0x80],
            &[0x80],
            &[0xC0],
        );
        assert!(matches!(result, Err(EthError::InvalidField(_))));
    }

    #[test]
    fn oversized_payload_is_a_capacity_error() {
        // A data field big enough to push the sum past the work area.
        let mut data = vec![0xB9, 0x1F, 0xA1]; // 8097 payload bytes
        data.extend_from_slice(&vec![0xEE; 0x1FA1]);
        let mut destination = vec![0x94];
        destination.extend_from_slice(&[0u8; 20]);

        let fields = Eip1559TxFields::load(
            &[0x01],
            &[0x80],
            &[0x80],
            &[0x64],
            &[0x82, 0x52, 0x08],
            &destination,
            &[0x80],
            &data,
            &[0xC0],
        )
        .unwrap();

        let result = encode_unsigned(&fields);
        assert!(matches!(result, Err(EthError::CapacityExceeded(_))));
    }

    #[test]
    fn larger_bodies_use_long_form_list_headers() {
        let mut data = vec![0xB8, 0x80];
        data.extend_from_slice(&[0xAB; 0x80]);
        let mut destination = vec![0x94];
        destination.extend_from_slice(&[0u8; 20]);

        let fields = Eip1559TxFields::load(
            &[0x01],
            &[0x80],
            &[0x80],
            &[0x64],
            &[0x82, 0x52, 0x08],
            &destination,
            &[0x80],
            &data,
            &[0xC0],
        )
        .unwrap();

        let unsigned = encode_unsigned(&fields).unwrap();
        assert_eq!(unsigned[0], TX_TYPE);
        // 160 payload bytes: f8-form header with one length byte.
        assert_eq!(unsigned[1], 0xF8);
        assert_eq!(unsigned[2] as usize, unsigned.len() - 3);
    }

    #[test]
    fn build_is_deterministic() {
        let sig = RecoverableSignature {
            r: [0x11; 32],
            s: [0x22; 32],
            v: 0x1C,
        };
        let a = build_transaction(&sample_fields(), &FixedSigner { sig }).unwrap();
        let b = build_transaction(&sample_fields(), &FixedSigner { sig }).unwrap();
        assert_eq!(a.raw_tx, b.raw_tx);
        assert_eq!(a.tx_hash, b.tx_hash);
    }
}
