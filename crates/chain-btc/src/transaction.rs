use crypto_utils::digest::hash160;
use crypto_utils::signer::{HashSigner, RecoverableSignature};

use crate::error::BtcError;
use crate::record::{InputRecords, OutputRecords};
use crate::sighash::{
    compute_sighashes, display_txid, witness_pubkey_hash, ScriptCodeSource, SIGHASH_ALL,
    TX_VERSION,
};

/// Largest witness-script push that fits a single-byte length prefix.
const MAX_WITNESS_SCRIPT_LEN: usize = 0xFC;

/// A fully serialized segwit transaction plus its display-order txid.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub raw_tx: Vec<u8>,
    pub txid: [u8; 32],
}

/// DER-encodes an (R, S) pair the way the device wire format does.
///
/// When R's most significant byte has its high bit set, a zero byte is
/// prepended to keep the integer positive (`30 45 02 21 00` header);
/// otherwise the plain 32-byte form is used (`30 44 02 20`). S is always
/// emitted at its full 32-byte width.
pub fn encode_der_signature(sig: &RecoverableSignature) -> Vec<u8> {
    let mut der = Vec::with_capacity(72);
    if sig.r[0] > 0x7F {
        der.extend_from_slice(&[0x30, 0x45, 0x02, 0x21, 0x00]);
    } else {
        der.extend_from_slice(&[0x30, 0x44, 0x02, 0x20]);
    }
    der.extend_from_slice(&sig.r);
    der.extend_from_slice(&[0x02, 0x20]);
    der.extend_from_slice(&sig.s);
    der
}

/// One witness-stack signature item: length byte, DER signature, and the
/// trailing SIGHASH_ALL byte.
fn witness_signature_item(sig: &RecoverableSignature) -> Vec<u8> {
    let der = encode_der_signature(sig);
    let mut item = Vec::with_capacity(der.len() + 2);
    item.push((der.len() + 1) as u8);
    item.extend_from_slice(&der);
    item.push(SIGHASH_ALL as u8);
    item
}

/// Builds and signs a single-key P2WPKH transaction.
///
/// Every input's spend script must commit to `hash160(pubkey)`; each input
/// digest goes to the signer and comes back as an (R, S, V) triple that is
/// DER-encoded into a two-item witness stack (signature, compressed key).
pub fn build_p2wpkh_transaction(
    inputs: &InputRecords,
    outputs: &OutputRecords,
    lock_time: u32,
    signer: &dyn HashSigner,
    pubkey: &[u8; 33],
) -> Result<SignedTransaction, BtcError> {
    let key_hash = hash160(pubkey);
    for input in inputs.iter() {
        if witness_pubkey_hash(&input.script)? != key_hash {
            return Err(BtcError::UnsupportedScript(
                "spend script does not commit to the signing key".into(),
            ));
        }
    }

    let bundle = compute_sighashes(inputs, outputs, lock_time, ScriptCodeSource::WitnessPubkeyHash)?;

    let mut witnesses = Vec::with_capacity(inputs.len());
    for digest in &bundle.input_digests {
        let sig = signer.sign_hash(digest)?;
        let item = witness_signature_item(&sig);

        let mut stack = Vec::with_capacity(item.len() + 35);
        stack.push(2); // signature + public key
        stack.extend_from_slice(&item);
        stack.push(33);
        stack.extend_from_slice(pubkey);
        witnesses.push(stack);
    }

    Ok(assemble(inputs, outputs, lock_time, &witnesses, bundle.txid))
}

/// Produces one witness-encoded signature item per input over the
/// verbatim-script sighash variant.
///
/// This is one cosigner's half of a multisig spend: the host collects the
/// items from each cosigner and concatenates them per input before calling
/// [`build_multisig_transaction`].
pub fn sign_inputs(
    inputs: &InputRecords,
    outputs: &OutputRecords,
    lock_time: u32,
    signer: &dyn HashSigner,
) -> Result<Vec<Vec<u8>>, BtcError> {
    let bundle = compute_sighashes(inputs, outputs, lock_time, ScriptCodeSource::SpendScript)?;

    let mut items = Vec::with_capacity(inputs.len());
    for digest in &bundle.input_digests {
        let sig = signer.sign_hash(digest)?;
        items.push(witness_signature_item(&sig));
    }
    Ok(items)
}

/// Assembles a multisig/script-path transaction from externally produced
/// signatures.
///
/// `signatures` holds one pre-concatenated, witness-encoded two-signature
/// blob per input (see [`sign_inputs`]); `witness_script` is emitted
/// verbatim as the final stack item. No DER re-encoding happens here. The
/// four-item stack is `OP_0` placeholder, two signatures, script.
pub fn build_multisig_transaction(
    inputs: &InputRecords,
    outputs: &OutputRecords,
    lock_time: u32,
    signatures: &[Vec<u8>],
    witness_script: &[u8],
) -> Result<SignedTransaction, BtcError> {
    if signatures.len() != inputs.len() {
        return Err(BtcError::InvalidRecord(format!(
            "{} signature blobs for {} inputs",
            signatures.len(),
            inputs.len()
        )));
    }
    if witness_script.is_empty() {
        return Err(BtcError::UnsupportedScript("witness script is empty".into()));
    }
    if witness_script.len() > MAX_WITNESS_SCRIPT_LEN {
        return Err(BtcError::CapacityExceeded(format!(
            "witness script of {} bytes exceeds the {MAX_WITNESS_SCRIPT_LEN}-byte push limit",
            witness_script.len()
        )));
    }

    let txid = display_txid(inputs, outputs, lock_time);

    let mut witnesses = Vec::with_capacity(inputs.len());
    for blob in signatures {
        let mut stack = Vec::with_capacity(blob.len() + witness_script.len() + 3);
        stack.push(4); // OP_0 placeholder + two signatures + script
        stack.push(0); // empty item standing in for OP_0
        stack.extend_from_slice(blob);
        stack.push(witness_script.len() as u8);
        stack.extend_from_slice(witness_script);
        witnesses.push(stack);
    }

    Ok(assemble(inputs, outputs, lock_time, &witnesses, txid))
}

/// Serializes the segwit envelope: version, marker/flag, inputs with empty
/// scriptSigs, outputs, one witness stack per input, lock time.
fn assemble(
    inputs: &InputRecords,
    outputs: &OutputRecords,
    lock_time: u32,
    witnesses: &[Vec<u8>],
    txid: [u8; 32],
) -> SignedTransaction {
    let mut tx = Vec::new();
    tx.extend_from_slice(&TX_VERSION.to_le_bytes());
    tx.extend_from_slice(&[0x00, 0x01]); // segwit marker + flag

    tx.push(inputs.len() as u8);
    for input in inputs.iter() {
        let mut hash = input.prev_txid;
        hash.reverse();
        tx.extend_from_slice(&hash);
        tx.extend_from_slice(&input.prev_index);
        tx.push(0); // empty scriptSig
        tx.extend_from_slice(&input.sequence);
    }

    tx.push(outputs.len() as u8);
    for output in outputs.iter() {
        tx.extend_from_slice(&output.value);
        tx.push(output.script_pubkey.len() as u8);
        tx.extend_from_slice(&output.script_pubkey);
    }

    for witness in witnesses {
        tx.extend_from_slice(witness);
    }
    tx.extend_from_slice(&lock_time.to_le_bytes());

    SignedTransaction { raw_tx: tx, txid }
}
