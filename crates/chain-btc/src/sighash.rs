use crypto_utils::digest::sha256d;

use crate::error::BtcError;
use crate::record::{InputRecords, OutputRecords};

/// Transaction version emitted in every serialization and signature
/// preimage.
pub const TX_VERSION: u32 = 2;

/// SIGHASH_ALL, the only supported signature-hash type.
pub const SIGHASH_ALL: u32 = 1;

/// Which scriptCode goes into each input's signature preimage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptCodeSource {
    /// The canonical P2WPKH code (`1976a914<hash>88ac`) built around the
    /// 20-byte hash embedded in the input's spend script. Single-key
    /// spends.
    WitnessPubkeyHash,
    /// The input's spend script taken verbatim, length prefix included.
    /// Script-path / multisig spends.
    SpendScript,
}

/// Per-call signature-hash working state: the three BIP143 commitment
/// hashes, one signature digest per input, and the display txid cached for
/// the assembler. Built fresh for every call and owned by the caller; there
/// is no shared scratch state.
#[derive(Debug, Clone)]
pub struct SighashBundle {
    pub hash_prevouts: [u8; 32],
    pub hash_sequence: [u8; 32],
    pub hash_outputs: [u8; 32],
    /// One double-SHA256 preimage digest per input, in input order. These
    /// are the messages handed to the device signer.
    pub input_digests: Vec<[u8; 32]>,
    /// Display-order transaction id: double-SHA256 of the witness-stripped
    /// serialization, byte-reversed.
    pub txid: [u8; 32],
}

/// Extracts the 20-byte public-key hash from a spend script.
///
/// Accepts the two supported push layouts: the `0x14` push opcode at script
/// byte 1 (`00 14 <hash>`) or at byte 2 (`76 a9 14 <hash> ...`); anything
/// else is an unsupported template.
pub(crate) fn witness_pubkey_hash(script: &[u8]) -> Result<[u8; 20], BtcError> {
    let range = if script.len() >= 22 && script[1] == 0x14 {
        2..22
    } else if script.len() >= 23 && script[2] == 0x14 {
        3..23
    } else {
        return Err(BtcError::UnsupportedScript(
            "spend script does not carry a 20-byte hash push".into(),
        ));
    };
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&script[range]);
    Ok(hash)
}

/// The canonical P2WPKH scriptCode for a key hash, length prefix included.
fn p2wpkh_script_code(hash: &[u8; 20]) -> Vec<u8> {
    let mut code = Vec::with_capacity(26);
    code.extend_from_slice(&[0x19, 0x76, 0xA9, 0x14]);
    code.extend_from_slice(hash);
    code.extend_from_slice(&[0x88, 0xAC]);
    code
}

/// Computes the display-order transaction id before any signatures exist:
/// double-SHA256 over the witness-stripped legacy serialization, reversed
/// into display order.
pub fn display_txid(inputs: &InputRecords, outputs: &OutputRecords, lock_time: u32) -> [u8; 32] {
    let mut tx = Vec::new();
    tx.extend_from_slice(&TX_VERSION.to_le_bytes());
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
    tx.extend_from_slice(&lock_time.to_le_bytes());

    let mut txid = sha256d(&tx);
    txid.reverse();
    txid
}

/// Computes the BIP143 commitment hashes and the per-input signature
/// digests for the given records.
pub fn compute_sighashes(
    inputs: &InputRecords,
    outputs: &OutputRecords,
    lock_time: u32,
    source: ScriptCodeSource,
) -> Result<SighashBundle, BtcError> {
    // hashPrevouts / hashSequence: every outpoint (wire order) and sequence
    // concatenated in input order.
    let mut prevouts = Vec::with_capacity(inputs.len() * 36);
    let mut sequences = Vec::with_capacity(inputs.len() * 4);
    for input in inputs.iter() {
        let mut hash = input.prev_txid;
        hash.reverse();
        prevouts.extend_from_slice(&hash);
        prevouts.extend_from_slice(&input.prev_index);
        sequences.extend_from_slice(&input.sequence);
    }

    // hashOutputs: every value and length-prefixed scriptPubKey in order.
    let mut outs = Vec::new();
    for output in outputs.iter() {
        outs.extend_from_slice(&output.value);
        outs.push(output.script_pubkey.len() as u8);
        outs.extend_from_slice(&output.script_pubkey);
    }

    let hash_prevouts = sha256d(&prevouts);
    let hash_sequence = sha256d(&sequences);
    let hash_outputs = sha256d(&outs);

    let mut input_digests = Vec::with_capacity(inputs.len());
    for input in inputs.iter() {
        let script_code = match source {
            ScriptCodeSource::WitnessPubkeyHash => {
                p2wpkh_script_code(&witness_pubkey_hash(&input.script)?)
            }
            ScriptCodeSource::SpendScript => {
                let mut code = Vec::with_capacity(input.script.len() + 1);
                code.push(input.script.len() as u8);
                code.extend_from_slice(&input.script);
                code
            }
        };

        let mut outpoint_hash = input.prev_txid;
        outpoint_hash.reverse();

        let mut preimage = Vec::with_capacity(156 + script_code.len());
        preimage.extend_from_slice(&TX_VERSION.to_le_bytes());
        preimage.extend_from_slice(&hash_prevouts);
        preimage.extend_from_slice(&hash_sequence);
        preimage.extend_from_slice(&outpoint_hash);
        preimage.extend_from_slice(&input.prev_index);
        preimage.extend_from_slice(&script_code);
        preimage.extend_from_slice(&input.amount);
        preimage.extend_from_slice(&input.sequence);
        preimage.extend_from_slice(&hash_outputs);
        preimage.extend_from_slice(&lock_time.to_le_bytes());
        preimage.extend_from_slice(&SIGHASH_ALL.to_le_bytes());

        input_digests.push(sha256d(&preimage));
    }

    Ok(SighashBundle {
        hash_prevouts,
        hash_sequence,
        hash_outputs,
        input_digests,
        txid: display_txid(inputs, outputs, lock_time),
    })
}
