use crypto_utils::bytes::ByteReader;

use crate::error::BtcError;

/// Hard cap on input/output records per transaction, matching the fixed
/// device work area.
pub const MAX_RECORDS: usize = 128;

/// One UTXO being spent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    /// Previous transaction id in display order; serialized reversed per
    /// wire convention.
    pub prev_txid: [u8; 32],
    /// Previous output index, little-endian wire bytes.
    pub prev_index: [u8; 4],
    /// The spend script, without its length prefix.
    pub script: Vec<u8>,
    /// Sequence number, little-endian wire bytes.
    pub sequence: [u8; 4],
    /// Value in satoshis, little-endian wire bytes.
    pub amount: [u8; 8],
}

/// One output being created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    /// Value in satoshis, little-endian wire bytes.
    pub value: [u8; 8],
    /// The scriptPubKey, without its length prefix.
    pub script_pubkey: Vec<u8>,
}

/// The ordered input records of one transaction.
#[derive(Debug, Clone)]
pub struct InputRecords(Vec<TxInput>);

/// The ordered output records of one transaction.
#[derive(Debug, Clone)]
pub struct OutputRecords(Vec<TxOutput>);

fn check_count(count: usize, what: &str) -> Result<(), BtcError> {
    if count > MAX_RECORDS {
        return Err(BtcError::CapacityExceeded(format!(
            "{count} {what} records exceed the {MAX_RECORDS}-record cap"
        )));
    }
    if count == 0 {
        return Err(BtcError::InvalidRecord(format!("no {what} records")));
    }
    Ok(())
}

fn check_script_len(len: usize) -> Result<(), BtcError> {
    if len > u8::MAX as usize {
        return Err(BtcError::InvalidRecord(format!(
            "script of {len} bytes does not fit a 1-byte length prefix"
        )));
    }
    Ok(())
}

impl InputRecords {
    /// Wraps pre-built inputs, enforcing the record invariants.
    pub fn new(inputs: Vec<TxInput>) -> Result<Self, BtcError> {
        check_count(inputs.len(), "input")?;
        for input in &inputs {
            check_script_len(input.script.len())?;
        }
        Ok(Self(inputs))
    }

    /// Parses an input record buffer: one count byte, then per input
    /// `prev_txid(32) ‖ prev_index(4) ‖ script_len(1) ‖ script ‖
    /// sequence(4) ‖ amount(8)`.
    ///
    /// The embedded count byte must equal `declared_count`, and the buffer
    /// must hold exactly that many records.
    pub fn parse(bytes: &[u8], declared_count: usize) -> Result<Self, BtcError> {
        check_count(declared_count, "input")?;

        let mut reader = ByteReader::new(bytes);
        let embedded = reader
            .u8()
            .map_err(|e| BtcError::InvalidRecord(e.to_string()))? as usize;
        if embedded != declared_count {
            return Err(BtcError::InvalidRecord(format!(
                "record buffer declares {embedded} inputs, caller declared {declared_count}"
            )));
        }

        let mut inputs = Vec::with_capacity(declared_count);
        for _ in 0..declared_count {
            let input = (|| -> Result<TxInput, crypto_utils::CryptoError> {
                let prev_txid = reader.array::<32>()?;
                let prev_index = reader.array::<4>()?;
                let script_len = reader.u8()? as usize;
                let script = reader.take(script_len)?.to_vec();
                let sequence = reader.array::<4>()?;
                let amount = reader.array::<8>()?;
                Ok(TxInput {
                    prev_txid,
                    prev_index,
                    script,
                    sequence,
                    amount,
                })
            })()
            .map_err(|e| BtcError::InvalidRecord(e.to_string()))?;
            inputs.push(input);
        }

        if !reader.is_empty() {
            return Err(BtcError::InvalidRecord(format!(
                "{} trailing bytes after the last input record",
                reader.remaining()
            )));
        }
        Ok(Self(inputs))
    }

    /// Serializes back to the wire record format (the inverse of `parse`).
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.0.len() * 49);
        out.push(self.0.len() as u8);
        for input in &self.0 {
            out.extend_from_slice(&input.prev_txid);
            out.extend_from_slice(&input.prev_index);
            out.push(input.script.len() as u8);
            out.extend_from_slice(&input.script);
            out.extend_from_slice(&input.sequence);
            out.extend_from_slice(&input.amount);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TxInput> {
        self.0.iter()
    }
}

impl OutputRecords {
    /// Wraps pre-built outputs, enforcing the record invariants.
    pub fn new(outputs: Vec<TxOutput>) -> Result<Self, BtcError> {
        check_count(outputs.len(), "output")?;
        for output in &outputs {
            check_script_len(output.script_pubkey.len())?;
        }
        Ok(Self(outputs))
    }

    /// Parses an output record buffer: one count byte, then per output
    /// `value(8) ‖ script_len(1) ‖ script`.
    pub fn parse(bytes: &[u8], declared_count: usize) -> Result<Self, BtcError> {
        check_count(declared_count, "output")?;

        let mut reader = ByteReader::new(bytes);
        let embedded = reader
            .u8()
            .map_err(|e| BtcError::InvalidRecord(e.to_string()))? as usize;
        if embedded != declared_count {
            return Err(BtcError::InvalidRecord(format!(
                "record buffer declares {embedded} outputs, caller declared {declared_count}"
            )));
        }

        let mut outputs = Vec::with_capacity(declared_count);
        for _ in 0..declared_count {
            let output = (|| -> Result<TxOutput, crypto_utils::CryptoError> {
                let value = reader.array::<8>()?;
                let script_len = reader.u8()? as usize;
                let script_pubkey = reader.take(script_len)?.to_vec();
                Ok(TxOutput {
                    value,
                    script_pubkey,
                })
            })()
            .map_err(|e| BtcError::InvalidRecord(e.to_string()))?;
            outputs.push(output);
        }

        if !reader.is_empty() {
            return Err(BtcError::InvalidRecord(format!(
                "{} trailing bytes after the last output record",
                reader.remaining()
            )));
        }
        Ok(Self(outputs))
    }

    /// Serializes back to the wire record format (the inverse of `parse`).
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.0.len() * 32);
        out.push(self.0.len() as u8);
        for output in &self.0 {
            out.extend_from_slice(&output.value);
            out.push(output.script_pubkey.len() as u8);
            out.extend_from_slice(&output.script_pubkey);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TxOutput> {
        self.0.iter()
    }
}
