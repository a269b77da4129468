use crate::error::EthError;

/// One pre-encoded RLP item, validated against the subset of header forms
/// the device accepts. Each variant keeps the full encoded bytes, header
/// included, so appending a field is a plain copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpField {
    /// A canonical integer: a single byte below 0x81, or a short-form
    /// string of up to 55 payload bytes.
    Integer(Vec<u8>),
    /// A byte-string data item, short form or 1–2-byte long form.
    Data(Vec<u8>),
    /// A list item: empty, or 1–2-byte long form.
    List(Vec<u8>),
}

impl RlpField {
    /// Loads an integer field. Long-form headers (above 0xB7) are
    /// rejected; integers must fit 55 bytes.
    pub fn integer(raw: &[u8]) -> Result<Self, EthError> {
        let first = *raw
            .first()
            .ok_or_else(|| EthError::InvalidField("empty integer field".into()))?;
        if first > 0xB7 {
            return Err(EthError::InvalidField(format!(
                "long-form integer header 0x{first:02x}"
            )));
        }
        if first < 0x81 {
            return Ok(Self::Integer(vec![first]));
        }
        let total = (first - 0x80) as usize + 1;
        Ok(Self::Integer(take(raw, total, "integer")?))
    }

    /// Loads a data field: short form up to 0xB7, or long form with one or
    /// two explicit length bytes (0xB8/0xB9). Single-byte encodings below
    /// 0x80 are rejected; the data field always carries a string header.
    pub fn data(raw: &[u8]) -> Result<Self, EthError> {
        let first = *raw
            .first()
            .ok_or_else(|| EthError::InvalidField("empty data field".into()))?;
        if first < 0x80 {
            return Err(EthError::InvalidField(format!(
                "data field must carry a string header, got 0x{first:02x}"
            )));
        }
        if first < 0xB8 {
            let total = (first - 0x80) as usize + 1;
            return Ok(Self::Data(take(raw, total, "data")?));
        }

        let len_bytes = (first - 0xB7) as usize;
        if len_bytes > 2 {
            return Err(EthError::InvalidField(format!(
                "data header 0x{first:02x} carries more than 2 length bytes"
            )));
        }
        let len = read_length(raw, len_bytes, "data")?;
        Ok(Self::Data(take(raw, 1 + len_bytes + len, "data")?))
    }

    /// Loads a list field: the empty list 0xC0, or the long form with one
    /// or two explicit length bytes (0xF8/0xF9). Short non-empty lists are
    /// not produced by any supported host and are rejected.
    pub fn list(raw: &[u8]) -> Result<Self, EthError> {
        let first = *raw
            .first()
            .ok_or_else(|| EthError::InvalidField("empty list field".into()))?;
        if first == 0xC0 {
            return Ok(Self::List(vec![0xC0]));
        }
        if first <= 0xF7 {
            return Err(EthError::InvalidField(format!(
                "unsupported list header 0x{first:02x}"
            )));
        }

        let len_bytes = (first - 0xF7) as usize;
        if len_bytes > 2 {
            return Err(EthError::InvalidField(format!(
                "list header 0x{first:02x} carries more than 2 length bytes"
            )));
        }
        let len = read_length(raw, len_bytes, "list")?;
        Ok(Self::List(take(raw, 1 + len_bytes + len, "list")?))
    }

    /// The full encoded bytes, header included.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Integer(bytes) | Self::Data(bytes) | Self::List(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Reads the 1–2 explicit big-endian length bytes after a long-form header.
fn read_length(raw: &[u8], len_bytes: usize, what: &str) -> Result<usize, EthError> {
    if raw.len() < 1 + len_bytes {
        return Err(EthError::InvalidField(format!(
            "{what} field truncated inside its length bytes"
        )));
    }
    let mut len = 0usize;
    for &b in &raw[1..1 + len_bytes] {
        len = (len << 8) | b as usize;
    }
    Ok(len)
}

/// Copies the first `total` bytes, rejecting a shorter buffer.
fn take(raw: &[u8], total: usize, what: &str) -> Result<Vec<u8>, EthError> {
    if raw.len() < total {
        return Err(EthError::InvalidField(format!(
            "{what} field declares {total} bytes, buffer holds {}",
            raw.len()
        )));
    }
    Ok(raw[..total].to_vec())
}
