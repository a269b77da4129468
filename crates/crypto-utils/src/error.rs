use thiserror::Error;

/// Errors from the shared utility layer.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("unexpected end of buffer: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },
}

/// Device-signer failures.
///
/// The secure element reports failures as opaque status codes; callers
/// propagate these verbatim and never retry (retry policy belongs to the
/// signer's own transport).
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("device signing failed with status {0}")]
    Device(i32),

    #[error("signing failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unexpected_end() {
        let err = CryptoError::UnexpectedEnd {
            needed: 4,
            remaining: 1,
        };
        assert_eq!(
            err.to_string(),
            "unexpected end of buffer: needed 4 bytes, 1 remaining"
        );
    }

    #[test]
    fn display_invalid_key() {
        let err = SignerError::InvalidKey("scalar out of range".into());
        assert_eq!(err.to_string(), "invalid signing key: scalar out of range");
    }

    #[test]
    fn display_device_status() {
        let err = SignerError::Device(-3);
        assert_eq!(err.to_string(), "device signing failed with status -3");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(SignerError::Device(-1));
        assert!(err.to_string().contains("-1"));
    }
}
