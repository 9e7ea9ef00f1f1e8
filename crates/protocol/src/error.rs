//! Protocol error types

use thiserror::Error;

/// Protocol-level errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The requested hook API version is not one this sidecar implements
    #[error("Unsupported hook version '{requested}' (expected one of: {supported})")]
    UnsupportedVersion { requested: String, supported: String },
}

/// Type alias for protocol results
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::UnsupportedVersion {
            requested: "v2".to_string(),
            supported: "v1alpha1, v1alpha2".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Unsupported hook version 'v2'"));
        assert!(msg.contains("v1alpha1, v1alpha2"));
    }
}
