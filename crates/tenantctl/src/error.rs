use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Policy file {path} is empty")]
    EmptyPolicy { path: PathBuf },

    #[error("Unsupported signing algorithm '{0}', expected one of RS256, PS256, RS384, PS384")]
    UnsupportedAlgorithm(String),

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Failed to read policy file {path}: {source}")]
    PolicyLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load private key {path}: {reason}")]
    KeyLoad { path: PathBuf, reason: String },

    #[error("Failed to load certificate {path}: {reason}")]
    CertLoad { path: PathBuf, reason: String },

    #[error("Key is not compatible with RSA signing: {0}")]
    IncompatibleKey(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Certificate error: {0}")]
    Certificate(String),

    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Failed to write token to {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rsa::signature::Error> for Error {
    fn from(err: rsa::signature::Error) -> Self {
        Error::Signing(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_algorithm_message_lists_choices() {
        let err = Error::UnsupportedAlgorithm("HS256".to_string());
        let msg = err.to_string();
        assert!(msg.contains("HS256"));
        assert!(msg.contains("PS384"));
    }

    #[test]
    fn test_output_write_keeps_source() {
        use std::error::Error as _;
        let err = Error::OutputWrite {
            path: PathBuf::from("/tmp/x.jwt"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/tmp/x.jwt"));
    }
}
