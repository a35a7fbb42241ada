use serde::{Deserialize, Serialize};

use super::algorithm::{SigningAlgorithm, UNSIGNED_ALG};

/// JOSE header of a policy token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenHeader {
    pub alg: String,
    /// PEM text of the signer certificate, carried so a verifier can recover the public key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Vec<String>>,
}

impl TokenHeader {
    pub fn unsigned() -> Self {
        TokenHeader {
            alg: UNSIGNED_ALG.to_string(),
            certificate: None,
        }
    }

    pub fn signed(alg: SigningAlgorithm, certificate_pem: &str) -> Self {
        TokenHeader {
            alg: alg.as_str().to_string(),
            certificate: Some(vec![certificate_pem.to_string()]),
        }
    }

    pub fn is_unsigned(&self) -> bool {
        self.alg == UNSIGNED_ALG
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyClaims {
    pub policy: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_header_bytes() {
        let json = serde_json::to_string(&TokenHeader::unsigned()).unwrap();
        assert_eq!(json, r#"{"alg":"none"}"#);
    }

    #[test]
    fn test_signed_header_field_order() {
        let header = TokenHeader::signed(SigningAlgorithm::PS256, "-----BEGIN CERTIFICATE-----\n");
        let json = serde_json::to_string(&header).unwrap();
        assert_eq!(
            json,
            r#"{"alg":"PS256","certificate":["-----BEGIN CERTIFICATE-----\n"]}"#
        );
        let back: TokenHeader = serde_json::from_str(&json).unwrap();
        assert_eq!(back, header);
        assert!(!back.is_unsigned());
    }

    #[test]
    fn test_claims_serde() {
        let claims = PolicyClaims {
            policy: "p == true".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&claims).unwrap(),
            r#"{"policy":"p == true"}"#
        );
    }
}
