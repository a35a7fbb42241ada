use serde::{Deserialize, Serialize};

use crate::crypto;
use crate::error::Error;
use crate::jwt;
use crate::types::{SigningAlgorithm, UNSIGNED_ALG};

/// Outcome of checking a policy token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationReport {
    pub algorithm: String,
    pub signed: bool,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_sha256: Option<String>,
    pub policy: String,
}

/// Verify a policy token against the certificate embedded in its own header.
///
/// Unsigned tokens decode successfully but are never reported as verified.
/// This only proves the token was signed by the holder of the embedded
/// certificate's key; trusting that certificate is the caller's decision.
pub fn verify_policy_token(token: &str) -> Result<VerificationReport, Error> {
    let token = token.trim();
    let (header, claims, signature_b64) = jwt::decode_unverified(token)?;

    if header.is_unsigned() {
        if !signature_b64.is_empty() {
            return Err(Error::Jwt(
                "unsigned token must have an empty signature segment".to_string(),
            ));
        }
        return Ok(VerificationReport {
            algorithm: UNSIGNED_ALG.to_string(),
            signed: false,
            verified: false,
            certificate_sha256: None,
            policy: claims.policy,
        });
    }

    let alg: SigningAlgorithm = header.alg.parse()?;
    let cert_pem = match header.certificate.as_deref() {
        Some([cert]) => cert,
        Some(certs) => {
            return Err(Error::Jwt(format!(
                "expected exactly one certificate in header, found {}",
                certs.len()
            )))
        }
        None => return Err(Error::Jwt("signed token has no certificate".to_string())),
    };

    let public_key = crypto::certificate_public_key(cert_pem)?;
    let [header_b64, claims_b64, _] = jwt::split_token(token)?;
    let signing_input = format!("{}.{}", header_b64, claims_b64);
    let signature = jwt::base64url_decode(&signature_b64)?;
    crypto::verify(&public_key, alg, signing_input.as_bytes(), &signature)?;

    tracing::debug!(alg = %alg, "Policy token signature verified");

    Ok(VerificationReport {
        algorithm: alg.to_string(),
        signed: true,
        verified: true,
        certificate_sha256: Some(crypto::certificate_sha256(cert_pem)?),
        policy: claims.policy,
    })
}
