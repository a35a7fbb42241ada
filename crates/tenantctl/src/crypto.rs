use std::fs;
use std::path::Path;

use rand::rngs::OsRng;
use rsa::{
    pkcs1::{DecodeRsaPrivateKey, ALGORITHM_OID as RSA_ENCRYPTION_OID},
    pkcs1v15,
    pkcs8::{DecodePrivateKey, DecodePublicKey, PrivateKeyInfo},
    pss,
    signature::{RandomizedSigner, SignatureEncoding, Signer, Verifier},
    RsaPrivateKey, RsaPublicKey,
};
use sha2::{Digest, Sha256, Sha384};
use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate;

use crate::error::Error;
use crate::path;
use crate::types::{HashFunction, Padding, SigningAlgorithm};

/// Private key material as found on disk.
///
/// Non-RSA keys load without error so that the algorithm/key mismatch is
/// reported as [`Error::IncompatibleKey`] rather than as a parse failure.
#[derive(Debug, Clone)]
pub enum PrivateKeyMaterial {
    Rsa(RsaPrivateKey),
    Foreign(String),
}

impl PrivateKeyMaterial {
    /// Look up the RSA key usable with `alg`.
    pub fn signing_key(&self, alg: SigningAlgorithm) -> Result<&RsaPrivateKey, Error> {
        match self {
            PrivateKeyMaterial::Rsa(key) => Ok(key),
            PrivateKeyMaterial::Foreign(kind) => Err(Error::IncompatibleKey(format!(
                "{} cannot be used with {}",
                kind, alg
            ))),
        }
    }
}

/// Parse a PEM private key. Accepts PKCS#8 and PKCS#1 RSA keys.
pub fn parse_private_key(pem_text: &str) -> Result<PrivateKeyMaterial, String> {
    let block = pem::parse(pem_text).map_err(|e| format!("invalid PEM: {}", e))?;

    match block.tag() {
        "RSA PRIVATE KEY" => RsaPrivateKey::from_pkcs1_der(block.contents())
            .map(PrivateKeyMaterial::Rsa)
            .map_err(|e| format!("invalid PKCS#1 RSA key: {}", e)),
        "PRIVATE KEY" => {
            let info = PrivateKeyInfo::try_from(block.contents())
                .map_err(|e| format!("invalid PKCS#8 key: {}", e))?;
            if info.algorithm.oid != RSA_ENCRYPTION_OID {
                return Ok(PrivateKeyMaterial::Foreign(format!(
                    "PKCS#8 key with algorithm {}",
                    info.algorithm.oid
                )));
            }
            RsaPrivateKey::from_pkcs8_der(block.contents())
                .map(PrivateKeyMaterial::Rsa)
                .map_err(|e| format!("invalid PKCS#8 RSA key: {}", e))
        }
        "EC PRIVATE KEY" => Ok(PrivateKeyMaterial::Foreign("SEC1 EC private key".to_string())),
        other => Err(format!("unsupported PEM block '{}'", other)),
    }
}

/// Resolve, read and parse a private key file.
pub fn load_private_key(key_path: &Path) -> Result<PrivateKeyMaterial, Error> {
    let key_err = |reason: String| Error::KeyLoad {
        path: key_path.to_path_buf(),
        reason,
    };

    let real = path::resolve(key_path).map_err(|e| key_err(e.to_string()))?;
    let pem_text = fs::read_to_string(&real).map_err(|e| key_err(e.to_string()))?;
    let key = parse_private_key(&pem_text).map_err(key_err)?;

    tracing::debug!(path = %real.display(), "Loaded private key");
    Ok(key)
}

/// Resolve and read a certificate file. The text is returned verbatim.
///
/// Only readability is checked here; the contents are parsed as X.509 when a
/// token is verified.
pub fn load_certificate_pem(cert_path: &Path) -> Result<String, Error> {
    let cert_err = |reason: String| Error::CertLoad {
        path: cert_path.to_path_buf(),
        reason,
    };

    let real = path::resolve(cert_path).map_err(|e| cert_err(e.to_string()))?;
    let bytes = fs::read(&real).map_err(|e| cert_err(format!("file is not readable: {}", e)))?;
    let pem_text =
        String::from_utf8(bytes).map_err(|_| cert_err("file is not UTF-8 text".to_string()))?;
    if pem_text.trim().is_empty() {
        return Err(cert_err("file is empty".to_string()));
    }

    tracing::debug!(path = %real.display(), bytes = pem_text.len(), "Loaded certificate");
    Ok(pem_text)
}

/// Sign `message` with the hash and padding selected by `alg`.
pub fn sign(key: &RsaPrivateKey, alg: SigningAlgorithm, message: &[u8]) -> Result<Vec<u8>, Error> {
    let signature = match (alg.hash(), alg.padding()) {
        (HashFunction::Sha256, Padding::Pkcs1v15) => pkcs1v15::SigningKey::<Sha256>::new(key.clone())
            .try_sign(message)?
            .to_vec(),
        (HashFunction::Sha384, Padding::Pkcs1v15) => pkcs1v15::SigningKey::<Sha384>::new(key.clone())
            .try_sign(message)?
            .to_vec(),
        (HashFunction::Sha256, Padding::Pss) => pss::BlindedSigningKey::<Sha256>::new(key.clone())
            .try_sign_with_rng(&mut OsRng, message)?
            .to_vec(),
        (HashFunction::Sha384, Padding::Pss) => pss::BlindedSigningKey::<Sha384>::new(key.clone())
            .try_sign_with_rng(&mut OsRng, message)?
            .to_vec(),
    };
    Ok(signature)
}

/// Verify an RSA signature with the hash and padding selected by `alg`.
pub fn verify(
    public_key: &RsaPublicKey,
    alg: SigningAlgorithm,
    message: &[u8],
    signature: &[u8],
) -> Result<(), Error> {
    let result = match (alg.hash(), alg.padding()) {
        (HashFunction::Sha256, Padding::Pkcs1v15) => {
            let sig = pkcs1v15::Signature::try_from(signature).map_err(|_| Error::SignatureInvalid)?;
            pkcs1v15::VerifyingKey::<Sha256>::new(public_key.clone()).verify(message, &sig)
        }
        (HashFunction::Sha384, Padding::Pkcs1v15) => {
            let sig = pkcs1v15::Signature::try_from(signature).map_err(|_| Error::SignatureInvalid)?;
            pkcs1v15::VerifyingKey::<Sha384>::new(public_key.clone()).verify(message, &sig)
        }
        (HashFunction::Sha256, Padding::Pss) => {
            let sig = pss::Signature::try_from(signature).map_err(|_| Error::SignatureInvalid)?;
            pss::VerifyingKey::<Sha256>::new(public_key.clone()).verify(message, &sig)
        }
        (HashFunction::Sha384, Padding::Pss) => {
            let sig = pss::Signature::try_from(signature).map_err(|_| Error::SignatureInvalid)?;
            pss::VerifyingKey::<Sha384>::new(public_key.clone()).verify(message, &sig)
        }
    };
    result.map_err(|_| Error::SignatureInvalid)
}

/// Extract the RSA public key from a PEM certificate.
pub fn certificate_public_key(cert_pem: &str) -> Result<RsaPublicKey, Error> {
    let cert = Certificate::from_pem(cert_pem.as_bytes())
        .map_err(|e| Error::Certificate(e.to_string()))?;
    let spki = &cert.tbs_certificate.subject_public_key_info;
    if spki.algorithm.oid != RSA_ENCRYPTION_OID {
        return Err(Error::IncompatibleKey(format!(
            "certificate key algorithm {} is not RSA",
            spki.algorithm.oid
        )));
    }
    let der = spki
        .to_der()
        .map_err(|e| Error::Certificate(e.to_string()))?;
    RsaPublicKey::from_public_key_der(&der).map_err(|e| Error::Certificate(e.to_string()))
}

/// SHA-256 fingerprint of the first PEM block's DER contents, hex-encoded.
pub fn certificate_sha256(cert_pem: &str) -> Result<String, Error> {
    let block = pem::parse(cert_pem).map_err(|e| Error::Certificate(e.to_string()))?;
    Ok(sha256_hex(block.contents()))
}

/// SHA-256 hash of arbitrary bytes.
pub fn sha256_hash(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// SHA-256 hash, hex-encoded.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_hash(data))
}
