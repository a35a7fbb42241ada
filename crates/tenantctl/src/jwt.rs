use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL, Engine};
use rsa::RsaPrivateKey;

use crate::crypto;
use crate::error::Error;
use crate::types::{PolicyClaims, SigningAlgorithm, TokenHeader};

/// Base64url encode bytes.
pub fn base64url_encode(data: &[u8]) -> String {
    BASE64URL.encode(data)
}

/// Base64url decode a string.
pub fn base64url_decode(s: &str) -> Result<Vec<u8>, Error> {
    Ok(BASE64URL.decode(s)?)
}

/// `base64url(header) "." base64url(claims)`
pub fn signing_input(header: &TokenHeader, claims: &PolicyClaims) -> Result<String, Error> {
    let header_json = serde_json::to_string(header)?;
    let claims_json = serde_json::to_string(claims)?;
    Ok(format!(
        "{}.{}",
        base64url_encode(header_json.as_bytes()),
        base64url_encode(claims_json.as_bytes())
    ))
}

/// Encode an unsigned token: `{"alg":"none"}` header and an empty signature segment.
pub fn encode_unsigned(claims: &PolicyClaims) -> Result<String, Error> {
    let input = signing_input(&TokenHeader::unsigned(), claims)?;
    Ok(format!("{}.", input))
}

/// Encode a signed token carrying `certificate_pem` in its header.
pub fn encode_signed(
    claims: &PolicyClaims,
    alg: SigningAlgorithm,
    key: &RsaPrivateKey,
    certificate_pem: &str,
) -> Result<String, Error> {
    let header = TokenHeader::signed(alg, certificate_pem);
    let input = signing_input(&header, claims)?;
    let signature = crypto::sign(key, alg, input.as_bytes())?;
    Ok(format!("{}.{}", input, base64url_encode(&signature)))
}

/// Split a compact token into its three segments.
pub fn split_token(token: &str) -> Result<[&str; 3], Error> {
    let parts: Vec<&str> = token.split('.').collect();
    match parts.as_slice() {
        [header, claims, signature] => Ok([*header, *claims, *signature]),
        _ => Err(Error::Jwt("token must have 3 parts".to_string())),
    }
}

/// Decode a token without verifying the signature. Returns (header, claims, signature segment).
pub fn decode_unverified(token: &str) -> Result<(TokenHeader, PolicyClaims, String), Error> {
    let [header_b64, claims_b64, signature_b64] = split_token(token.trim())?;

    let header: TokenHeader = serde_json::from_slice(&base64url_decode(header_b64)?)
        .map_err(|e| Error::Jwt(format!("Invalid token header: {}", e)))?;
    let claims: PolicyClaims = serde_json::from_slice(&base64url_decode(claims_b64)?)
        .map_err(|e| Error::Jwt(format!("Invalid token claims: {}", e)))?;

    Ok((header, claims, signature_b64.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> PolicyClaims {
        PolicyClaims {
            policy: "p == true".to_string(),
        }
    }

    #[test]
    fn test_unsigned_token_layout() {
        let token = encode_unsigned(&claims()).unwrap();
        let expected = format!(
            "eyJhbGciOiJub25lIn0.{}.",
            base64url_encode(br#"{"policy":"p == true"}"#)
        );
        assert_eq!(token, expected);
        assert_eq!(token.matches('.').count(), 2);
        assert!(token.ends_with('.'));
    }

    #[test]
    fn test_decode_unsigned() {
        let token = encode_unsigned(&claims()).unwrap();
        let (header, decoded, sig) = decode_unverified(&token).unwrap();
        assert!(header.is_unsigned());
        assert_eq!(header.certificate, None);
        assert_eq!(decoded, claims());
        assert!(sig.is_empty());
    }

    #[test]
    fn test_base64url_has_no_padding() {
        assert_eq!(base64url_encode(b"a"), "YQ");
        assert_eq!(base64url_encode(&[0xfb, 0xff]), "-_8");
        assert_eq!(base64url_decode("-_8").unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn test_malformed_rejected() {
        assert!(decode_unverified("not.a.jwt.token").is_err());
        assert!(decode_unverified("only-one-part").is_err());
        assert!(decode_unverified("!!!.e30.").is_err());
        // valid base64url, wrong JSON shape
        let header = base64url_encode(br#"{"typ":"JWT"}"#);
        let token = format!("{}.{}.", header, base64url_encode(b"{}"));
        assert!(matches!(decode_unverified(&token), Err(Error::Jwt(_))));
    }
}
