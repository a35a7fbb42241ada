//! Policy token signing for the `tenantctl` attestation client.
//!
//! Builds compact JWS tokens over policy documents, either unsigned
//! (`{"alg":"none"}`, empty signature segment) or RSA-signed with one of
//! RS256, PS256, RS384 or PS384.

pub mod crypto;
pub mod error;
pub mod jwt;
pub mod path;
pub mod policy_jwt;
pub mod types;
pub mod verification;

pub use error::Error;
pub use policy_jwt::{
    build_policy_jwt, generate_policy_jwt, write_token_file, PolicyJwt, PolicyJwtRequest,
    SigningOptions,
};
pub use types::SigningAlgorithm;
pub use verification::{verify_policy_token, VerificationReport};
