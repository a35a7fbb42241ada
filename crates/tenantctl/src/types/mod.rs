pub mod algorithm;
pub mod token;

pub use algorithm::{HashFunction, Padding, SigningAlgorithm, UNSIGNED_ALG};
pub use token::{PolicyClaims, TokenHeader};
