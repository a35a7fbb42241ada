use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Header `alg` value written into unsigned tokens.
pub const UNSIGNED_ALG: &str = "none";

/// RSA signing algorithms accepted for policy tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    RS256,
    PS256,
    RS384,
    #[default]
    PS384,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashFunction {
    Sha256,
    Sha384,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    Pkcs1v15,
    Pss,
}

impl SigningAlgorithm {
    pub const ALL: [SigningAlgorithm; 4] = [
        SigningAlgorithm::RS256,
        SigningAlgorithm::PS256,
        SigningAlgorithm::RS384,
        SigningAlgorithm::PS384,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SigningAlgorithm::RS256 => "RS256",
            SigningAlgorithm::PS256 => "PS256",
            SigningAlgorithm::RS384 => "RS384",
            SigningAlgorithm::PS384 => "PS384",
        }
    }

    pub fn hash(&self) -> HashFunction {
        match self {
            SigningAlgorithm::RS256 | SigningAlgorithm::PS256 => HashFunction::Sha256,
            SigningAlgorithm::RS384 | SigningAlgorithm::PS384 => HashFunction::Sha384,
        }
    }

    pub fn padding(&self) -> Padding {
        match self {
            SigningAlgorithm::RS256 | SigningAlgorithm::RS384 => Padding::Pkcs1v15,
            SigningAlgorithm::PS256 | SigningAlgorithm::PS384 => Padding::Pss,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SigningAlgorithm {
    type Err = Error;

    /// Labels are matched exactly; `none` is not an algorithm.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| Error::UnsupportedAlgorithm(s.to_string()))
    }
}
