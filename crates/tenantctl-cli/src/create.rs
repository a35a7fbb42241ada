use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use tenantctl::{generate_policy_jwt, PolicyJwtRequest, SigningOptions};

#[derive(Args, Debug)]
pub struct PolicyJwtArgs {
    /// Path to the policy file
    #[arg(long, short = 'f')]
    pub policy_file: PathBuf,

    /// Sign the token (requires --private-key-file and --certificate-file)
    #[arg(long, short = 's', requires_all = ["private_key_file", "certificate_file"])]
    pub sign: bool,

    /// Path to the RSA private key PEM file
    #[arg(long, short = 'k')]
    pub private_key_file: Option<PathBuf>,

    /// Path to the signer certificate PEM file
    #[arg(long, short = 'c')]
    pub certificate_file: Option<PathBuf>,

    /// Signing algorithm: RS256, PS256, RS384 or PS384
    #[arg(long, short = 'a', env = "TENANTCTL_POLICY_ALGORITHM", default_value = "PS384")]
    pub algorithm: String,

    /// Output path for the token (default: <policy-file>.jwt)
    #[arg(long, short = 'o')]
    pub output_file: Option<PathBuf>,
}

impl PolicyJwtArgs {
    fn into_request(self) -> anyhow::Result<PolicyJwtRequest> {
        let signing = if self.sign {
            Some(SigningOptions {
                private_key_file: self
                    .private_key_file
                    .context("--private-key-file is required with --sign")?,
                certificate_file: self
                    .certificate_file
                    .context("--certificate-file is required with --sign")?,
                algorithm: self.algorithm,
            })
        } else {
            if self.private_key_file.is_some() || self.certificate_file.is_some() {
                tracing::warn!("Key and certificate files are ignored without --sign");
            }
            None
        };

        Ok(PolicyJwtRequest {
            policy_file: self.policy_file,
            signing,
            output_file: self.output_file,
        })
    }
}

pub fn run(args: PolicyJwtArgs) -> anyhow::Result<()> {
    let request = args.into_request()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    generate_policy_jwt(&request, &mut out).context("Failed to create policy JWT")?;
    Ok(())
}
