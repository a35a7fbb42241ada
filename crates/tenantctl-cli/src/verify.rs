use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use tenantctl::path;
use tenantctl::verify_policy_token;

#[derive(Args, Debug)]
pub struct VerifyPolicyJwtArgs {
    /// Path to a file containing the policy token
    #[arg(long, short = 't')]
    pub token_file: PathBuf,
}

pub fn run(args: VerifyPolicyJwtArgs) -> anyhow::Result<()> {
    let token_path = path::resolve(&args.token_file)
        .with_context(|| format!("Invalid token file {}", args.token_file.display()))?;
    let token = fs::read_to_string(&token_path)
        .with_context(|| format!("Failed to read token file {}", token_path.display()))?;

    let report = verify_policy_token(&token).context("Policy token verification failed")?;

    let output = serde_json::to_string_pretty(&report)?;
    println!("{}", output);

    if !report.verified {
        std::process::exit(1);
    }

    Ok(())
}
