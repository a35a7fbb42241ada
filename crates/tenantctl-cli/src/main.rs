mod config;
mod create;
mod verify;

use clap::{Parser, Subcommand};

use config::GlobalConfig;

#[derive(Parser)]
#[command(
    name = "tenantctl",
    version,
    about = "Attestation service tenant and policy management CLI"
)]
struct Cli {
    #[command(flatten)]
    config: GlobalConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create resources
    #[command(subcommand)]
    Create(CreateCommands),
    /// Verify resources
    #[command(subcommand)]
    Verify(VerifyCommands),
}

#[derive(Subcommand)]
enum CreateCommands {
    /// Build a policy token (JWT), optionally RSA-signed
    PolicyJwt(create::PolicyJwtArgs),
}

#[derive(Subcommand)]
enum VerifyCommands {
    /// Check a policy token's signature against its embedded certificate
    PolicyJwt(verify::VerifyPolicyJwtArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.config.init_tracing()?;

    match cli.command {
        Commands::Create(CreateCommands::PolicyJwt(args)) => create::run(args)?,
        Commands::Verify(VerifyCommands::PolicyJwt(args)) => verify::run(args)?,
    }
    Ok(())
}
