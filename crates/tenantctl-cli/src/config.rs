use clap::Args;
use tracing_subscriber::EnvFilter;

/// Options shared by every command.
#[derive(Args, Debug)]
pub struct GlobalConfig {
    /// Log filter directive (e.g. "info", "tenantctl=debug"); logs go to stderr
    #[arg(long, global = true, env = "TENANTCTL_LOG", default_value = "warn")]
    pub log_level: String,
}

impl GlobalConfig {
    pub fn init_tracing(&self) -> anyhow::Result<()> {
        let filter = EnvFilter::try_new(&self.log_level)
            .map_err(|e| anyhow::anyhow!("Invalid --log-level '{}': {}", self.log_level, e))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
        Ok(())
    }
}
