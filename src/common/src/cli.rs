use clap::Args;
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// Global arguments shared by every rpksi subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Config file (default is ./rpksi.toml or ./rpksi.yaml)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Kafka endpoint")]
    pub kafka: Option<String>,

    #[arg(long, global = true, help = "Admin endpoint")]
    pub admin: Option<String>,

    #[arg(long, global = true, help = "S3 endpoint")]
    pub s3: Option<String>,

    #[arg(long, global = true, help = "S3 region")]
    pub region: Option<String>,

    #[arg(short, long, global = true, help = "Bucket name")]
    pub bucket: Option<String>,

    #[arg(long, global = true, alias = "accessKey", help = "Access key")]
    pub access_key: Option<String>,

    #[arg(long, global = true, alias = "secretKey", help = "Secret key")]
    pub secret_key: Option<String>,

    #[arg(long, global = true, help = "Use TLS for the S3 and admin endpoints")]
    pub use_ssl: bool,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Enable quiet mode (minimal output)")]
    pub quiet: bool,
}

impl CommonArgs {
    /// Flags the operator passed, to be layered over file and env config.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            kafka: self.kafka.clone(),
            admin: self.admin.clone(),
            s3: self.s3.clone(),
            region: self.region.clone(),
            bucket: self.bucket.clone(),
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            use_ssl: self.use_ssl.then_some(true),
        }
    }
}

/// Utility functions for CLI operations
pub mod utils {
    use super::*;
    use crate::config::Configuration;
    use anyhow::{Context, Result};
    use tracing_subscriber::EnvFilter;

    /// Initialize logging based on CLI arguments. `RUST_LOG` wins when set.
    pub fn init_logging(args: &CommonArgs) {
        let level = if args.quiet {
            "warn"
        } else if args.verbose {
            "debug"
        } else {
            "info"
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    /// Load and validate configuration with overrides from the CLI
    pub fn load_config(args: &CommonArgs) -> Result<Configuration> {
        let config = Configuration::load(args.config.as_deref(), &args.overrides())
            .context("Failed to load configuration")?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Render configuration as pretty JSON with the secret key masked
    pub fn config_json(config: &Configuration) -> Result<String> {
        let mut masked = config.clone();
        if !masked.secret_key.is_empty() {
            masked.secret_key = "********".to_string();
        }
        serde_json::to_string_pretty(&masked).context("Failed to serialize configuration to JSON")
    }
}
