pub mod delete;
pub mod get_config;
pub mod list;

use anyhow::Context;
use clap::{Parser, Subcommand};
use common::cli::{CommonArgs, utils};

/// rpksi: inspect and prune shadow indexing segments stored in S3
#[derive(Parser, Debug)]
#[command(name = "rpksi", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lists details for each topic managed by shadow indexing
    #[command(visible_alias = "ls")]
    List(list::ListArgs),
    /// Deletes segments of one topic from S3, oldest first, and updates its manifests
    #[command(visible_alias = "del")]
    Delete(delete::DeleteArgs),
    /// Prints the effective configuration after files, environment and flags
    GetConfig(get_config::GetConfigArgs),
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = utils::load_config(&self.common)?;
        tracing::debug!(bucket = %config.bucket, s3 = %config.s3_url(), "Loaded configuration");

        match self.command {
            Commands::List(args) => args.run(&config).await.context("list failed"),
            Commands::Delete(args) => args.run(&config).await.context("delete failed"),
            Commands::GetConfig(args) => args.run(&config),
        }
    }
}
