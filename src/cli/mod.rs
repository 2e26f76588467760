mod show;
mod sync;

use crate::error::Result;
use clap::{Parser, Subcommand};

pub use show::ShowResource;

#[derive(Parser, Debug)]
#[command(name = "ad-account-sync")]
#[command(about = "Sync a Facebook ad account snapshot into BigQuery", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Sync { account_id } => sync::execute(account_id.as_deref()).await,
            Commands::Show { resource } => resource.execute().await,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the ad account and upsert it into the destination table
    Sync {
        /// Ad account to sync, with or without the `act_` prefix. Overrides ACCOUNT_ID.
        #[arg(long)]
        account_id: Option<String>,
    },
    Show {
        #[command(subcommand)]
        resource: ShowResource,
    },
}
