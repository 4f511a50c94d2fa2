use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod commands;

use crate::config::AppConfig;
use commands::{init_database, migrate_and_serve, serve};

#[derive(Parser)]
#[command(name = "devcollab")]
#[command(about = "DevCollab backend: developer and company accounts, jobs and connections")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        #[command(flatten)]
        config: AppConfig,
    },
    /// Initialize the database using migrations
    InitDb {
        #[command(flatten)]
        config: AppConfig,
    },
    /// Apply pending migrations, then start the web server
    MigrateAndServe {
        #[command(flatten)]
        config: AppConfig,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve { config } => serve(&config).await?,
            Commands::InitDb { config } => init_database(config.database_url()).await?,
            Commands::MigrateAndServe { config } => migrate_and_serve(&config).await?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subcommands_parse() {
        let cli = Cli::parse_from(["devcollab", "init-db", "--database-url", "sqlite::memory:"]);
        assert!(matches!(
            cli.command,
            Commands::InitDb { ref config } if config.database_url() == "sqlite::memory:"
        ));

        let cli = Cli::parse_from(["devcollab", "migrate-and-serve", "--port", "6000"]);
        assert!(matches!(
            cli.command,
            Commands::MigrateAndServe { ref config } if config.port == 6000
        ));
    }
}
