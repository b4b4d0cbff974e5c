mod db;
mod images;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "toybazaar-cli")]
#[command(about = "Toybazaar store maintenance")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Product image management
    Images {
        #[command(subcommand)]
        command: ImagesCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check that the database answers
    Ping,
    /// Insert seed products whose slug is not yet stored
    Seed {
        /// Seed file (defaults to `TOYBAZAAR_SEED_PATH`)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum ImagesCommands {
    /// Upload image files and append their URLs to a product
    Upload {
        /// Primary key of the product
        #[arg(long)]
        toy: Uuid,
        /// Image files to upload, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("toybazaar-cli: try `toybazaar-cli --help`");
        return Ok(());
    };

    let config = toybazaar_core::load_app_config()?;
    match command {
        Commands::Db { command } => match command {
            DbCommands::Migrate => db::run_migrate(&config).await,
            DbCommands::Ping => db::run_ping(&config).await,
            DbCommands::Seed { path } => db::run_seed(&config, path.as_deref()).await,
        },
        Commands::Images { command } => match command {
            ImagesCommands::Upload { toy, files } => {
                images::run_upload(&config, toy, &files).await
            }
        },
    }
}

#[cfg(test)]
mod tests;
