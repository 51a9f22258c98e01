use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use server_api::{db_status, seed_activities, ApiContext, SeedOutcome};
use storage::{read_seed_file, Storage};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/activities.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill an empty store from a seed file.
    Seed {
        #[arg(long, default_value = "data/activities.json")]
        file: PathBuf,
        /// Wipe the store first.
        #[arg(long)]
        reset: bool,
    },
    /// Delete every activity and roster entry.
    Reset,
    /// Print the activity count.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;
    let ctx = ApiContext { storage };

    match cli.command {
        Command::Seed { file, reset } => {
            let seed = read_seed_file(&file)?;
            if reset {
                ctx.storage.clear_activities().await?;
            }
            match seed_activities(&ctx, &seed, i64::MAX).await? {
                SeedOutcome::Kept { existing } => {
                    println!("store already holds {existing} activities; nothing seeded");
                }
                SeedOutcome::Populated { inserted, .. } => {
                    println!("seeded {inserted} activities from {}", file.display());
                }
            }
        }
        Command::Reset => {
            ctx.storage.clear_activities().await?;
            println!("cleared all activities");
        }
        Command::Status => {
            let status = db_status(&ctx).await.map_err(|e| anyhow::anyhow!(e.message))?;
            println!(
                "activities_count={} connection_status={}",
                status.activities_count, status.connection_status
            );
        }
    }

    Ok(())
}
