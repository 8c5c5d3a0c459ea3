//! Housing Prep - Main Entry Point

use clap::Parser;
use housing_prep::cli::{cmd_apply, cmd_inspect, cmd_transform, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "housing_prep=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Transform { config } => {
            cmd_transform(&config)?;
        }
        Commands::Apply { object, schema, data, output, format } => {
            cmd_apply(&object, &schema, &data, &output, format.into())?;
        }
        Commands::Inspect { object } => {
            cmd_inspect(&object)?;
        }
    }

    Ok(())
}
