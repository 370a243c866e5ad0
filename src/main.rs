//! ksdrift - Main Entry Point
//!
//! Command-line drift detection between a reference and a test dataset.

use clap::Parser;
use ksdrift::cli::{cmd_detect, cmd_info, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ksdrift=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect {
            reference,
            test,
            columns,
            config,
            p_val,
            correction,
            alternative,
            mode,
            drift_type,
            json,
        } => {
            let result = cmd_detect(
                &reference,
                &test,
                columns.as_deref(),
                config.as_ref(),
                p_val,
                correction.as_deref(),
                alternative.as_deref(),
                mode.as_deref(),
                &drift_type,
                json,
            )?;
            // Exit status 2 signals drift; errors exit with 1
            if result.is_drift() {
                std::process::exit(2);
            }
        }
        Commands::Info { data } => {
            cmd_info(&data)?;
        }
    }

    Ok(())
}
