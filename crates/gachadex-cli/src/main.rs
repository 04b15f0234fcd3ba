//! gachadex CLI - search suggestions for the Duet Night Abyss database
//!
//! This is the entry point for the `gachadex` command-line interface, a
//! terminal front end over the suggestion pipeline in `gachadex-core`.
//! Command implementations live in separate modules under `commands`.

use anyhow::Result;
use clap::Parser;
use is_terminal::IsTerminal;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;
    configure_colors(&cli);

    execute_command(cli).await
}

fn initialize_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    // Logs go to stderr so `--format json` stdout stays machine-readable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn configure_colors(cli: &Cli) {
    let no_color_env = std::env::var_os("NO_COLOR").is_some();
    if cli.no_color || no_color_env || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
}

async fn execute_command(cli: Cli) -> Result<()> {
    match cli.command.clone() {
        Commands::Suggest {
            query,
            limit,
            kind,
            no_static,
            format,
        } => {
            commands::suggest(&cli, &query, limit, kind, !no_static, format).await?;
        },

        Commands::Live {
            limit,
            debounce_ms,
            no_static,
        } => {
            commands::live(&cli, limit, debounce_ms, !no_static).await?;
        },

        Commands::Related {
            query,
            limit,
            format,
        } => {
            commands::related(&cli, &query, limit, format).await?;
        },

        Commands::Stats { format } => {
            commands::stats(&cli, format).await?;
        },

        Commands::Warm { terms } => {
            commands::warm(&cli, &terms).await?;
        },

        Commands::Info { format } => {
            commands::info(&cli, format).await?;
        },

        Commands::Completions { shell } => {
            commands::generate_completions(shell);
        },
    }

    Ok(())
}
