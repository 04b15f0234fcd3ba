//! Related-term lookup from recorded search history

use anyhow::Result;
use colored::Colorize;
use gachadex_core::SuggestService;

use crate::cli::Cli;
use crate::output::OutputFormat;

/// Execute the related command.
///
/// Related terms come from the analytics window, which is warm-started
/// from the persisted snapshot, so this works across invocations: run a
/// few `suggest` commands first, then ask what relates to one of them.
pub async fn execute(
    cli: &Cli,
    query: &str,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let config = super::one_shot(super::load_config(cli)?);
    let limit = limit.unwrap_or(config.analytics.related_limit);

    let service = SuggestService::new(config)?;
    let related = service.related_terms(query, limit).await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&related)?);
        },
        OutputFormat::Text => {
            if related.is_empty() {
                println!("No recorded terms related to '{query}'");
                return Ok(());
            }
            for term in &related {
                println!(
                    "{} {} [{}]",
                    term.term.bold(),
                    format!("x{}", term.frequency).dimmed(),
                    term.category
                );
            }
        },
    }

    Ok(())
}
