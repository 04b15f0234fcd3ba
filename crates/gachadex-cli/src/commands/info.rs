//! Static snapshot and configuration details

use anyhow::Result;
use colored::Colorize;
use gachadex_core::{SnapshotInfo, SuggestService};
use serde::Serialize;

use crate::cli::Cli;
use crate::output::OutputFormat;

#[derive(Debug, Serialize)]
struct InfoReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<SnapshotInfo>,
    endpoint: String,
    dataset: String,
    data_dir: String,
    default_limit: usize,
    debounce_ms: u64,
    cache_capacity: usize,
}

/// Execute the info command.
pub async fn execute(cli: &Cli, format: OutputFormat) -> Result<()> {
    let config = super::one_shot(super::load_config(cli)?);
    let service = SuggestService::new(config)?;
    service.initialize().await;

    let config = service.config();
    let report = InfoReport {
        snapshot: service.snapshot_info().await,
        endpoint: config.store.endpoint.clone(),
        dataset: config.store.dataset.clone(),
        data_dir: config.paths.data_dir.display().to_string(),
        default_limit: config.search.default_limit,
        debounce_ms: config.search.debounce_ms,
        cache_capacity: config.cache.capacity,
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        },
        OutputFormat::Text => print_text(&report),
    }

    Ok(())
}

fn print_text(report: &InfoReport) {
    match &report.snapshot {
        Some(snapshot) => {
            let origin = if snapshot.from_files {
                "from files"
            } else {
                "bundled"
            };
            println!(
                "{} {} characters, {} weapons ({origin})",
                "Snapshot:".bold(),
                snapshot.characters,
                snapshot.weapons
            );
            println!("{} {}", "Digest:".bold(), snapshot.digest);
        },
        None => println!("{} unavailable", "Snapshot:".bold()),
    }

    println!(
        "{} {} (dataset {})",
        "Store:".bold(),
        report.endpoint,
        report.dataset
    );
    println!("{} {}", "Data dir:".bold(), report.data_dir);
    println!(
        "{} limit {}, debounce {} ms, cache {} entries",
        "Defaults:".bold(),
        report.default_limit,
        report.debounce_ms,
        report.cache_capacity
    );
}
