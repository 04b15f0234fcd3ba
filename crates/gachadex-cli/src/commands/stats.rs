//! Search metrics and cache state

use anyhow::Result;
use colored::Colorize;
use gachadex_core::{PrefetchStatus, SearchMetrics, SuggestService};
use serde::Serialize;

use crate::cli::Cli;
use crate::output::OutputFormat;

/// Everything the stats command reports, in one serializable shape.
#[derive(Debug, Serialize)]
struct StatsReport {
    metrics: SearchMetrics,
    top_queries: Vec<(String, usize)>,
    result_cache_entries: usize,
    prefetch: PrefetchStatus,
}

/// Execute the stats command.
///
/// Metrics describe the recent analytics window loaded from the
/// persisted snapshot; the result cache and prefetcher are per-process
/// and therefore start empty here.
pub async fn execute(cli: &Cli, format: OutputFormat) -> Result<()> {
    let config = super::one_shot(super::load_config(cli)?);
    let service = SuggestService::new(config)?;

    let report = StatsReport {
        metrics: service.metrics().await,
        top_queries: service.top_queries(10).await,
        result_cache_entries: service.cache_len().await,
        prefetch: service.prefetch_status().await,
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        },
        OutputFormat::Text => print_text(&report),
    }

    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn print_text(report: &StatsReport) {
    let metrics = &report.metrics;

    println!("{}", "Search metrics (recent window)".bold());
    println!("  Searches:        {}", metrics.total_searches);
    println!("  Average latency: {:.1} ms", metrics.average_latency_ms);
    println!(
        "  Abandonment:     {:.1}% (avg {:.0} ms to abandon)",
        metrics.abandonment_rate * 100.0,
        metrics.average_time_to_abandon_ms
    );

    if !metrics.category_distribution.is_empty() {
        println!("{}", "Categories".bold());
        for (category, count) in &metrics.category_distribution {
            println!("  {category}: {count}");
        }
    }

    if !report.top_queries.is_empty() {
        println!("{}", "Top queries".bold());
        for (query, count) in &report.top_queries {
            println!("  {query}: {count}");
        }
    }

    println!("{}", "Caches".bold());
    println!("  Result cache entries: {}", report.result_cache_entries);
    println!(
        "  Prefetch in flight:   {}/{}",
        report.prefetch.in_flight, report.prefetch.capacity
    );
}
