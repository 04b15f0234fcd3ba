//! Result-cache warming for explicit terms

use anyhow::Result;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};

use gachadex_core::SuggestService;

use crate::cli::Cli;
use crate::output::STDOUT_IS_TTY;

/// Execute the warm command.
///
/// Fetches and caches results for each term, bounded to the configured
/// prefetch concurrency. Individual failures are reported and skipped;
/// the command itself only fails on setup problems, matching the
/// pipeline's posture that warming is always optional work.
pub async fn execute(cli: &Cli, terms: &[String]) -> Result<()> {
    let config = super::one_shot(super::load_config(cli)?);
    let concurrency = config.prefetch.max_in_flight.max(1);
    let service = SuggestService::new(config)?;

    let bar = progress_bar(terms.len() as u64);

    let outcomes: Vec<(String, gachadex_core::Result<usize>)> =
        stream::iter(terms.iter().cloned())
            .map(|term| {
                let service = service.clone();
                let bar = bar.clone();
                async move {
                    let outcome = service.warm_term(&term).await;
                    bar.inc(1);
                    (term, outcome)
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;
    bar.finish_and_clear();

    let mut cached = 0usize;
    let mut failed = 0usize;
    for (term, outcome) in &outcomes {
        match outcome {
            Ok(count) => {
                cached += count;
                println!("warmed '{term}' ({count} suggestions)");
            },
            Err(e) => {
                failed += 1;
                eprintln!("failed to warm '{term}': {e}");
            },
        }
    }

    println!(
        "{} of {} terms warmed, {cached} suggestions cached",
        outcomes.len() - failed,
        outcomes.len()
    );
    Ok(())
}

fn progress_bar(len: u64) -> ProgressBar {
    if !*STDOUT_IS_TTY {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("{bar:30} {pos}/{len} warming") {
        bar.set_style(style);
    }
    bar
}
