//! Debounced typeahead over stdin
//!
//! Reads one query per line and feeds it through a
//! [`TypeaheadSession`], so rapid input is debounced and stale
//! completions are dropped exactly as they would be behind a search
//! box. Lines are processed one at a time; each line's update is
//! awaited before the next line is read.

use std::io::Write as _;
use std::time::Duration;

use anyhow::Result;
use gachadex_core::{SuggestService, TypeaheadSession};
use tokio::io::AsyncBufReadExt as _;

use crate::cli::Cli;
use crate::output::{self, OutputFormat, STDOUT_IS_TTY};

/// Execute the live command.
pub async fn execute(
    cli: &Cli,
    limit: Option<usize>,
    debounce_ms: Option<u64>,
    prefer_static: bool,
) -> Result<()> {
    // Interactive path: no request timeout, a stale fetch is simply
    // superseded by the next line
    let config = super::load_config(cli)?;
    let limit = limit.unwrap_or(config.search.default_limit);
    let lang = config.search.default_language;

    let service = SuggestService::new(config)?;
    if prefer_static {
        service.initialize().await;
    }

    let mut session = TypeaheadSession::new(service)
        .with_limit(limit)
        .with_static_first(prefer_static);
    if let Some(ms) = debounce_ms {
        session = session.with_debounce(Duration::from_millis(ms));
    }
    let mut updates = session.subscribe();

    if *STDOUT_IS_TTY {
        println!("Type a query per line (Ctrl-D to exit)");
    }
    prompt();

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let token = session.input(&line);
        let update = updates
            .wait_for(|update| update.token >= token)
            .await?
            .clone();
        output::print_suggestions(&update.suggestions, &update.query, lang, OutputFormat::Text)?;
        prompt();
    }

    Ok(())
}

fn prompt() {
    if *STDOUT_IS_TTY {
        print!("> ");
        let _ = std::io::stdout().flush();
    }
}
