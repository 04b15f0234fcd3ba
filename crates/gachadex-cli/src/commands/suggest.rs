//! One-shot suggestion lookup

use anyhow::Result;
use gachadex_core::SuggestService;

use crate::cli::{Cli, KindFilter};
use crate::output::{self, OutputFormat};

/// Execute the suggest command.
///
/// Walks the same pipeline the typeahead uses: static tier first (when
/// preferred), then the result cache, then the store. With `--kind`,
/// the lookup goes through the per-kind stored query instead, falling
/// back to the static tier on store failure. The lookup itself never
/// fails; only setup problems (bad config, unusable HTTP client) exit
/// non-zero.
pub async fn execute(
    cli: &Cli,
    query: &str,
    limit: Option<usize>,
    kind: Option<KindFilter>,
    prefer_static: bool,
    format: OutputFormat,
) -> Result<()> {
    let config = super::one_shot(super::load_config(cli)?);
    let limit = limit.unwrap_or(config.search.default_limit);
    let lang = config.search.default_language;

    let service = SuggestService::new(config)?;
    if prefer_static {
        service.initialize().await;
    }

    let suggestions = match kind {
        Some(filter) => service.search_kind(query, filter.into(), limit).await,
        None => service.search_suggestions(query, limit, prefer_static).await,
    };
    output::print_suggestions(&suggestions, query, lang, format)
}
