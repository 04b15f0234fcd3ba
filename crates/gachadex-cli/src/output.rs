//! Output formatting for suggestion results and reports.
//!
//! Text output highlights the matched part of each name the way the
//! site highlights typeahead hits: a case-insensitive match on the
//! query, wrapped in bold. JSON output serializes the core types
//! directly so scripts see the same shape the web UI consumes.

use clap::ValueEnum;
use colored::Colorize;
use is_terminal::IsTerminal;
use once_cell::sync::Lazy;
use regex::RegexBuilder;

use gachadex_core::{Language, Suggestion, SuggestionKind};

/// Whether stdout is attached to a terminal. Decides prompt rendering
/// in `live` mode; color gating is handled globally at startup.
pub static STDOUT_IS_TTY: Lazy<bool> = Lazy::new(|| std::io::stdout().is_terminal());

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Text,
    /// Machine-readable JSON
    Json,
}

/// Print a suggestion list in the requested format.
pub fn print_suggestions(
    suggestions: &[Suggestion],
    query: &str,
    lang: Language,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(suggestions)?);
        },
        OutputFormat::Text => {
            if suggestions.is_empty() {
                println!("No suggestions for '{query}'");
                return Ok(());
            }
            for (index, suggestion) in suggestions.iter().enumerate() {
                print_suggestion_line(index + 1, suggestion, query, lang);
            }
        },
    }
    Ok(())
}

fn print_suggestion_line(rank: usize, suggestion: &Suggestion, query: &str, lang: Language) {
    let name = highlight_match(suggestion.display_name(lang), query);
    let kind = kind_tag(suggestion.kind);
    if suggestion.subtitle.is_empty() {
        println!("{rank:>3}. {name} {kind} /{}", suggestion.slug);
    } else {
        println!(
            "{rank:>3}. {name} {kind} {} /{}",
            suggestion.subtitle.dimmed(),
            suggestion.slug
        );
    }
}

fn kind_tag(kind: SuggestionKind) -> String {
    let tag = format!("[{kind}]");
    match kind {
        SuggestionKind::Character => tag.cyan().to_string(),
        SuggestionKind::Weapon => tag.yellow().to_string(),
    }
}

/// Wrap every case-insensitive occurrence of the query in bold.
///
/// Falls back to the unmodified text when the query is blank or the
/// escaped pattern fails to compile.
pub fn highlight_match(text: &str, query: &str) -> String {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return text.to_string();
    }

    let Ok(pattern) = RegexBuilder::new(&regex::escape(trimmed))
        .case_insensitive(true)
        .build()
    else {
        return text.to_string();
    };

    pattern
        .replace_all(text, |caps: &regex::Captures<'_>| {
            caps[0].bold().to_string()
        })
        .into_owned()
}
