//! # CLI Structure and Argument Parsing
//!
//! Defines the command-line interface for `gachadex`, the terminal front
//! end over the suggestion pipeline. Built with `clap` derive macros.
//!
//! ## Usage Patterns
//!
//! ```bash
//! # One-shot suggestions
//! gachadex suggest hilda
//! gachadex suggest "judgement" --limit 5 --format json
//! gachadex suggest blade --kind weapon
//!
//! # Debounced typeahead over stdin
//! gachadex live
//!
//! # Analytics surfaces
//! gachadex related hilda
//! gachadex stats --format json
//!
//! # Cache maintenance
//! gachadex warm hilda zephyr
//!
//! # Snapshot and configuration details
//! gachadex info
//! ```
//!
//! ## Global Options
//!
//! - `--verbose` / `--quiet`: logging verbosity (logs go to stderr)
//! - `--config <PATH>`: explicit configuration file
//! - `--lang <en|vi>`: display language for record names
//! - `--no-color`: disable ANSI colors (also respects `NO_COLOR`)

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use gachadex_core::{Language, SuggestionKind};

use crate::output::OutputFormat;

/// Restrict a search to one record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindFilter {
    /// Characters only, via the `character-search` stored query
    Character,
    /// Weapons only, via the `weapon-search` stored query
    Weapon,
}

impl From<KindFilter> for SuggestionKind {
    fn from(filter: KindFilter) -> Self {
        match filter {
            KindFilter::Character => Self::Character,
            KindFilter::Weapon => Self::Weapon,
        }
    }
}

/// Main CLI structure for the `gachadex` command.
#[derive(Parser, Clone, Debug)]
#[command(name = "gachadex")]
#[command(version)]
#[command(
    about = "gachadex - search suggestions for the Duet Night Abyss database",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Path to an explicit configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Display language for record names (en or vi)
    #[arg(long, global = true, value_name = "LANG")]
    pub lang: Option<Language>,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Resolve ordered suggestions for a query
    Suggest {
        /// Search query
        query: String,

        /// Maximum number of suggestions to return
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Search a single record kind through its per-kind stored query
        #[arg(short = 'k', long, value_enum)]
        kind: Option<KindFilter>,

        /// Skip the static snapshot tier and go straight to the store
        #[arg(long)]
        no_static: bool,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Debounced typeahead reading queries from stdin, one per line
    Live {
        /// Maximum number of suggestions per update
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Override the configured debounce delay in milliseconds
        #[arg(long, value_name = "MS")]
        debounce_ms: Option<u64>,

        /// Skip the static snapshot tier and go straight to the store
        #[arg(long)]
        no_static: bool,
    },

    /// Show recently searched terms related to a query
    Related {
        /// Query to find related terms for
        query: String,

        /// Maximum number of related terms
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show windowed search metrics and cache state
    Stats {
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Warm the result cache for the given terms
    Warm {
        /// Terms to fetch and cache
        #[arg(required = true)]
        terms: Vec<String>,
    },

    /// Show static snapshot and configuration details
    Info {
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_suggest() {
        let cli = Cli::try_parse_from(["gachadex", "suggest", "hilda", "-n", "5"]).unwrap();
        match cli.command {
            Commands::Suggest { query, limit, .. } => {
                assert_eq!(query, "hilda");
                assert_eq!(limit, Some(5));
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_kind_filter() {
        let cli =
            Cli::try_parse_from(["gachadex", "suggest", "blade", "--kind", "weapon"]).unwrap();
        match cli.command {
            Commands::Suggest { kind, .. } => assert_eq!(kind, Some(KindFilter::Weapon)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["gachadex", "suggest", "x", "--kind", "artifact"]).is_err());
    }

    #[test]
    fn test_cli_parses_global_lang() {
        let cli = Cli::try_parse_from(["gachadex", "suggest", "hilda", "--lang", "vi"]).unwrap();
        assert_eq!(cli.lang, Some(Language::Vi));
    }

    #[test]
    fn test_cli_rejects_unknown_lang() {
        assert!(Cli::try_parse_from(["gachadex", "suggest", "hilda", "--lang", "fr"]).is_err());
    }

    #[test]
    fn test_warm_requires_terms() {
        assert!(Cli::try_parse_from(["gachadex", "warm"]).is_err());
    }
}
