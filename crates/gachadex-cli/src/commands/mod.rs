//! Command implementations for the gachadex CLI
//!
//! Each command lives in its own submodule and exposes an `execute`
//! function taking the parsed global flags plus its own arguments.

mod completions;
mod info;
mod live;
mod related;
mod stats;
mod suggest;
mod warm;

pub use completions::generate as generate_completions;
pub use info::execute as info;
pub use live::execute as live;
pub use related::execute as related;
pub use stats::execute as stats;
pub use suggest::execute as suggest;
pub use warm::execute as warm;

use anyhow::Context;
use gachadex_core::Config;

use crate::cli::Cli;

/// Request timeout applied by one-shot commands. The interactive
/// typeahead path runs without one; a terminal command hanging on a
/// wedged store is not acceptable the same way.
pub(crate) const ONE_SHOT_TIMEOUT_SECS: u64 = 30;

/// Resolve configuration from the global flags.
pub(crate) fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load().context("loading configuration")?,
    };

    if let Some(lang) = cli.lang {
        config.search.default_language = lang;
    }

    Ok(config)
}

/// Apply the one-shot request timeout unless the config already set one.
pub(crate) fn one_shot(mut config: Config) -> Config {
    if config.store.request_timeout_secs.is_none() {
        config.store.request_timeout_secs = Some(ONE_SHOT_TIMEOUT_SECS);
    }
    config
}
