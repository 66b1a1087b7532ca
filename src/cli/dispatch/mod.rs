//! Command-line argument dispatch.
//!
//! Turns validated CLI matches into an action carrying the resolved client
//! configuration and the first page to open.

use crate::cli::actions::{Action, app::Args};
use crate::cli::commands::{ARG_START_PATH, api};
use crate::config::AppConfig;
use crate::routing::Route;
use anyhow::{Context, Result};

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if the API URL or timeout is invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let api_opts = api::Options::parse(matches)?;
    let config = AppConfig::load(api_opts.runtime_config()).context("invalid API configuration")?;

    let start = matches
        .get_one::<String>(ARG_START_PATH)
        .map_or(Route::Dashboard, |path| Route::parse(path));

    Ok(Action::App(Args { config, start }))
}
