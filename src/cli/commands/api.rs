use crate::config::{DEFAULT_TIMEOUT_SECONDS, RuntimeConfig};
use clap::{Arg, ArgMatches, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_TIMEOUT_SECONDS: &str = "timeout-seconds";

#[derive(Debug, Clone)]
pub struct Options {
    pub api_url: Option<String>,
    pub timeout_seconds: u64,
}

impl Options {
    /// Parse API client arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the timeout is zero.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let timeout_seconds = matches
            .get_one::<u64>(ARG_TIMEOUT_SECONDS)
            .copied()
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);
        if timeout_seconds == 0 {
            anyhow::bail!("--{ARG_TIMEOUT_SECONDS} must be greater than zero");
        }

        Ok(Self {
            api_url: matches.get_one::<String>(ARG_API_URL).cloned(),
            timeout_seconds,
        })
    }

    #[must_use]
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            api_base_url: self.api_url.clone(),
            timeout_seconds: Some(self.timeout_seconds),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Base URL of the authentication API")
                .long_help(
                    "Base URL of the authentication API. Endpoint paths such as /signup are appended to it.",
                )
                .env("AUTHDECK_API_URL"),
        )
        .arg(
            Arg::new(ARG_TIMEOUT_SECONDS)
                .long(ARG_TIMEOUT_SECONDS)
                .help("Request timeout in seconds")
                .env("AUTHDECK_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64)),
        )
}
