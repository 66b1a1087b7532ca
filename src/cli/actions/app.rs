use crate::{
    api::HttpAuthApi, config::AppConfig, routing::Route, session::SessionStore,
    terminal::Terminal,
};
use anyhow::{Context, Result};
use dialoguer::Password;
use std::io::IsTerminal;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub config: AppConfig,
    pub start: Route,
}

/// Run the terminal front end against the configured API until the user quits.
/// Ctrl-C abandons any in-flight request and stops reading input.
/// # Errors
/// Returns an error if the HTTP client cannot be built or terminal I/O fails.
pub async fn execute(args: Args) -> Result<()> {
    let api = HttpAuthApi::new(&args.config).context("failed to build API client")?;
    let store = SessionStore::new(api);

    info!(
        api_base_url = %args.config.api_base_url,
        timeout_seconds = args.config.timeout.as_secs(),
        start = args.start.path(),
        "starting authdeck"
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received");
            on_signal.cancel();
        }
    });

    let input = BufReader::new(tokio::io::stdin());
    let mut terminal = Terminal::new(&store, input, std::io::stdout()).with_cancel(cancel);
    if std::io::stdin().is_terminal() {
        terminal = terminal.with_hidden_input(|label| {
            Password::new()
                .with_prompt(label)
                .allow_empty_password(true)
                .interact()
                .map_err(std::io::Error::other)
        });
    }
    terminal.run(args.start).await?;

    debug!("terminal closed");
    Ok(())
}
