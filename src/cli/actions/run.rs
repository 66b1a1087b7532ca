use crate::cli::actions::{Action, app};
use anyhow::Result;

/// Execute the provided action.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::App(args) => app::execute(args).await,
    }
}
