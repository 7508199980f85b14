use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use playshelf_import::{NotifyOutcome, WebhookNotifier};
use playshelf_provider::Settings;

use crate::CliError;

use super::{open_existing_catalog, runtime};

/// Run the `notify` command.
pub(crate) fn run_notify(game_id: i64, db_path: Option<PathBuf>) -> Result<(), CliError> {
    let notifier = WebhookNotifier::from_settings(&Settings::load());
    if !notifier.is_enabled() {
        return Err(CliError::config(
            "webhook URL and API key are required (run 'playshelf config show')",
        ));
    }
    let Some(conn) = open_existing_catalog(db_path)? else {
        return Ok(());
    };

    let rt = runtime()?;
    match rt.block_on(notifier.notify(&conn, game_id)) {
        NotifyOutcome::Delivered => {
            log::info!(
                "{} Webhook sent for game {}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                game_id,
            );
            Ok(())
        }
        NotifyOutcome::Disabled => Ok(()),
        NotifyOutcome::Failed(reason) => Err(CliError::export(format!(
            "Webhook for game {} failed: {}",
            game_id, reason
        ))),
    }
}
