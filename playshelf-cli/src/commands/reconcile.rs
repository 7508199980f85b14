use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use playshelf_catalog::PlatformAliases;
use playshelf_import::{
    NotifyOutcome, ReconcileError, ReconcileOutcome, ReconciliationEngine, WebhookNotifier,
    reconcile_many,
};
use playshelf_provider::{ProviderClient, Settings};

use crate::CliError;
use crate::progress::BarProgress;

use super::{open_catalog, runtime};

/// Run the `reconcile` command.
pub(crate) fn run_reconcile(
    ids: Vec<i64>,
    acting_user: Option<i64>,
    notify: bool,
    aliases_path: Option<PathBuf>,
    db_path: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let settings = Settings::load();
    let client = ProviderClient::from_settings(&settings).map_err(|e| {
        CliError::config(format!(
            "{} (run 'playshelf config show' to inspect settings)",
            e
        ))
    })?;

    let aliases = match &aliases_path {
        Some(path) => {
            let aliases = PlatformAliases::load(path).map_err(|e| CliError::config(e.to_string()))?;
            log::debug!("Loaded {} platform alias(es) from {}", aliases.len(), path.display());
            aliases
        }
        None => PlatformAliases::default(),
    };

    let (conn, db_path) = open_catalog(db_path)?;
    log::debug!("Catalog database: {}", db_path.display());

    let rt = runtime()?;
    let engine = ReconciliationEngine::new(&conn, &client, &aliases);
    let progress = BarProgress::new(ids.len(), quiet);
    let (results, stats) = rt.block_on(reconcile_many(&engine, &ids, acting_user, &progress));

    for (external_id, result) in &results {
        print_result(*external_id, result);
    }

    if notify {
        let notifier = WebhookNotifier::from_settings(&settings);
        if notifier.is_enabled() {
            crate::log_blank();
            let game_ids = results
                .iter()
                .filter_map(|(_, r)| r.as_ref().ok())
                .filter(|outcome| !outcome.is_skipped())
                .filter_map(ReconcileOutcome::game_id);
            for game_id in game_ids {
                match rt.block_on(notifier.notify(&conn, game_id)) {
                    NotifyOutcome::Delivered => log::info!(
                        "  {} webhook sent for game {}",
                        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                        game_id,
                    ),
                    NotifyOutcome::Disabled => {}
                    NotifyOutcome::Failed(reason) => log::warn!(
                        "  {} webhook for game {} dropped: {}",
                        "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                        game_id,
                        reason,
                    ),
                }
            }
        }
    }

    crate::log_blank();
    log::info!(
        "{}",
        "Reconciliation complete".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Created:                {:>6}", stats.created);
    log::info!("  Updated by external id: {:>6}", stats.updated_by_external_id);
    log::info!("  Updated by name:        {:>6}", stats.updated_by_name);
    log::info!("  Skipped:                {:>6}", stats.skipped);
    if stats.failed > 0 {
        log::info!(
            "  Failed:                 {:>6}",
            stats.failed.if_supports_color(Stdout, |t| t.red()),
        );
        return Err(CliError::database(format!(
            "{} reconciliation(s) failed and were rolled back",
            stats.failed
        )));
    }

    Ok(())
}

fn print_result(external_id: i64, result: &Result<ReconcileOutcome, ReconcileError>) {
    match result {
        Ok(ReconcileOutcome::Skipped(reason)) => log::info!(
            "  {:>8}  {} ({})",
            external_id,
            "skipped".if_supports_color(Stdout, |t| t.dimmed()),
            reason,
        ),
        Ok(outcome) => {
            let game = outcome
                .game_id()
                .map(|id| format!("game {}", id))
                .unwrap_or_default();
            let changes = if outcome.changes().is_empty() {
                "no changes".to_string()
            } else {
                outcome.changes().join(", ")
            };
            let label = outcome.label();
            if matches!(outcome, ReconcileOutcome::Created { .. }) {
                log::info!(
                    "  {:>8}  {} {}: {}",
                    external_id,
                    label.if_supports_color(Stdout, |t| t.green()),
                    game,
                    changes,
                );
            } else {
                log::info!(
                    "  {:>8}  {} {}: {}",
                    external_id,
                    label.if_supports_color(Stdout, |t| t.cyan()),
                    game,
                    changes,
                );
            }
        }
        Err(e) => log::info!(
            "  {:>8}  {} {}",
            external_id,
            "failed".if_supports_color(Stdout, |t| t.red()),
            e,
        ),
    }
}
