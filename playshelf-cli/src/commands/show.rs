use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

use super::open_existing_catalog;

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Run the `show` command.
pub(crate) fn run_show(game_id: i64, db_path: Option<PathBuf>) -> Result<(), CliError> {
    let Some(conn) = open_existing_catalog(db_path)? else {
        return Ok(());
    };

    let aggregate = playshelf_db::load_game_aggregate(&conn, game_id)
        .map_err(|e| CliError::database(format!("Failed to load game {}: {}", game_id, e)))?
        .ok_or_else(|| CliError::database(format!("Game {} not found", game_id)))?;
    let game = &aggregate.game;

    log::info!(
        "{} {}",
        game.name.if_supports_color(Stdout, |t| t.bold()),
        format!("(#{})", game.id).if_supports_color(Stdout, |t| t.dimmed()),
    );
    log::info!("  External id:  {}", or_dash(game.external_id));
    log::info!(
        "  Studio:       {}",
        or_dash(aggregate.studio.as_ref().map(|s| s.name.as_str())),
    );
    log::info!("  Status:       {}", game.status.as_str());
    log::info!("  Released by:  {}", or_dash(game.released_by));
    log::info!("  Metascore:    {}", or_dash(game.metascore));
    log::info!("  User score:   {}", or_dash(game.user_score));
    log::info!("  Age rating:   {}", or_dash(game.age_rating.as_deref()));
    log::info!("  Cover:        {}", or_dash(game.cover_url.as_deref()));

    let tags: Vec<&str> = aggregate.tags.iter().map(|t| t.slug.as_str()).collect();
    log::info!(
        "  Tags:         {}",
        if tags.is_empty() { "-".to_string() } else { tags.join(", ") },
    );

    if aggregate.platforms.is_empty() {
        log::info!("  Platforms:    -");
    } else {
        log::info!("  Platforms:");
        for link in &aggregate.platforms {
            log::info!(
                "    {:<24} {}",
                link.platform.name.if_supports_color(Stdout, |t| t.cyan()),
                or_dash(link.release_date.as_deref()),
            );
        }
    }

    if !aggregate.images.is_empty() {
        log::info!("  Images:");
        for image in &aggregate.images {
            log::info!("    {}", image.url);
        }
    }

    if let Some(description) = game.description.as_deref() {
        crate::log_blank();
        log::info!("{}", description);
    }

    Ok(())
}
