//! playshelf CLI
//!
//! Command-line interface for reconciling provider game records into the
//! local catalog and exporting the result.

mod commands;
mod error;
mod progress;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub(crate) use error::CliError;

#[derive(Parser)]
#[command(name = "playshelf")]
#[command(about = "Reconcile provider game records into a local catalog", long_about = None)]
struct Cli {
    /// Catalog database path (defaults to the user data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch games from the provider and merge them into the catalog
    Reconcile {
        /// Provider external ids (e.g., 500,3498)
        #[arg(required = true, value_delimiter = ',', allow_negative_numbers = true)]
        ids: Vec<i64>,

        /// Local user recorded as releaser of newly published games
        #[arg(long)]
        acting_user: Option<i64>,

        /// Post each reconciled game to the configured webhook
        #[arg(long)]
        notify: bool,

        /// YAML file mapping provider platform names to local names
        #[arg(long)]
        aliases: Option<PathBuf>,
    },

    /// Write a game's export JSON to stdout or a file
    Export {
        /// Local game id
        game_id: i64,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Indent the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Post a game to the configured webhook
    Notify {
        /// Local game id
        game_id: i64,
    },

    /// Show a game with its studio, tags, platforms and images
    Show {
        /// Local game id
        game_id: i64,
    },

    /// Show catalog database statistics
    Stats,

    /// Manage provider and webhook settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current settings and their sources
    Show,

    /// Print the config file path
    Path,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let result = match cli.command {
        Commands::Reconcile {
            ids,
            acting_user,
            notify,
            aliases,
        } => commands::reconcile::run_reconcile(
            ids,
            acting_user,
            notify,
            aliases,
            cli.db,
            cli.quiet,
        ),
        Commands::Export {
            game_id,
            output,
            pretty,
        } => commands::export::run_export(game_id, output, pretty, cli.db),
        Commands::Notify { game_id } => commands::notify::run_notify(game_id, cli.db),
        Commands::Show { game_id } => commands::show::run_show(game_id, cli.db),
        Commands::Stats => commands::stats::run_stats(cli.db),
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                commands::config::run_config_show();
                Ok(())
            }
            ConfigAction::Path => {
                commands::config::run_config_path();
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

/// Route `log` output to the terminal. Info lines are printed bare since
/// they carry the command's normal output; `RUST_LOG` overrides the level.
fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| match record.level() {
            log::Level::Info => writeln!(buf, "{}", record.args()),
            level => writeln!(buf, "[{}] {}", level, record.args()),
        })
        .init();
}

/// Print an empty line through the logger.
pub(crate) fn log_blank() {
    log::info!("");
}
