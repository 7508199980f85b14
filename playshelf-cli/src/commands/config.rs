use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use playshelf_provider::{SettingSource, Settings};

fn mask_value(s: &str) -> String {
    if s.chars().count() <= 2 {
        "****".to_string()
    } else {
        format!("{}****", s.chars().take(2).collect::<String>())
    }
}

/// Show current settings and their sources.
pub(crate) fn run_config_show() {
    let path = playshelf_provider::config_path();
    let sources = playshelf_provider::settings_sources();
    let settings = Settings::load();

    log::info!(
        "{}",
        "playshelf Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    match &path {
        Some(p) if p.exists() => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(exists)".if_supports_color(Stdout, |t| t.green()),
            );
        }
        Some(p) => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        None => {
            log::info!(
                "  Config file: {}",
                "could not determine path".if_supports_color(Stdout, |t| t.red()),
            );
        }
    }
    crate::log_blank();

    let fields: &[(&str, &SettingSource, Option<String>)] = &[
        (
            "provider.api_key",
            &sources.provider_api_key,
            settings.provider_api_key.as_deref().map(mask_value),
        ),
        (
            "provider.base_url",
            &sources.provider_base_url,
            Some(settings.provider_base_url.clone()),
        ),
        ("webhook.url", &sources.webhook_url, settings.webhook_url.clone()),
        (
            "webhook.api_key",
            &sources.webhook_api_key,
            settings.webhook_api_key.as_deref().map(mask_value),
        ),
    ];

    for (name, source, value) in fields {
        match value {
            Some(v) => log::info!(
                "  {:<18} {} {}",
                name,
                v,
                format!("({})", source).if_supports_color(Stdout, |t| t.dimmed()),
            ),
            None => log::info!(
                "  {:<18} {}",
                name,
                "not set".if_supports_color(Stdout, |t| t.yellow()),
            ),
        }
    }
}

/// Print the config file path.
pub(crate) fn run_config_path() {
    match playshelf_provider::config_path() {
        Some(path) => log::info!("{}", path.display()),
        None => {
            log::warn!("Could not determine config directory");
            std::process::exit(1);
        }
    }
}
