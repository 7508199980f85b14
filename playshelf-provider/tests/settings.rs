use std::io::Write;

use playshelf_provider::*;

fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |var: &str| {
        pairs
            .iter()
            .find(|(k, _)| *k == var)
            .map(|(_, v)| v.to_string())
    }
}

fn config_from(text: &str) -> ConfigFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    ConfigFile::load(file.path()).unwrap()
}

#[test]
fn defaults_when_nothing_is_set() {
    let settings = Settings::resolve(&|_| None, &ConfigFile::default());
    assert_eq!(settings.provider_api_key, None);
    assert_eq!(settings.provider_base_url, DEFAULT_BASE_URL);
    assert_eq!(settings.webhook_url, None);
    assert_eq!(settings.webhook_api_key, None);
}

#[test]
fn config_file_fills_values() {
    let config = config_from(
        r#"
[provider]
api_key = "file-key"

[webhook]
url = "https://hooks.example/games"
api_key = "hook-key"
"#,
    );
    let settings = Settings::resolve(&|_| None, &config);
    assert_eq!(settings.provider_api_key.as_deref(), Some("file-key"));
    assert_eq!(settings.provider_base_url, DEFAULT_BASE_URL);
    assert_eq!(settings.webhook_url.as_deref(), Some("https://hooks.example/games"));
    assert_eq!(settings.webhook_api_key.as_deref(), Some("hook-key"));
}

#[test]
fn env_overrides_config_file() {
    let config = config_from("[provider]\napi_key = \"file-key\"\nbase_url = \"http://file\"\n");
    let env = env_of(&[
        ("PLAYSHELF_PROVIDER_API_KEY", "env-key"),
        ("PLAYSHELF_WEBHOOK_URL", "http://hook"),
    ]);

    let settings = Settings::resolve(&env, &config);
    assert_eq!(settings.provider_api_key.as_deref(), Some("env-key"));
    assert_eq!(settings.provider_base_url, "http://file");
    assert_eq!(settings.webhook_url.as_deref(), Some("http://hook"));

    let sources = sources_from(&env, &config);
    assert_eq!(
        sources.provider_api_key,
        SettingSource::EnvVar("PLAYSHELF_PROVIDER_API_KEY")
    );
    assert_eq!(sources.provider_base_url, SettingSource::ConfigFile);
    assert_eq!(
        sources.webhook_url,
        SettingSource::EnvVar("PLAYSHELF_WEBHOOK_URL")
    );
    assert_eq!(sources.webhook_api_key, SettingSource::Missing);
}

#[test]
fn default_base_url_source() {
    let sources = sources_from(&|_| None, &ConfigFile::default());
    assert_eq!(sources.provider_base_url, SettingSource::Default);
    assert_eq!(sources.provider_base_url.to_string(), "default");
    assert_eq!(
        SettingSource::EnvVar("PLAYSHELF_WEBHOOK_URL").to_string(),
        "env $PLAYSHELF_WEBHOOK_URL"
    );
}

#[test]
fn invalid_config_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[provider\napi_key = ").unwrap();
    assert!(matches!(
        ConfigFile::load(file.path()),
        Err(SettingsError::Parse { .. })
    ));
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        ConfigFile::load(&dir.path().join("nope.toml")),
        Err(SettingsError::Io { .. })
    ));
}
