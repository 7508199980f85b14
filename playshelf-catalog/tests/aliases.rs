use playshelf_catalog::PlatformAliases;
use std::fs;
use tempfile::TempDir;

#[test]
fn builtin_table_maps_genesis_to_mega_drive() {
    let aliases = PlatformAliases::default();
    assert_eq!(aliases.normalize("Genesis"), "Mega Drive");
    assert_eq!(aliases.normalize("NES"), "Nintendo 8bits");
    assert_eq!(aliases.normalize("SNES"), "Super Nintendo");
}

#[test]
fn lookup_is_case_insensitive() {
    let aliases = PlatformAliases::default();
    assert_eq!(aliases.normalize("genesis"), "Mega Drive");
    assert_eq!(aliases.normalize("  snes "), "Super Nintendo");
}

#[test]
fn unknown_names_pass_through() {
    let aliases = PlatformAliases::default();
    assert_eq!(aliases.normalize("PC"), "PC");
}

#[test]
fn empty_table_never_remaps() {
    let aliases = PlatformAliases::empty();
    assert!(aliases.is_empty());
    assert_eq!(aliases.normalize("Genesis"), "Genesis");
}

#[test]
fn load_aliases_from_yaml() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("aliases.yaml");
    fs::write(
        &path,
        r#"
Genesis: "Sega Genesis"
PS1: PlayStation
"#,
    )
    .unwrap();

    let aliases = PlatformAliases::load(&path).unwrap();
    assert_eq!(aliases.len(), 2);
    assert_eq!(aliases.normalize("Genesis"), "Sega Genesis");
    assert_eq!(aliases.normalize("ps1"), "PlayStation");
    // Loaded tables replace the built-in one entirely.
    assert_eq!(aliases.normalize("NES"), "NES");
}

#[test]
fn load_reports_parse_errors() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.yaml");
    fs::write(&path, "- just\n- a list\n").unwrap();

    let err = PlatformAliases::load(&path).unwrap_err();
    assert!(err.to_string().contains("broken.yaml"));
}

#[test]
fn load_reports_missing_file() {
    let tmp = TempDir::new().unwrap();
    let result = PlatformAliases::load(&tmp.path().join("missing.yaml"));
    assert!(result.is_err());
}
