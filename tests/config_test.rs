use std::io::Write;

use skillfarm_board::color::Color;
use skillfarm_board::config::loader::{load_config, parse_config};
use skillfarm_board::config::types::{AppConfig, TableSource};

#[test]
fn empty_config_uses_defaults() {
    let config = parse_config("").unwrap();
    assert_eq!(config.server.base_url, "http://localhost:8000/skillfarm/");
    assert_eq!(config.server.character_id, 0);
    assert_eq!(config.server.table_source, TableSource::Details);
    assert_eq!(config.server.inactive_days, 3);
    assert_eq!(config.defaults.page_size, 25);
    assert_eq!(config.labels.not_updated, "not updated");
    assert!(config.server.csrf_token.is_none());
}

#[test]
fn parse_server_section() {
    let config = parse_config(
        r#"
[server]
base_url = "https://auth.example.org/skillfarm/"
csrf_token = "tok"
session_cookie = "sess"
character_id = 90000001
table_source = "roster"
inactive_days = 7
"#,
    )
    .unwrap();
    assert_eq!(config.server.base_url, "https://auth.example.org/skillfarm/");
    assert_eq!(config.server.csrf_token.as_deref(), Some("tok"));
    assert_eq!(config.server.session_cookie.as_deref(), Some("sess"));
    assert_eq!(config.server.character_id, 90_000_001);
    assert_eq!(config.server.table_source, TableSource::Roster);
    assert_eq!(config.server.inactive_days, 7);
    // Unset paths keep their defaults.
    assert_eq!(config.server.alarm_path, "switch_alarm/{character_id}/");
    assert_eq!(
        config.server.mark_as_read_path,
        "mark_as_read/{character_id}/"
    );
}

#[test]
fn parse_unknown_keys_ignored() {
    let config: AppConfig = toml::from_str(
        r#"
unknown_top_level = "ignored"

[server]
also_unknown = 1
"#,
    )
    .unwrap();
    assert_eq!(config.defaults.page_size, 25);
}

#[test]
fn parse_labels_override() {
    let config = parse_config(
        r#"
[labels]
details_tab = "Aktiv"
confirm_toggle_alarm = "Alarm für {} umschalten?"
"#,
    )
    .unwrap();
    assert_eq!(config.labels.details_tab, "Aktiv");
    assert_eq!(config.labels.inactive_tab, AppConfig::default().labels.inactive_tab);
}

#[test]
fn parse_theme_colors() {
    let config = parse_config(
        r##"
[theme.colors.text]
primary = "7"
warning = "#ffaa00"

[theme.colors.background]
row_alert = "52"
"##,
    )
    .unwrap();
    assert_eq!(config.theme.colors.text.primary, Some(Color::Ansi256(7)));
    assert_eq!(
        config.theme.colors.text.warning,
        Some(Color::Hex {
            r: 0xff,
            g: 0xaa,
            b: 0x00
        })
    );
    assert_eq!(config.theme.colors.background.row_alert, Some(Color::Ansi256(52)));
}

#[test]
fn invalid_color_is_rejected() {
    let err = parse_config(
        r#"
[theme.colors.text]
primary = "not-a-color"
"#,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("not-a-color"));
}

#[test]
fn zero_page_size_is_rejected() {
    let err = parse_config("[defaults]\npage_size = 0\n").unwrap_err();
    assert!(err.to_string().contains("page_size"));
}

#[test]
fn load_config_from_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[defaults]\npage_size = 10\ndate_format = \"relative\"").unwrap();

    let config = load_config(Some(file.path())).unwrap();
    assert_eq!(config.defaults.page_size, 10);
    assert_eq!(config.defaults.date_format, "relative");
}

#[test]
fn load_config_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = load_config(Some(&path)).unwrap_err();
    assert!(format!("{err:#}").contains("absent.toml"));
}
