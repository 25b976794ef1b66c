use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

#[test]
fn defaults_match_feed_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.feed_base_url, "https://api.wikimedia.org");
    assert_eq!(settings.feed_timeout_ms, 8000);

    let feed = settings.feed_settings();
    assert_eq!(feed.timeout, Duration::from_millis(8000));
    assert_eq!(feed.user_agent, "BornToday/1.0");
    assert_eq!(feed.language, "en");
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
feed_base_url = "http://localhost:9000"
feed_timeout_ms = 2500
log_filter = "debug"
"#,
    )
    .expect("parse");

    assert_eq!(settings.feed_base_url, "http://localhost:9000");
    assert_eq!(settings.feed_timeout_ms, 2500);
    assert_eq!(settings.log_filter, "debug");
    assert_eq!(settings.feed_language, "en");
}

#[test]
fn malformed_file_is_an_error() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "feed_timeout_ms = \"soon\"").is_err());
}

#[test]
fn env_overrides_win_and_bad_numbers_are_ignored() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("APP__FEED_LANGUAGE", "de"),
        ("APP__FEED_TIMEOUT_MS", "not-a-number"),
        ("APP__USER_AGENT", "BornToday-test/0.1"),
    ]);
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(settings.feed_language, "de");
    assert_eq!(settings.feed_timeout_ms, 8000);
    assert_eq!(settings.user_agent, "BornToday-test/0.1");
}

#[test]
fn explicit_config_path_is_read() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("born_today_config_test_{suffix}.toml"));
    fs::write(&path, "feed_language = \"fr\"\n").expect("write config");

    let settings = load_settings(Some(path.as_path())).expect("load");
    assert_eq!(settings.feed_language, "fr");

    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn missing_explicit_config_path_is_an_error() {
    let path = env::temp_dir().join("born_today_config_that_does_not_exist.toml");
    assert!(load_settings(Some(path.as_path())).is_err());
}
