//! Configuration loading and validation tests

use figment::Jail;
use tempfile::TempDir;
use wxbot_domain::Roster;
use wxbot_infrastructure::config::{
    AppConfig, BrokerBackend, ConfigLoader, Environment, LoggingConfig, validate_app_config,
};

fn loader_in(dir: &TempDir, toml: &str) -> ConfigLoader {
    let path = dir.path().join("wxbot.toml");
    std::fs::write(&path, toml).unwrap();
    ConfigLoader::new()
        .with_config_path(path)
        .with_env_prefix("WXBOT_TEST_UNSET")
}

#[test]
fn test_defaults_are_valid() {
    let config = AppConfig::default();
    validate_app_config(&config).unwrap();

    assert_eq!(config.cache.ttl_secs, 600);
    assert_eq!(config.cache.namespace, "weather");
    assert_eq!(config.scheduler.roster.len(), 4);
    assert_eq!(config.refresh_period().as_secs(), 600);
    assert_eq!(config.broker.max_retries, 5);
    assert_eq!(config.broker.delivery_timeout_ms, 15_000);
    assert_eq!(config.broker.provider, BrokerBackend::Tokio);
}

#[test]
fn test_toml_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let config = loader_in(
        &dir,
        r#"
        [cache]
        ttl_secs = 120

        [scheduler]
        roster = ["Москва", "Орск", "Москва"]
        period_secs = 60
        "#,
    )
    .load()
    .unwrap();

    assert_eq!(config.cache.ttl_secs, 120);
    assert_eq!(config.refresh_period().as_secs(), 60);
    let roster: Vec<&str> = config.scheduler.roster.iter().collect();
    assert_eq!(roster, vec!["Москва", "Орск"]);
}

#[test]
fn test_period_defaults_to_ttl() {
    let dir = TempDir::new().unwrap();
    let config = loader_in(&dir, "[cache]\nttl_secs = 90\n").load().unwrap();
    assert_eq!(config.refresh_period().as_secs(), 90);
}

#[test]
fn test_env_selects_logging_preset() {
    let dir = TempDir::new().unwrap();
    let config = loader_in(&dir, "env = \"prod\"\n").load().unwrap();

    assert_eq!(config.env, Environment::Prod);
    assert_eq!(config.logging, LoggingConfig::for_env(Environment::Prod));
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.json_format);
}

#[test]
fn test_explicit_logging_beats_preset() {
    let dir = TempDir::new().unwrap();
    let config = loader_in(&dir, "env = \"prod\"\n[logging]\nlevel = \"warn\"\n")
        .load()
        .unwrap();

    assert_eq!(config.logging.level, "warn");
    assert!(config.logging.json_format);
}

#[test]
fn test_environment_variables_override_file() {
    Jail::expect_with(|jail| {
        jail.create_file("custom.toml", "[cache]\nttl_secs = 120\n")?;
        jail.set_env("WXBOT_CACHE__TTL_SECS", "300");
        jail.set_env("WXBOT_BROKER__PROVIDER", "disabled");

        let config = ConfigLoader::new()
            .with_config_path("custom.toml")
            .load()
            .map_err(|e| e.to_string())?;

        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.broker.provider, BrokerBackend::Disabled);
        Ok(())
    });
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let result = ConfigLoader::new()
        .with_config_path("/nonexistent/wxbot.toml")
        .load();
    assert!(result.is_err());
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("saved.toml");
    let mut config = AppConfig::default();
    config.cache.ttl_secs = 42;

    let loader = ConfigLoader::new().with_env_prefix("WXBOT_TEST_UNSET");
    loader.save_to_file(&config, &path).unwrap();
    let reloaded = loader.with_config_path(&path).load().unwrap();

    assert_eq!(reloaded.cache.ttl_secs, 42);
    assert_eq!(reloaded.scheduler.roster, config.scheduler.roster);
}

fn rejected(mutate: impl FnOnce(&mut AppConfig)) -> bool {
    let mut config = AppConfig::default();
    mutate(&mut config);
    validate_app_config(&config).is_err()
}

#[test]
fn test_validation_rejects_bad_values() {
    assert!(rejected(|c| c.cache.ttl_secs = 0), "zero ttl");
    assert!(rejected(|c| c.cache.provider = "redis".into()), "redis without url");
    assert!(rejected(|c| c.broker.provider = BrokerBackend::Nats), "nats without url");
    assert!(rejected(|c| {
        c.broker.topics.insert("alerts".into(), 0);
    }));
    assert!(rejected(|c| c.broker.consume_topics.push("alerts".into())));
    assert!(rejected(|c| c.broker.notify_topic = Some("alerts".into())));
    assert!(rejected(|c| c.broker.delivery_timeout_ms = 0));
    assert!(rejected(|c| c.scheduler.period_secs = Some(0)));
    assert!(rejected(|c| c.scheduler.roster = Roster::default()), "empty roster");
    assert!(rejected(|c| c.shutdown_timeout_secs = 0));
}

#[test]
fn test_disabled_parts_skip_validation() {
    let mut config = AppConfig::default();
    config.scheduler.enabled = false;
    config.scheduler.roster = Roster::default();
    config.broker.provider = BrokerBackend::Disabled;
    config.broker.delivery_timeout_ms = 0;

    validate_app_config(&config).unwrap();
}
