//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

#[test]
fn default_config_path_contains_kscroll_config_toml() {
    let Some(path) = default_config_path() else {
        return;
    };
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("kscroll") && path_str.ends_with("config.toml"),
        "Path should contain 'kscroll' and end with 'config.toml', got: {}",
        path_str
    );
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(
        result,
        Ok(None),
        "Missing config file should return Ok(None), not an error"
    );
}

#[test]
fn load_config_file_parses_valid_toml() {
    let temp_dir = env::temp_dir();
    let config_path = temp_dir.join("kscroll_test_config.toml");

    let toml_content = r#"
min_bound = 0.0
max_bound = 1000.0
max_overscroll = 80.0
friction_base = 0.001
tick_interval_ms = 16
overscroll_correction_duration_ms = 400
"#;

    fs::write(&config_path, toml_content).expect("Failed to write test config");

    let result = load_config_file(&config_path);
    assert!(result.is_ok(), "Should successfully parse valid TOML");

    let config = result.unwrap().expect("Should return Some(ConfigFile) for existing file");
    assert_eq!(config.min_bound, Some(0.0));
    assert_eq!(config.max_bound, Some(1000.0));
    assert_eq!(config.max_overscroll, Some(80.0));
    assert_eq!(config.friction_base, Some(0.001));
    assert_eq!(config.tick_interval_ms, Some(16));
    assert_eq!(config.overscroll_correction_duration_ms, Some(400));
    assert_eq!(config.max_speed, None);

    fs::remove_file(config_path).ok();
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let temp_dir = env::temp_dir();
    let config_path = temp_dir.join("kscroll_test_invalid.toml");

    fs::write(&config_path, "this is not valid TOML ][}{")
        .expect("Failed to write invalid test config");

    let result = load_config_file(&config_path);
    match result {
        Err(ConfigError::ParseError { path, reason: _ }) => {
            assert_eq!(path, config_path);
        }
        _ => panic!("Expected ParseError, got {:?}", result),
    }

    fs::remove_file(config_path).ok();
}

#[test]
fn merge_config_uses_defaults_when_none() {
    let resolved = merge_config(None);
    assert_eq!(resolved, ResolvedConfig::default());
}

#[test]
fn merge_config_overrides_with_config_file_values() {
    let config_file = ConfigFile {
        min_bound: Some(0.0),
        max_bound: Some(500.0),
        max_speed: Some(50.0),
        tap_radius_squared: Some(64.0),
        flick_filter_timeout_ms: Some(120),
        bypass_window_ms: Some(300),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(config_file));
    let defaults = ScrollerConfig::default();

    assert_eq!(resolved.scroller.min_bound, 0.0);
    assert_eq!(resolved.scroller.max_bound, 500.0);
    assert_eq!(resolved.scroller.max_speed, 50.0);
    assert_eq!(resolved.scroller.tap_radius_squared, 64.0);
    assert_eq!(resolved.scroller.flick_filter_timeout_ms, 120);
    assert_eq!(resolved.scroller.bypass_window_ms, 300);
    assert_eq!(resolved.scroller.friction_base, defaults.friction_base);
    assert_eq!(
        resolved.scroller.flick_velocity_scalar,
        defaults.flick_velocity_scalar
    );
}

/// RAII guard to ensure environment variable cleanup even under test parallelism.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        env::remove_var(name);
        EnvGuard(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(self.0);
    }
}

#[test]
#[serial(kscroll_env)]
fn apply_env_overrides_respects_numeric_vars() {
    let _a = EnvGuard::new("KSCROLL_MAX_OVERSCROLL");
    let _b = EnvGuard::new("KSCROLL_FRICTION");
    let _c = EnvGuard::new("KSCROLL_TICK_MS");

    env::set_var("KSCROLL_MAX_OVERSCROLL", "64");
    env::set_var("KSCROLL_FRICTION", "0.002");
    env::set_var("KSCROLL_TICK_MS", "16");

    let result = apply_env_overrides(ResolvedConfig::default());

    assert_eq!(result.scroller.max_overscroll, 64.0);
    assert_eq!(result.scroller.friction_base, 0.002);
    assert_eq!(result.scroller.tick_interval_ms, 16);
}

#[test]
#[serial(kscroll_env)]
fn apply_env_overrides_ignores_unparseable_values() {
    let _guard = EnvGuard::new("KSCROLL_TICK_MS");
    env::set_var("KSCROLL_TICK_MS", "fast");

    let base = ResolvedConfig::default();
    let result = apply_env_overrides(base.clone());

    assert_eq!(result, base, "Garbage env values should leave config unchanged");
}

#[test]
#[serial(kscroll_env)]
fn apply_env_overrides_no_change_when_env_vars_not_set() {
    let _a = EnvGuard::new("KSCROLL_MAX_OVERSCROLL");
    let _b = EnvGuard::new("KSCROLL_FRICTION");
    let _c = EnvGuard::new("KSCROLL_TICK_MS");

    let base = ResolvedConfig::default();
    assert_eq!(apply_env_overrides(base.clone()), base);
}

#[test]
#[serial(kscroll_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    let _guard = EnvGuard::new("KSCROLL_CONFIG");

    let temp_dir = env::temp_dir();
    let explicit_path = temp_dir.join("kscroll_explicit.toml");
    fs::write(&explicit_path, "max_overscroll = 11.0\n").expect("Failed to write explicit config");

    let env_path = temp_dir.join("kscroll_env.toml");
    fs::write(&env_path, "max_overscroll = 22.0\n").expect("Failed to write env config");
    env::set_var("KSCROLL_CONFIG", &env_path);

    let config = load_config_with_precedence(Some(explicit_path.clone()))
        .expect("explicit config should load")
        .expect("explicit config exists");
    assert_eq!(
        config.max_overscroll,
        Some(11.0),
        "Should use explicit path, not KSCROLL_CONFIG env var"
    );

    fs::remove_file(explicit_path).ok();
    fs::remove_file(env_path).ok();
}

#[test]
#[serial(kscroll_config)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    let _guard = EnvGuard::new("KSCROLL_CONFIG");

    let env_path = env::temp_dir().join("kscroll_env_only.toml");
    fs::write(&env_path, "max_speed = 42.0\n").expect("Failed to write env config");
    env::set_var("KSCROLL_CONFIG", &env_path);

    let config = load_config_with_precedence(None)
        .expect("env config should load")
        .expect("env config exists");
    assert_eq!(config.max_speed, Some(42.0));

    fs::remove_file(env_path).ok();
}

#[test]
#[serial(kscroll_config)]
fn load_config_with_precedence_rejects_empty_env_path() {
    let _guard = EnvGuard::new("KSCROLL_CONFIG");
    env::set_var("KSCROLL_CONFIG", "");

    assert_eq!(
        load_config_with_precedence(None),
        Err(ConfigError::InvalidPath(String::new()))
    );
}

#[test]
fn apply_cli_overrides_take_highest_precedence() {
    let with_env = ResolvedConfig {
        scroller: ScrollerConfig {
            max_overscroll: 64.0,
            ..ScrollerConfig::default()
        },
        ..ResolvedConfig::default()
    };

    let result = apply_cli_overrides(with_env, Some(30.0), None, Some(8));
    assert_eq!(result.scroller.max_overscroll, 30.0);
    assert_eq!(result.scroller.tick_interval_ms, 8);
    assert_eq!(
        result.scroller.friction_base,
        ScrollerConfig::default().friction_base,
        "Unset CLI flags should not override"
    );
}

#[test]
fn config_file_rejects_unknown_fields() {
    let toml_with_unknown = r#"
max_overscroll = 100.0
unknown_field = "should fail"
"#;

    let result: Result<ConfigFile, _> = toml::from_str(toml_with_unknown);
    assert!(
        result.is_err(),
        "Should reject TOML with unknown fields due to deny_unknown_fields"
    );
}

#[test]
fn invalid_config_converts_to_config_error() {
    let invalid = ScrollerConfig {
        max_speed: -1.0,
        ..ScrollerConfig::default()
    }
    .validate()
    .expect_err("negative max_speed must be rejected");

    let err: ConfigError = invalid.into();
    assert!(err.to_string().contains("max_speed"));
}
