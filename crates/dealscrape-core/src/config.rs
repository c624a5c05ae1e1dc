use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Default per-fetch timeout, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files, for tests
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a pure
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("DEALSCRAPE_ENV", "development"));
    let log_level = or_default("DEALSCRAPE_LOG_LEVEL", "info");
    let targets_path = PathBuf::from(or_default(
        "DEALSCRAPE_TARGETS_PATH",
        "./config/targets.yaml",
    ));
    let fetch_timeout_secs = parse_u64(
        "DEALSCRAPE_FETCH_TIMEOUT_SECS",
        &DEFAULT_FETCH_TIMEOUT_SECS.to_string(),
    )?;
    if fetch_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "DEALSCRAPE_FETCH_TIMEOUT_SECS".to_string(),
            reason: "timeout must be at least one second".to_string(),
        });
    }
    let proxy = lookup("DEALSCRAPE_PROXY")
        .ok()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    Ok(AppConfig {
        env,
        log_level,
        targets_path,
        fetch_timeout_secs,
        proxy,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn parse_environment_test() {
        assert_eq!(parse_environment("test"), Environment::Test);
    }

    #[test]
    fn parse_environment_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn build_app_config_uses_defaults_for_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.targets_path.to_str(), Some("./config/targets.yaml"));
        assert_eq!(cfg.fetch_timeout_secs, 10);
        assert!(cfg.proxy.is_none());
    }

    #[test]
    fn build_app_config_reads_overrides() {
        let mut map = HashMap::new();
        map.insert("DEALSCRAPE_ENV", "production");
        map.insert("DEALSCRAPE_LOG_LEVEL", "debug");
        map.insert("DEALSCRAPE_TARGETS_PATH", "/etc/dealscrape/targets.yaml");
        map.insert("DEALSCRAPE_FETCH_TIMEOUT_SECS", "25");
        map.insert("DEALSCRAPE_PROXY", "10.0.0.1:3128");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.env, Environment::Production);
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(
            cfg.targets_path.to_str(),
            Some("/etc/dealscrape/targets.yaml")
        );
        assert_eq!(cfg.fetch_timeout_secs, 25);
        assert_eq!(cfg.proxy.as_deref(), Some("10.0.0.1:3128"));
    }

    #[test]
    fn build_app_config_rejects_non_numeric_timeout() {
        let mut map = HashMap::new();
        map.insert("DEALSCRAPE_FETCH_TIMEOUT_SECS", "ten");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DEALSCRAPE_FETCH_TIMEOUT_SECS"),
            "expected InvalidEnvVar(DEALSCRAPE_FETCH_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_zero_timeout() {
        let mut map = HashMap::new();
        map.insert("DEALSCRAPE_FETCH_TIMEOUT_SECS", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn build_app_config_ignores_blank_proxy() {
        let mut map = HashMap::new();
        map.insert("DEALSCRAPE_PROXY", "   ");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.proxy.is_none());
    }

    #[test]
    fn debug_output_redacts_proxy() {
        let mut map = HashMap::new();
        map.insert("DEALSCRAPE_PROXY", "user:secret@10.0.0.1:3128");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("secret"), "proxy leaked: {rendered}");
        assert!(rendered.contains("[redacted]"));
    }
}
