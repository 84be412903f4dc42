//! Engine settings for the host: YAML file, then environment overrides.

use std::path::Path;

use anyhow::{Context, Result};
use crash_execution::EngineConfig;
use tracing::info;

pub const ENV_TICK_MS: &str = "CRASH_TICK_MS";
pub const ENV_COUNTDOWN_MS: &str = "CRASH_COUNTDOWN_MS";
pub const ENV_COUNTDOWN_TICKS: &str = "CRASH_COUNTDOWN_TICKS";
pub const ENV_RESET_MS: &str = "CRASH_RESET_MS";

/// Load the engine config from `path` (defaults when `None`), apply
/// environment overrides and validate.
pub fn load(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            let config = parse(&raw).with_context(|| format!("invalid config {}", path.display()))?;
            info!(path = %path.display(), "loaded engine config");
            config
        }
        None => EngineConfig::default(),
    };
    let config = apply_overrides(config, |key| std::env::var(key).ok());
    config.validate().context("engine config rejected")?;
    Ok(config)
}

pub fn parse(raw: &str) -> Result<EngineConfig> {
    serde_yaml::from_str(raw).context("failed to parse YAML")
}

/// Override timing fields from `lookup`; unparsable values are ignored.
pub fn apply_overrides<F>(mut config: EngineConfig, lookup: F) -> EngineConfig
where
    F: Fn(&str) -> Option<String>,
{
    let read_u64 = |key: &str| lookup(key).and_then(|raw| raw.trim().parse::<u64>().ok());
    if let Some(value) = read_u64(ENV_TICK_MS) {
        config.tick_ms = value;
    }
    if let Some(value) = read_u64(ENV_COUNTDOWN_MS) {
        config.countdown_interval_ms = value;
    }
    if let Some(value) = lookup(ENV_COUNTDOWN_TICKS).and_then(|raw| raw.trim().parse::<u32>().ok()) {
        config.countdown_ticks = value;
    }
    if let Some(value) = read_u64(ENV_RESET_MS) {
        config.crash_reset_delay_ms = value;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_overrides_apply() {
        let config = apply_overrides(
            EngineConfig::default(),
            env(&[
                (ENV_TICK_MS, "16"),
                (ENV_COUNTDOWN_MS, " 1000 "),
                (ENV_COUNTDOWN_TICKS, "5"),
                (ENV_RESET_MS, "2500"),
            ]),
        );
        assert_eq!(config.tick_ms, 16);
        assert_eq!(config.countdown_interval_ms, 1_000);
        assert_eq!(config.countdown_ticks, 5);
        assert_eq!(config.crash_reset_delay_ms, 2_500);
    }

    #[test]
    fn test_bad_override_ignored() {
        let config = apply_overrides(EngineConfig::default(), env(&[(ENV_TICK_MS, "fast")]));
        assert_eq!(config.tick_ms, EngineConfig::default().tick_ms);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "countdown_ticks: 5\nhistory_len: 20").unwrap();
        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.countdown_ticks, 5);
        assert_eq!(config.history_len, 20);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tick_ms: 0").unwrap();
        let err = load(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("tick_ms"), "unexpected error: {err:#}");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Some(Path::new("/nonexistent/crash.yaml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
