use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

pub const CONFIG_PATH_ENV_VAR: &str = "REFLEX_CONFIG";
pub const TPS_ENV_VAR: &str = "REFLEX_TPS";
pub const FPS_ENV_VAR: &str = "REFLEX_FPS";
pub const SEED_ENV_VAR: &str = "REFLEX_SEED";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config json at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub target_fps: u32,
    pub metrics_log_interval_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Reflex".to_string(),
            window_width: 960,
            window_height: 960,
            target_tps: 120,
            target_fps: 60,
            metrics_log_interval_ms: 1_000,
        }
    }
}

impl LoopConfig {
    /// Whole milliseconds between simulation ticks (120 Hz gives 8 ms).
    pub fn tick_interval_ms(&self) -> u64 {
        interval_ms_for_rate(self.target_tps)
    }

    pub fn frame_interval_ms(&self) -> u64 {
        interval_ms_for_rate(self.target_fps)
    }

    pub fn metrics_log_interval(&self) -> Duration {
        if self.metrics_log_interval_ms == 0 {
            Duration::from_secs(1)
        } else {
            Duration::from_millis(self.metrics_log_interval_ms)
        }
    }
}

fn interval_ms_for_rate(rate_hz: u32) -> u64 {
    (1_000 / u64::from(rate_hz.max(1))).max(1)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub spawn_cooldown_ms: u64,
    /// Delay between spawn and expiry.
    pub start_delay_ms: u64,
    pub base_lifetime_ms: u64,
    /// Upper bound of the uniform jitter added to `Jittered` entities.
    pub jitter_ms: u64,
    /// Extra lifetime for `Offset` entities.
    pub fixed_offset_ms: u64,
    /// Arena-space distance an entity starts its visible approach from.
    pub spawn_distance: f32,
    pub seed: Option<u64>,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            spawn_cooldown_ms: 400,
            start_delay_ms: 3_000,
            base_lifetime_ms: 1_500,
            jitter_ms: 500,
            fixed_offset_ms: 250,
            spawn_distance: 1.0,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    #[serde(rename = "loop")]
    pub loop_config: LoopConfig,
    pub tuning: SpawnTuning,
}

impl GameConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize::<_, GameConfig>(&mut deserializer).map_err(|error| {
            let path = error.path().to_string();
            ConfigError::Parse {
                path,
                source: error.into_inner(),
            }
        })
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Applies `REFLEX_TPS`, `REFLEX_FPS` and `REFLEX_SEED`. Unparseable values
    /// are warned about and leave the current setting in place.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(tps) = parse_env_value::<u32>(TPS_ENV_VAR, lookup(TPS_ENV_VAR)) {
            self.loop_config.target_tps = tps;
        }
        if let Some(fps) = parse_env_value::<u32>(FPS_ENV_VAR, lookup(FPS_ENV_VAR)) {
            self.loop_config.target_fps = fps;
        }
        if let Some(seed) = parse_env_value::<u64>(SEED_ENV_VAR, lookup(SEED_ENV_VAR)) {
            self.tuning.seed = Some(seed);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loop_config.target_tps == 0 {
            return Err(invalid("loop.target_tps", "must be greater than zero"));
        }
        if self.loop_config.target_tps > 1_000 {
            return Err(invalid("loop.target_tps", "must be at most 1000"));
        }
        if self.loop_config.target_fps == 0 {
            return Err(invalid("loop.target_fps", "must be greater than zero"));
        }
        if self.loop_config.target_fps > 1_000 {
            return Err(invalid("loop.target_fps", "must be at most 1000"));
        }
        if self.tuning.spawn_cooldown_ms == 0 {
            return Err(invalid("tuning.spawn_cooldown_ms", "must be greater than zero"));
        }
        if self.tuning.base_lifetime_ms == 0 {
            return Err(invalid("tuning.base_lifetime_ms", "must be greater than zero"));
        }
        if !self.tuning.spawn_distance.is_finite() || self.tuning.spawn_distance <= 0.0 {
            return Err(invalid(
                "tuning.spawn_distance",
                "must be a positive finite number",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn parse_env_value<T: std::str::FromStr>(var: &'static str, value: Option<String>) -> Option<T> {
    let value = value?;
    match value.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(
                env_var = var,
                value = value.as_str(),
                "invalid env override value; keeping configured value"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env_lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_arcade_timings() {
        let config = GameConfig::default();
        assert_eq!(config.loop_config.target_tps, 120);
        assert_eq!(config.loop_config.tick_interval_ms(), 8);
        assert_eq!(config.loop_config.frame_interval_ms(), 16);
        assert_eq!(config.tuning.spawn_cooldown_ms, 400);
        assert_eq!(config.tuning.start_delay_ms, 3_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let config =
            GameConfig::from_json_str(r#"{ "tuning": { "seed": 42, "jitter_ms": 100 } }"#)
                .expect("config");
        assert_eq!(config.tuning.seed, Some(42));
        assert_eq!(config.tuning.jitter_ms, 100);
        assert_eq!(config.tuning.base_lifetime_ms, 1_500);
        assert_eq!(config.loop_config.target_fps, 60);
    }

    #[test]
    fn parse_error_reports_field_path() {
        let err = GameConfig::from_json_str(r#"{ "loop": { "target_tps": "fast" } }"#)
            .expect_err("string tps should fail");
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, "loop.target_tps"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validate_rejects_zero_rates_and_lifetimes() {
        let mut config = GameConfig::default();
        config.loop_config.target_tps = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "loop.target_tps",
                ..
            })
        ));

        let mut config = GameConfig::default();
        config.tuning.base_lifetime_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "tuning.base_lifetime_ms",
                ..
            })
        ));

        let mut config = GameConfig::default();
        config.tuning.spawn_distance = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_apply_and_ignore_garbage() {
        let mut config = GameConfig::default();
        config.apply_env_overrides(env_lookup(&[
            (TPS_ENV_VAR, "240"),
            (FPS_ENV_VAR, "sixty"),
            (SEED_ENV_VAR, " 9 "),
        ]));

        assert_eq!(config.loop_config.target_tps, 240);
        assert_eq!(config.loop_config.target_fps, 60);
        assert_eq!(config.tuning.seed, Some(9));
    }

    #[test]
    fn load_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "loop": {{ "target_fps": 30 }} }}"#).expect("write config");

        let config = GameConfig::load_from_path(file.path()).expect("config");
        assert_eq!(config.loop_config.target_fps, 30);
        assert_eq!(config.loop_config.frame_interval_ms(), 33);
    }

    #[test]
    fn load_from_missing_path_is_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = GameConfig::load_from_path(&dir.path().join("missing.json"))
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
