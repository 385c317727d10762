use std::path::{Path, PathBuf};

use engine::{ConfigError, GameConfig, CONFIG_PATH_ENV_VAR};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Defaults, then the config file (`--config` wins over `REFLEX_CONFIG`),
/// then env overrides. The result is validated.
pub(crate) fn load_config(
    cli_path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<GameConfig, ConfigError> {
    let path = cli_path
        .map(Path::to_path_buf)
        .or_else(|| lookup(CONFIG_PATH_ENV_VAR).map(PathBuf::from));

    let mut config = match path.as_deref() {
        Some(path) => {
            info!(path = %path.display(), "config_file");
            GameConfig::load_from_path(path)?
        }
        None => GameConfig::default(),
    };
    config.apply_env_overrides(lookup);
    config.validate()?;
    Ok(config)
}
