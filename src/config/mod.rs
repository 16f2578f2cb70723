pub mod settings;

pub use settings::{Config, DebugLogRotation, Profile};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory, creating it if needed
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .context("Failed to get config directory")?
        .join("bunyang");

    fs::create_dir_all(&dir).context("Failed to create config directory")?;

    Ok(dir)
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load configuration from file, or create default if not exists
///
/// Environment overrides are applied after loading.
pub fn load_or_create_config() -> Result<Config> {
    let path = config_path()?;
    let mut config = load_or_create_at(&path)?;
    config.apply_env()?;
    Ok(config)
}

/// Same as [`load_or_create_config`] for an explicit path, without env overrides
pub fn load_or_create_at(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    } else {
        let config = Config::default();
        save_config_at(&config, path)?;

        println!("Created default config at: {}", path.display());
        println!("Edit it to point at your analysis backend.");

        Ok(config)
    }
}

/// Save configuration to the default location
pub fn save_config(config: &Config) -> Result<()> {
    save_config_at(config, &config_path()?)
}

pub fn save_config_at(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}
