use crate::core::schema::DEFAULT_ZONE;
use crate::utils::{ensure_config_dir, get_config_dir, write_atomic};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Serialization format for imported configs
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[strum(serialize = "yaml")]
    Yaml,
    #[strum(serialize = "json")]
    Json,
}

/// CLI defaults, overridable per invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Zone assumed for imported modifying lines that carry no `--zone`
    #[serde(default = "default_zone")]
    pub default_zone: String,
    /// Comment banners above each zone and the direct section
    #[serde(default = "default_true")]
    pub banners: bool,
    /// Emit runtime copies of each line instead of a reload
    #[serde(default)]
    pub transient: bool,
    #[serde(default)]
    pub output_format: OutputFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_zone: default_zone(),
            banners: true,
            transient: false,
            output_format: OutputFormat::default(),
        }
    }
}

fn default_zone() -> String {
    DEFAULT_ZONE.to_string()
}

fn default_true() -> bool {
    true
}

/// Location of `config.json`, if a config directory can be determined
pub fn config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.json"))
}

/// Loads the app config from disk, or returns default if not found.
///
/// A file that exists but does not parse is reported and ignored.
pub fn load_config() -> AppConfig {
    if let Some(path) = config_path()
        && let Ok(json) = std::fs::read_to_string(&path)
    {
        match serde_json::from_str::<AppConfig>(&json) {
            Ok(config) => return config,
            Err(e) => warn!("Ignoring unreadable {}: {e}", path.display()),
        }
    }
    AppConfig::default()
}

/// Saves the app config using an atomic write.
///
/// Returns the path written, or `None` if no config directory exists.
pub fn save_config(config: &AppConfig) -> crate::core::Result<Option<PathBuf>> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    ensure_config_dir()?;
    let json = serde_json::to_string_pretty(config)?;
    write_atomic(&path, &json)?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"transient": true}"#).unwrap();
        assert!(config.transient);
        assert!(config.banners);
        assert_eq!(config.default_zone, "public");
        assert_eq!(config.output_format, OutputFormat::Yaml);
    }

    #[test]
    fn test_output_format_lowercase() {
        let config = AppConfig {
            output_format: OutputFormat::Json,
            ..AppConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""output_format":"json""#));
    }
}
