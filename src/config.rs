//! Configuration loading.
//!
//! Two files live in the application config directory:
//! - `config.toml`: catalog location, shop details and completion settings
//! - `secrets.toml`: the completion API key (`[openai] api_key`)
//!
//! Both are optional on disk; a missing API key is not.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

pub const CONFIG_FILE: &str = "config.toml";
pub const SECRETS_FILE: &str = "secrets.toml";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no API key: set OPENAI_API_KEY or add [openai] api_key to {}", .0.display())]
    MissingApiKey(PathBuf),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Folder holding carta.csv, distritos.csv, Bebidas.csv and Postres.csv.
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: PathBuf,

    #[serde(default)]
    pub shop: ShopConfig,

    #[serde(default)]
    pub completion: CompletionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_dir: default_catalog_dir(),
            shop: ShopConfig::default(),
            completion: CompletionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopConfig {
    /// Where pickup customers are sent.
    #[serde(default = "default_pickup_address")]
    pub pickup_address: String,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            pickup_address: default_pickup_address(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Secrets {
    #[serde(default)]
    openai: Option<OpenAiSecrets>,
}

#[derive(Debug, Deserialize)]
struct OpenAiSecrets {
    api_key: String,
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from("catalog")
}

fn default_pickup_address() -> String {
    "UPCH123".into()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-3.5-turbo".into()
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    1000
}

/// `<platform config dir>/sazon_bot`, falling back to the working directory.
pub fn app_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sazon_bot");
    path
}

/// Load `config.toml`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        info!(path = %path.display(), "no config file, using defaults");
        return Ok(AppConfig::default());
    }

    let raw = read(path)?;
    let config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Resolve the API key from the environment, then from `secrets.toml`.
pub fn resolve_api_key(secrets_path: &Path) -> Result<String, ConfigError> {
    resolve_api_key_from(std::env::var(API_KEY_ENV).ok(), secrets_path)
}

fn resolve_api_key_from(
    env_value: Option<String>,
    secrets_path: &Path,
) -> Result<String, ConfigError> {
    if let Some(key) = env_value.filter(|k| !k.trim().is_empty()) {
        info!("using API key from {API_KEY_ENV}");
        return Ok(key);
    }

    let secrets = if secrets_path.exists() {
        let raw = read(secrets_path)?;
        toml::from_str::<Secrets>(&raw).map_err(|source| ConfigError::Parse {
            path: secrets_path.to_path_buf(),
            source,
        })?
    } else {
        Secrets::default()
    };

    match secrets.openai {
        Some(openai) if !openai.api_key.trim().is_empty() => {
            info!(path = %secrets_path.display(), "using API key from secrets file");
            Ok(openai.api_key)
        }
        _ => Err(ConfigError::MissingApiKey(secrets_path.to_path_buf())),
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join(CONFIG_FILE)).unwrap();

        assert_eq!(config.catalog_dir, PathBuf::from("catalog"));
        assert_eq!(config.shop.pickup_address, "UPCH123");
        assert_eq!(config.completion.model, "gpt-3.5-turbo");
        assert_eq!(config.completion.max_tokens, 1000);
        assert!((config.completion.temperature - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "catalog_dir = \"/srv/carta\"\n\n[completion]\nmodel = \"gpt-4o-mini\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.catalog_dir, PathBuf::from("/srv/carta"));
        assert_eq!(config.completion.model, "gpt-4o-mini");
        assert_eq!(config.completion.api_base, "https://api.openai.com/v1");
        assert_eq!(config.shop.pickup_address, "UPCH123");
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "catalog_dir = [").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn env_key_wins_over_secrets_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SECRETS_FILE);
        fs::write(&path, "[openai]\napi_key = \"from-file\"\n").unwrap();

        let key = resolve_api_key_from(Some("from-env".into()), &path).unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn key_read_from_secrets_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SECRETS_FILE);
        fs::write(&path, "[openai]\napi_key = \"from-file\"\n").unwrap();

        let key = resolve_api_key_from(None, &path).unwrap();
        assert_eq!(key, "from-file");
    }

    #[test]
    fn blank_env_key_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SECRETS_FILE);

        let err = resolve_api_key_from(Some("  ".into()), &path).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey(_)));
    }
}
