// Configuration loading and parsing (config/client.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file inside `config/` (and `defaults/`).
pub const CONFIG_FILE: &str = "client.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// client.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP base of the valuation service, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// WebSocket base for progress pushes. Derived from `base_url` when absent.
    #[serde(default)]
    pub ws_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// Initial state of the "show detailed progress" toggle.
    #[serde(default = "default_progress")]
    pub progress_default: bool,
}

fn default_progress() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            progress_default: default_progress(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                base_url: "http://localhost:8000".to_string(),
                ws_url: None,
            },
            ui: UiConfig::default(),
        }
    }
}

impl ServerConfig {
    /// HTTP base URL without a trailing slash.
    pub fn http_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// WebSocket base URL without a trailing slash. Uses `ws_url` when set,
    /// otherwise swaps the scheme of `base_url` (`http` -> `ws`,
    /// `https` -> `wss`).
    pub fn ws_base(&self) -> String {
        if let Some(ws) = &self.ws_url {
            return ws.trim_end_matches('/').to_string();
        }
        let base = self.http_base();
        if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/client.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()` for normal startup.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    parse_config(&text, &path)
}

/// Parse and validate config text. `path` is only used for error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Seed `config/client.toml` from `defaults/` when it does not exist yet.
///
/// Returns the path written, or `None` when a config is already in place. An
/// existing config is never overwritten.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let source = base_dir.join("defaults").join(CONFIG_FILE);
    let target = base_dir.join("config").join(CONFIG_FILE);

    if target.exists() {
        return Ok(None);
    }
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no config/{CONFIG_FILE} or defaults/{CONFIG_FILE} in {}; run from the project root",
                base_dir.display()
            ),
        });
    }

    let copy_failed = |e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
    };
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(copy_failed)?;
    }
    std::fs::copy(&source, &target).map_err(copy_failed)?;
    Ok(Some(target))
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Seeds the config from `defaults/` before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    check_url("server.base_url", &config.server.base_url, &["http://", "https://"])?;
    if let Some(ws) = &config.server.ws_url {
        check_url("server.ws_url", ws, &["ws://", "wss://"])?;
    }
    Ok(())
}

/// `url` must use one of `schemes` and name a host after it.
fn check_url(field: &str, url: &str, schemes: &[&str]) -> Result<(), ConfigError> {
    let url = url.trim();
    let Some(rest) = schemes.iter().find_map(|scheme| url.strip_prefix(scheme)) else {
        return Err(ConfigError::ValidationError {
            field: field.into(),
            message: format!("must start with {}, got {url:?}", schemes.join(" or ")),
        });
    };
    if rest.trim_matches('/').is_empty() {
        return Err(ConfigError::ValidationError {
            field: field.into(),
            message: format!("is missing a host: {url:?}"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
