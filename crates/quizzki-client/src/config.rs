//! Client configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::http::{HttpApi, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Environment variable that overrides `base_url`.
pub const URL_ENV: &str = "QUIZZKI_URL";

/// Top-level quizzki configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizzkiConfig {
    /// Root URL of the Quizzki API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Reported as `ipSource` when a student starts a presentation.
    #[serde(default = "default_source_address")]
    pub source_address: String,
    /// Where sessions are stored. Defaults to `~/.config/quizzki/session.toml`.
    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_source_address() -> String {
    "127.0.0.1".to_string()
}

impl Default for QuizzkiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            source_address: default_source_address(),
            session_file: None,
        }
    }
}

impl QuizzkiConfig {
    /// Build an HTTP client for the configured server.
    pub fn client(&self) -> Result<HttpApi> {
        HttpApi::new(&self.base_url, self.timeout_secs)
            .with_context(|| format!("failed to create client for {}", self.base_url))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizzki.toml` in the current directory
/// 2. `~/.config/quizzki/config.toml`
///
/// `QUIZZKI_URL` overrides `base_url`.
pub fn load_config() -> Result<QuizzkiConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizzkiConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizzki.toml");
            if local.exists() {
                Some(local)
            } else {
                config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<QuizzkiConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "config loaded");
            config
        }
        None => QuizzkiConfig::default(),
    };

    if let Ok(url) = std::env::var(URL_ENV) {
        if !url.trim().is_empty() {
            config.base_url = url;
        }
    }

    config.base_url = resolve_env_vars(&config.base_url);
    config.source_address = resolve_env_vars(&config.source_address);
    config.session_file = config
        .session_file
        .map(|p| PathBuf::from(resolve_env_vars(&p.to_string_lossy())));

    Ok(config)
}

/// `~/.config/quizzki`, when `HOME` is set.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizzki"))
}

/// Starter file written by `quizzki init`.
pub const SAMPLE_CONFIG: &str = r#"# quizzki configuration

# Root URL of the Quizzki API. QUIZZKI_URL overrides it.
base_url = "http://localhost:8081"

# Seconds before a request is abandoned.
timeout_secs = 30

# Sent as ipSource when a student starts an evaluation.
source_address = "127.0.0.1"

# Where login sessions are kept.
# session_file = "${HOME}/.config/quizzki/session.toml"
"#;
