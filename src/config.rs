use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub fallback: FallbackConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the scheduling API, including the `/api` prefix
  #[serde(default = "default_api_url")]
  pub url: String,
  /// Per-request timeout. Unset means requests wait for the transport.
  pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: default_api_url(),
      timeout_secs: None,
    }
  }
}

fn default_api_url() -> String {
  DEFAULT_API_URL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Minutes before cached data is considered stale
  #[serde(default = "default_ttl_minutes")]
  pub ttl_minutes: i64,
  /// Cache database location (defaults to the platform data directory)
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      ttl_minutes: default_ttl_minutes(),
      path: None,
    }
  }
}

fn default_ttl_minutes() -> i64 {
  crate::cache::GlobalFreshness::DEFAULT_TTL_MINUTES
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FallbackConfig {
  /// Snapshot file to use instead of the bundled one
  pub path: Option<PathBuf>,
  /// Serve schedule reads from the snapshot when both network and cache fail
  #[serde(default)]
  pub serve_schedule_reads: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
  /// Directory for daily-rolling log files; stderr only when unset
  pub dir: Option<PathBuf>,
  /// Default filter directive when RUST_LOG is not set (e.g., "facsched=debug")
  pub level: Option<String>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./facsched.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/facsched/config.yaml
  ///
  /// Falls back to defaults when no file exists. `FACSCHED_API_URL`
  /// overrides the configured API URL.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    if let Ok(url) = std::env::var("FACSCHED_API_URL") {
      config.api.url = url;
    }

    config.validate()?;
    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("facsched.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("facsched").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    if self.cache.ttl_minutes < 0 {
      return Err(eyre!(
        "cache.ttl_minutes must not be negative (got {})",
        self.cache.ttl_minutes
      ));
    }
    Ok(())
  }
}
