use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `api.base_url`
pub const BASE_URL_ENV: &str = "ROSTER_API_URL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  /// Custom title for header (defaults to the API host if not set)
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Collection endpoint, e.g. http://localhost:5000/api/employees
  #[serde(default)]
  pub base_url: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
  10
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: String::new(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

impl ApiConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

impl Config {
  /// Load configuration and apply base URL overrides.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./roster.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/roster/config.yaml
  ///
  /// A config file is optional when the base URL comes from
  /// `ROSTER_API_URL` or the command line (which wins).
  pub fn load(explicit_path: Option<&Path>, base_url: Option<String>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    config.with_base_url(std::env::var(BASE_URL_ENV).ok(), base_url)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("roster.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("roster").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    Ok(serde_yaml::from_str(contents)?)
  }

  /// Apply overrides (environment, then command line) and validate the URL
  fn with_base_url(mut self, from_env: Option<String>, from_cli: Option<String>) -> Result<Self> {
    if let Some(url) = from_cli.or(from_env).filter(|u| !u.trim().is_empty()) {
      self.api.base_url = url;
    }

    if self.api.base_url.trim().is_empty() {
      return Err(eyre!(
        "No API base URL configured. Set api.base_url in ~/.config/roster/config.yaml,\n\
         export {}, or pass --base-url.",
        BASE_URL_ENV
      ));
    }

    self.api.base_url = normalize_base_url(&self.api.base_url)?;
    Ok(self)
  }

  /// Header title: configured title or the API host
  pub fn display_title(&self) -> String {
    if let Some(title) = &self.title {
      return title.clone();
    }
    url::Url::parse(&self.api.base_url)
      .ok()
      .and_then(|u| u.host_str().map(String::from))
      .unwrap_or_else(|| self.api.base_url.clone())
  }
}

/// Require an absolute http(s) URL and drop trailing slashes
fn normalize_base_url(raw: &str) -> Result<String> {
  let trimmed = raw.trim();
  let parsed =
    url::Url::parse(trimmed).map_err(|e| eyre!("Invalid API base URL '{}': {}", trimmed, e))?;

  match parsed.scheme() {
    "http" | "https" => {}
    other => {
      return Err(eyre!(
        "Invalid API base URL '{}': unsupported scheme '{}'",
        trimmed,
        other
      ))
    }
  }

  Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_full_config() {
    let config = Config::parse(
      "api:\n  base_url: http://localhost:5000/api/employees\n  timeout_secs: 3\ntitle: Staff\n",
    )
    .unwrap();

    assert_eq!(config.api.base_url, "http://localhost:5000/api/employees");
    assert_eq!(config.api.timeout(), Duration::from_secs(3));
    assert_eq!(config.display_title(), "Staff");
  }

  #[test]
  fn test_timeout_defaults() {
    let config = Config::parse("api:\n  base_url: http://h/e\n").unwrap();
    assert_eq!(config.api.timeout_secs, 10);
  }

  #[test]
  fn test_cli_beats_env_beats_file() {
    let file = Config::parse("api:\n  base_url: http://file/e\n").unwrap();

    let config = file
      .clone()
      .with_base_url(Some("http://env/e".into()), Some("http://cli/e/".into()))
      .unwrap();
    assert_eq!(config.api.base_url, "http://cli/e");

    let config = file
      .clone()
      .with_base_url(Some("http://env/e".into()), None)
      .unwrap();
    assert_eq!(config.api.base_url, "http://env/e");

    let config = file.with_base_url(None, None).unwrap();
    assert_eq!(config.api.base_url, "http://file/e");
  }

  #[test]
  fn test_missing_base_url_is_error() {
    assert!(Config::default().with_base_url(None, None).is_err());
    assert!(Config::default()
      .with_base_url(Some("  ".into()), None)
      .is_err());
  }

  #[test]
  fn test_rejects_bad_urls() {
    assert!(normalize_base_url("localhost:5000/api").is_err());
    assert!(normalize_base_url("ftp://host/employees").is_err());
    assert!(normalize_base_url("not a url").is_err());
  }

  #[test]
  fn test_title_falls_back_to_host() {
    let config = Config::default()
      .with_base_url(None, Some("https://hr.example.com/api/employees".into()))
      .unwrap();
    assert_eq!(config.display_title(), "hr.example.com");
  }
}
