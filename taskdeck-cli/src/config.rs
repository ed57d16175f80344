use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::state::ensure_taskdeck_home;

pub const API_URL_ENV: &str = "TASKDECK_API_URL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub ui: UiSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// Origin serving `/api/tasks`.
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// How long the TUI waits for a key before redrawing.
    pub tick_millis: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for UiSection {
    fn default() -> Self {
        Self { tick_millis: 50 }
    }
}

impl ApiSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Config {
    /// Flag beats env beats file.
    pub fn with_overrides(mut self, flag: Option<String>, env: Option<String>) -> Self {
        if let Some(url) = flag.or(env).filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        self
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_taskdeck_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let cfg = parse_config("[api]\nbase_url = \"http://tasks.internal:8080\"\n").unwrap();
        assert_eq!(cfg.api.base_url, "http://tasks.internal:8080");
        assert_eq!(cfg.api.timeout_secs, 10);
        assert_eq!(cfg.ui, UiSection::default());
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn flag_beats_env_beats_file() {
        let both = Config::default().with_overrides(Some("http://flag".into()), Some("http://env".into()));
        assert_eq!(both.api.base_url, "http://flag");

        let env_only = Config::default().with_overrides(None, Some("http://env".into()));
        assert_eq!(env_only.api.base_url, "http://env");

        let blank_env = Config::default().with_overrides(None, Some("  ".into()));
        assert_eq!(blank_env.api.base_url, "http://localhost:5000");
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let api = ApiSection {
            timeout_secs: 0,
            ..ApiSection::default()
        };
        assert_eq!(api.timeout(), Duration::from_secs(1));
    }
}
