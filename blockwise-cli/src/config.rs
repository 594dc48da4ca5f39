use anyhow::{Context, Result};
use blockwise_core::DayBounds;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::{blockwise_home, ensure_blockwise_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSection {
    /// Where each day starts; also the default earliest time for flexible tasks.
    #[serde(with = "blockwise_core::time::hhmm")]
    pub anchor_time: NaiveTime,
    /// Default latest end for flexible tasks.
    #[serde(with = "blockwise_core::time::hhmm")]
    pub day_end: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    pub addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSection {
    /// tracing filter directive, used when RUST_LOG is unset.
    pub filter: String,
}

impl Default for ScheduleSection {
    fn default() -> Self {
        let bounds = DayBounds::default();
        Self {
            anchor_time: bounds.anchor,
            day_end: bounds.day_end,
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn day_bounds(&self) -> DayBounds {
        DayBounds {
            anchor: self.schedule.anchor_time,
            day_end: self.schedule.day_end,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(blockwise_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = ensure_blockwise_home()?.join("config.toml");
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
