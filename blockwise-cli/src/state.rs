use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::request::ScheduleRequest;

pub fn blockwise_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".blockwise"))
}

pub fn ensure_blockwise_home() -> Result<PathBuf> {
    let dir = blockwise_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Read a JSON scheduling request from disk.
pub fn read_request(path: &Path) -> Result<ScheduleRequest> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}
