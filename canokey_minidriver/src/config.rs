/*
 * config.rs: Driver 'canokey_minidriver' - Settings read from the process environment
 *
 * Copyright (C) 2019-  Carsten Blüggel <bluecars@posteo.eu>
 *
 * This library is free software; you can redistribute it and/or
 * modify it under the terms of the GNU Lesser General Public
 * License as published by the Free Software Foundation; either
 * version 2.1 of the License, or (at your option) any later version.
 *
 * This library is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * Lesser General Public License for more details.
 *
 * You should have received a copy of the GNU Lesser General Public
 * License along with this library; if not, write to the Free Software
 * Foundation, 51 Franklin Street, Fifth Floor  Boston, MA 02110-1335  USA
 */

//! The driver is loaded by the host into its own process, there is no config file to read:
//! `CANOKEY_MINIDRIVER_LOG_LEVEL` and `CANOKEY_MINIDRIVER_LOG_DIR` are all there is.

use std::path::{Path, PathBuf};

use log::LevelFilter;
use thiserror::Error;

pub const ENV_LOG_LEVEL : &str = "CANOKEY_MINIDRIVER_LOG_LEVEL";
pub const ENV_LOG_DIR   : &str = "CANOKEY_MINIDRIVER_LOG_DIR";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported log level '{0}'; expected trace|debug|info|warn|error|off")]
    Level(String),

    #[error("log directory must not be empty")]
    EmptyDir,

    #[error("log directory must be an absolute path, got '{0}'")]
    RelativeDir(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// `Off` unless asked for
    pub log_level : LevelFilter,
    pub log_dir   : PathBuf,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { log_level: LevelFilter::Off, log_dir: default_log_dir() }
    }
}

impl DriverConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `lookup` stands in for the environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let log_level = match lookup(ENV_LOG_LEVEL) {
            Some(level) => parse_level(&level)?,
            None => LevelFilter::Off,
        };
        let log_dir = match lookup(ENV_LOG_DIR) {
            Some(dir) => parse_dir(&dir)?,
            None => default_log_dir(),
        };
        Ok(Self { log_level, log_dir })
    }

    #[must_use]
    pub fn logging_enabled(&self) -> bool {
        self.log_level != LevelFilter::Off
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, ConfigError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(LevelFilter::Trace),
        "debug" => Ok(LevelFilter::Debug),
        "info"  => Ok(LevelFilter::Info),
        "warn" | "warning" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off"   => Ok(LevelFilter::Off),
        _ => Err(ConfigError::Level(level.to_string())),
    }
}

fn parse_dir(dir: &str) -> Result<PathBuf, ConfigError> {
    let trimmed = dir.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyDir);
    }
    let path = Path::new(trimmed);
    if path.is_absolute() { Ok(path.to_path_buf()) } else { Err(ConfigError::RelativeDir(trimmed.to_string())) }
}

#[must_use]
pub fn default_log_dir() -> PathBuf {
    cfg_if::cfg_if! {
        if #[cfg(windows)] {
            PathBuf::from(r"C:\Logs")
        }
        else {
            std::env::temp_dir()
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_unset_means_off() {
        let config = DriverConfig::from_lookup(env(&[])).unwrap();
        assert_eq!(DriverConfig::default(), config);
        assert!(!config.logging_enabled());
    }

    #[test]
    fn test_level() {
        assert_eq!(LevelFilter::Debug, DriverConfig::from_lookup(env(&[(ENV_LOG_LEVEL, " Debug ")])).unwrap().log_level);
        assert_eq!(LevelFilter::Warn, DriverConfig::from_lookup(env(&[(ENV_LOG_LEVEL, "warning")])).unwrap().log_level);
        assert!(!DriverConfig::from_lookup(env(&[(ENV_LOG_LEVEL, "off")])).unwrap().logging_enabled());
        assert_eq!(Err(ConfigError::Level("verbose".into())), DriverConfig::from_lookup(env(&[(ENV_LOG_LEVEL, "verbose")])));
    }

    #[test]
    fn test_dir() {
        let tmp = std::env::temp_dir().join("canokey");
        let tmp_str = tmp.to_string_lossy().into_owned();
        let config = DriverConfig::from_lookup(env(&[(ENV_LOG_LEVEL, "info"), (ENV_LOG_DIR, tmp_str.as_str())])).unwrap();
        assert_eq!(tmp, config.log_dir);
        assert!(config.logging_enabled());
        assert_eq!(Err(ConfigError::RelativeDir("logs".into())), DriverConfig::from_lookup(env(&[(ENV_LOG_DIR, "logs")])));
        assert_eq!(Err(ConfigError::EmptyDir), DriverConfig::from_lookup(env(&[(ENV_LOG_DIR, "  ")])));
    }

    #[test]
    fn test_default_dir_is_absolute() {
        assert!(default_log_dir().is_absolute());
    }
}
