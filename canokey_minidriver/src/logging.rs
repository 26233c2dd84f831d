/*
 * logging.rs: Driver 'canokey_minidriver' - The log file backend behind the log3if* macros
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

//! One log file per host process, e.g. `canokey_minidriver_<pid>_<timestamp>.log`.
//! Started at most once; a driver that can't log still works.

use flexi_logger::{FileSpec, FlexiLoggerError, Logger, LoggerHandle};
use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::config::{ConfigError, DriverConfig};

const LOG_FILE_BASENAME : &str = "canokey_minidriver";

static LOGGER: OnceCell<Option<LoggerHandle>> = OnceCell::new();

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("logging is off")]
    Disabled,

    #[error("can't create the log directory: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Backend(#[from] FlexiLoggerError),
}

/// Starts the file logger on the first call, does nothing on later ones. Never fails, never panics.
pub fn init_once() {
    LOGGER.get_or_init(|| start(&DriverConfig::from_env().unwrap_or_default()).ok());
}

/// Whether a log file is being written to
#[must_use]
pub fn is_active() -> bool {
    LOGGER.get().map_or(false, Option::is_some)
}

pub fn start(config: &DriverConfig) -> Result<LoggerHandle, LoggingError> {
    if !config.logging_enabled() {
        return Err(LoggingError::Disabled);
    }
    std::fs::create_dir_all(&config.log_dir)?;
    let handle = Logger::try_with_str(config.log_level.as_str().to_ascii_lowercase())?
        .log_to_file(
            FileSpec::default()
                .directory(config.log_dir.as_path())
                .basename(LOG_FILE_BASENAME)
                .discriminant(std::process::id().to_string()),
        )
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;
    log::info!(target: LOG_FILE_BASENAME, "{} {} loaded into process {}", LOG_FILE_BASENAME,
        env!("CARGO_PKG_VERSION"), std::process::id());
    Ok(handle)
}


#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn test_disabled() {
        assert!(matches!(start(&DriverConfig::default()), Err(LoggingError::Disabled)));
    }

    #[test]
    fn test_unusable_directory() {
        /* a regular file where the directory should be */
        let file = std::env::temp_dir().join(format!("canokey_minidriver_not_a_dir_{}", std::process::id()));
        std::fs::write(&file, b"").unwrap();
        let config = DriverConfig { log_level: LevelFilter::Debug, log_dir: file.join("logs") };
        assert!(matches!(start(&config), Err(LoggingError::Io(_))));
        std::fs::remove_file(&file).unwrap();
    }

    #[test]
    fn test_init_once_is_repeatable() {
        init_once();
        let active = is_active();
        init_once();
        assert_eq!(active, is_active());
    }
}
