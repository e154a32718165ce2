// SPDX-License-Identifier: GPL-3.0-only

use cosmic::cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use flash_types::RollingLog;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq)]
pub enum LoggingLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LoggingLevel {
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Error,
            1 => Self::Warn,
            2 => Self::Info,
            3 => Self::Debug,
            4 => Self::Trace,
            _ => Self::Info,
        }
    }

    pub fn to_index(self) -> usize {
        match self {
            Self::Error => 0,
            Self::Warn => 1,
            Self::Info => 2,
            Self::Debug => 3,
            Self::Trace => 4,
        }
    }

    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, CosmicConfigEntry, Eq, PartialEq)]
#[version = 1]
pub struct Config {
    pub log_level: LoggingLevel,
    pub log_to_disk: bool,
    /// Empty means auto-discover.
    pub script_path: String,
    /// Empty means auto-discover.
    pub catalog_path: String,
    pub log_capacity: usize,
    pub elevate: bool,
    pub stop_udisks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LoggingLevel::Info,
            log_to_disk: true,
            script_path: String::new(),
            catalog_path: String::new(),
            log_capacity: RollingLog::SELECTOR_CAPACITY,
            elevate: true,
            stop_udisks: true,
        }
    }
}

fn optional_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty()).then(|| Path::new(value).to_path_buf())
}

impl Config {
    pub fn load(app_id: &str) -> Self {
        cosmic_config::Config::new(app_id, Config::VERSION)
            .map(|context| match Self::get_entry(&context) {
                Ok(config) => config,
                Err((_errors, config)) => config,
            })
            .unwrap_or_default()
    }

    pub fn script_override(&self) -> Option<PathBuf> {
        optional_path(&self.script_path)
    }

    pub fn catalog_override(&self) -> Option<PathBuf> {
        optional_path(&self.catalog_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_paths_mean_auto_discover() {
        let mut config = Config::default();
        assert_eq!(config.script_override(), None);
        config.catalog_path = "  /srv/flash/template.csv ".to_string();
        assert_eq!(
            config.catalog_override(),
            Some(PathBuf::from("/srv/flash/template.csv"))
        );
    }

    #[test]
    fn logging_level_index_round_trips() {
        for index in 0..5 {
            assert_eq!(LoggingLevel::from_index(index).to_index(), index);
        }
        assert_eq!(LoggingLevel::from_index(99), LoggingLevel::Info);
    }
}
