//! Session configuration, stored as JSON
use std::fs;
use std::path::Path;

use emu_core::logging::{log, LogCategory, LogConfig, LogLevel};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::system::Snk68Error;

pub const CONFIG_VERSION: u32 = 1;

fn default_version() -> u32 {
    CONFIG_VERSION
}

/// All switches off (the ports are active low)
fn default_dip() -> u8 {
    0xff
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Board to emulate, e.g. "pow" or "searchar"
    pub board: Board,
    #[serde(default = "default_dip")]
    pub dip_switch_1: u8,
    #[serde(default = "default_dip")]
    pub dip_switch_2: u8,
    /// Log level ("off", "error", ... "trace"); process-wide once applied
    /// with [`SessionConfig::apply_log_level`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl SessionConfig {
    pub fn new(board: Board) -> Self {
        Self {
            version: CONFIG_VERSION,
            board,
            dip_switch_1: default_dip(),
            dip_switch_2: default_dip(),
            log_level: None,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, Snk68Error> {
        serde_json::from_str(text).map_err(|e| {
            log(LogCategory::Config, LogLevel::Error, || {
                format!("Config: invalid session config: {}", e)
            });
            Snk68Error::Config(e)
        })
    }

    pub fn to_json(&self) -> Result<String, Snk68Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Snk68Error> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Snk68Error> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Set the process-wide log level from this config, for every session
    /// in the process. Returns the level applied, if any.
    pub fn apply_log_level(&self) -> Result<Option<LogLevel>, Snk68Error> {
        let level = self.log_level()?;
        if let Some(level) = level {
            LogConfig::global().set_global_level(level);
        }
        Ok(level)
    }

    /// Parsed log level, `None` when the config leaves logging alone
    pub fn log_level(&self) -> Result<Option<LogLevel>, Snk68Error> {
        match &self.log_level {
            None => Ok(None),
            Some(name) => LogLevel::parse(name)
                .map(Some)
                .ok_or_else(|| Snk68Error::LogLevel(name.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = SessionConfig::from_json(r#"{ "board": "ikari3" }"#).unwrap();
        assert_eq!(config, SessionConfig::new(Board::Ikari3));
        assert_eq!(config.log_level().unwrap(), None);
    }

    #[test]
    fn test_full_config() {
        let config = SessionConfig::from_json(
            r#"{
                "version": 1,
                "board": "searchar",
                "dip_switch_1": 127,
                "dip_switch_2": 0,
                "log_level": "debug"
            }"#,
        )
        .unwrap();
        assert_eq!(config.board, Board::SearchAndRescue);
        assert_eq!(config.dip_switch_1, 0x7f);
        assert_eq!(config.dip_switch_2, 0);
        assert_eq!(config.log_level().unwrap(), Some(LogLevel::Debug));
    }

    #[test]
    fn test_bad_configs() {
        assert!(matches!(
            SessionConfig::from_json(r#"{ "board": "galaga" }"#),
            Err(Snk68Error::Config(_))
        ));
        assert!(matches!(
            SessionConfig::from_json("{}"),
            Err(Snk68Error::Config(_))
        ));
        let mut config = SessionConfig::new(Board::Pow);
        config.log_level = Some("loud".to_string());
        assert!(matches!(config.log_level(), Err(Snk68Error::LogLevel(_))));
    }

    #[test]
    fn test_save_load() {
        let path = std::env::temp_dir().join("snk68_session_config_test.json");
        let mut config = SessionConfig::new(Board::StreetSmart);
        config.dip_switch_2 = 0x3c;
        config.save(&path).expect("Failed to save");

        let loaded = SessionConfig::load(&path).expect("Failed to load");
        assert_eq!(loaded, config);
        assert!(!config.to_json().unwrap().contains("log_level"));

        fs::remove_file(path).ok();
    }
}
