// ⚙️ Configuration - where the database and logs live
//
// GRADE_CALCULATOR_HOME overrides the data directory (tests, portable setups).
// GRADE_CALCULATOR_LOG sets the tracing filter (default "info").

use directories::ProjectDirs;
use std::path::PathBuf;
use thiserror::Error;

pub const HOME_ENV: &str = "GRADE_CALCULATOR_HOME";
pub const LOG_ENV: &str = "GRADE_CALCULATOR_LOG";
pub const APP_NAME: &str = "grade-calculator";
pub const DB_FILE_NAME: &str = "grade-calculator.db";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No suitable data directory available for application files")]
    NoDataDir,

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_filter: String,
}

impl AppConfig {
    /// Resolve from process environment, falling back to the OS data dir
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = match lookup(HOME_ENV).filter(|v| !v.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => ProjectDirs::from("", "", APP_NAME)
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or(ConfigError::NoDataDir)?,
        };

        let log_filter = lookup(LOG_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self::with_data_dir(data_dir, log_filter))
    }

    pub fn with_data_dir(data_dir: PathBuf, log_filter: String) -> Self {
        AppConfig {
            db_path: data_dir.join(DB_FILE_NAME),
            log_dir: data_dir.join("logs"),
            data_dir,
            log_filter,
        }
    }

    /// Create the data and log directories if missing
    pub fn ensure_dirs(&self) -> Result<(), ConfigError> {
        for path in [&self.data_dir, &self.log_dir] {
            std::fs::create_dir_all(path).map_err(|source| ConfigError::CreateDir {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_home_override() {
        let config = AppConfig::from_lookup(lookup_from(&[(HOME_ENV, "/tmp/grades")])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/grades"));
        assert_eq!(config.db_path, PathBuf::from("/tmp/grades/grade-calculator.db"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/grades/logs"));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_log_filter_override() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (HOME_ENV, "/tmp/grades"),
            (LOG_ENV, "grade_calculator=debug"),
        ]))
        .unwrap();
        assert_eq!(config.log_filter, "grade_calculator=debug");
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let config = AppConfig::from_lookup(lookup_from(&[(HOME_ENV, "/tmp/grades"), (LOG_ENV, "  ")]))
            .unwrap();
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_ensure_dirs() {
        let base = tempfile::tempdir().unwrap();
        let config = AppConfig::with_data_dir(base.path().join("nested"), "info".to_string());
        config.ensure_dirs().unwrap();
        assert!(config.data_dir.is_dir());
        assert!(config.log_dir.is_dir());
    }
}
