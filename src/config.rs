//! Runtime configuration.
//!
//! Layered: platform defaults, then `config.toml` if present, then CLI flags.
//! Paths not set explicitly are derived from `data_dir`, so pointing
//! `--data-dir` somewhere else moves the database and image archive together.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::history::DEFAULT_HISTORY_KEY;
use crate::maps::DEFAULT_SEARCH_TERM;
use crate::platform::{self, Platform};

const DB_FILE: &str = "retinai.db";
const IMAGES_DIR: &str = "images";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub images_dir: PathBuf,
    pub export_dir: PathBuf,
    pub history_key: String,
    pub share: bool,
    pub search_term: String,
    pub verbose: bool,
    pub platform: Platform,
}

/// Shape of config.toml, every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub data_dir: Option<PathBuf>,
    pub images_dir: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub history_key: Option<String>,
    pub share: Option<bool>,
    pub search_term: Option<String>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::parse(&text)
    }
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => match platform::config_file() {
                Some(path) if path.exists() => FileConfig::load(&path)?,
                _ => FileConfig::default(),
            },
        };

        let mut config = Config::resolve(file, cli.data_dir.clone());
        config.verbose = cli.verbose;
        Ok(config)
    }

    /// `data_dir_override` wins over the file's `data_dir`.
    pub fn resolve(file: FileConfig, data_dir_override: Option<PathBuf>) -> Self {
        let data_dir = data_dir_override
            .or(file.data_dir)
            .unwrap_or_else(platform::data_dir);

        Config {
            db_path: data_dir.join(DB_FILE),
            images_dir: file.images_dir.unwrap_or_else(|| data_dir.join(IMAGES_DIR)),
            export_dir: file.export_dir.unwrap_or_else(platform::cache_dir),
            history_key: file.history_key.unwrap_or_else(|| DEFAULT_HISTORY_KEY.to_string()),
            share: file.share.unwrap_or(true),
            search_term: file.search_term.unwrap_or_else(|| DEFAULT_SEARCH_TERM.to_string()),
            verbose: false,
            platform: platform::detect(),
            data_dir,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::resolve(FileConfig::default(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_data_dir() {
        let config = Config::resolve(FileConfig::default(), Some(PathBuf::from("/srv/retinai")));

        assert_eq!(config.db_path, PathBuf::from("/srv/retinai/retinai.db"));
        assert_eq!(config.images_dir, PathBuf::from("/srv/retinai/images"));
        assert_eq!(config.history_key, "scan_history");
        assert_eq!(config.search_term, "ophthalmologist near me");
        assert!(config.share);
    }

    #[test]
    fn file_values_apply() {
        let file = FileConfig::parse(
            r#"
            data_dir = "/data"
            images_dir = "/media/captures"
            export_dir = "/tmp/exports"
            history_key = "clinic_a"
            share = false
            "#,
        )
        .unwrap();

        let config = Config::resolve(file, None);

        assert_eq!(config.db_path, PathBuf::from("/data/retinai.db"));
        assert_eq!(config.images_dir, PathBuf::from("/media/captures"));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/exports"));
        assert_eq!(config.history_key, "clinic_a");
        assert!(!config.share);
    }

    #[test]
    fn cli_data_dir_beats_file() {
        let file = FileConfig::parse(r#"data_dir = "/data""#).unwrap();
        let config = Config::resolve(file, Some(PathBuf::from("/override")));

        assert_eq!(config.data_dir, PathBuf::from("/override"));
        assert_eq!(config.images_dir, PathBuf::from("/override/images"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = FileConfig::parse("colour = \"blue\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
