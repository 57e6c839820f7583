use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::storage::DEFAULT_LIST_LIMIT;

pub const DEFAULT_APP_NAME: &str = "itemdesk";
pub const DEFAULT_PORT: u16 = 4317;
pub const DEFAULT_UI_DIR: &str = "ui/dist";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ItemdeskConfig {
    pub app_name: Option<String>,
    pub data_dir: Option<String>,
    pub database: Option<String>,
    pub list_limit: Option<usize>,
    pub port: Option<u16>,
    pub ui_dir: Option<String>,
}

impl ItemdeskConfig {
    pub fn app_name(&self) -> &str {
        self.app_name.as_deref().unwrap_or(DEFAULT_APP_NAME)
    }

    /// Per-installation data directory: `data_dir` if set, otherwise the
    /// platform data directory joined with the app name.
    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir(self.app_name()),
        }
    }

    /// Database file: `database` if set, otherwise `<data_dir>/<app_name>.db`
    pub fn database_path(&self) -> PathBuf {
        match &self.database {
            Some(db) => PathBuf::from(db),
            None => default_database_path_in(&self.data_dir(), self.app_name()),
        }
    }

    pub fn list_limit(&self) -> usize {
        self.list_limit.unwrap_or(DEFAULT_LIST_LIMIT)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn ui_dir(&self) -> PathBuf {
        PathBuf::from(self.ui_dir.as_deref().unwrap_or(DEFAULT_UI_DIR))
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("itemdesk.toml")
}

pub fn default_data_dir(app_name: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(app_name)
}

pub fn default_database_path_in(base: &Path, app_name: &str) -> PathBuf {
    base.join(format!("{}.db", app_name))
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<ItemdeskConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ItemdeskConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &ItemdeskConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ItemdeskConfig::default();
        assert_eq!(config.app_name(), "itemdesk");
        assert_eq!(config.list_limit(), 10);
        assert_eq!(config.port(), DEFAULT_PORT);
        assert!(config.data_dir().ends_with("itemdesk"));
        assert!(config.database_path().ends_with("itemdesk/itemdesk.db"));
    }

    #[test]
    fn test_database_named_after_app() {
        let config = ItemdeskConfig {
            app_name: Some("Notes".to_string()),
            data_dir: Some("/tmp/notes-data".to_string()),
            ..Default::default()
        };
        assert_eq!(config.database_path(), PathBuf::from("/tmp/notes-data/Notes.db"));
    }

    #[test]
    fn test_explicit_database_wins() {
        let config = ItemdeskConfig {
            data_dir: Some("/ignored".to_string()),
            database: Some("custom.db".to_string()),
            ..Default::default()
        };
        assert_eq!(config.database_path(), PathBuf::from("custom.db"));
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("itemdesk.toml");
        let config = ItemdeskConfig {
            app_name: Some("demo".to_string()),
            list_limit: Some(25),
            ..Default::default()
        };

        write_config(&path, &config, false).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), Some(config.clone()));

        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.toml"))).unwrap().is_none());
    }
}
