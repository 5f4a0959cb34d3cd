use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use timeline_engine::{HarvestSettings, SessionSettings};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Contents of a `--config` file. Every field is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub harvest: HarvestSettings,
    pub session: SessionSettings,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = ron::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        engine_info!("Loaded settings from {:?}", path);
        Ok(config)
    }

    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("harvest.ron");
        fs::write(
            &path,
            r#"(
                harvest: (retry_ceiling: 5, output_dir: "out/tweets"),
                session: (headless: true),
            )"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();

        assert_eq!(config.harvest.retry_ceiling, 5);
        assert_eq!(config.harvest.output_dir, PathBuf::from("out/tweets"));
        assert_eq!(config.harvest.scroll_steps, HarvestSettings::default().scroll_steps);
        assert!(config.session.headless);
        assert_eq!(config.session.user_agents, SessionSettings::default().user_agents);
    }

    #[test]
    fn written_defaults_load_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("defaults.ron");
        fs::write(&path, AppConfig::default().to_ron().unwrap()).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load(&temp.path().join("absent.ron"));
        assert!(matches!(result, Err(SettingsError::Io { .. })));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.ron");
        fs::write(&path, "(harvest: (retry_ceiling: \"many\"))").unwrap();

        let result = AppConfig::load(&path);
        assert!(matches!(result, Err(SettingsError::Parse { .. })));
    }
}
