use crate::session::GameDuration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Round length in seconds; must be one of 15, 30 or 60.
    pub duration_secs: u64,
    /// Base URL of the results backend, if any.
    pub backend_url: Option<String>,
    /// Custom corpus; the built-in sample phrases are used when empty.
    pub phrases: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration_secs: GameDuration::default().secs(),
            backend_url: None,
            phrases: vec![],
        }
    }
}

impl Config {
    /// The configured duration, rejected (not coerced) when outside the
    /// enumerated set.
    pub fn duration(&self) -> Result<GameDuration, crate::session::GameError> {
        GameDuration::try_from(self.duration_secs)
    }

    /// Duration for a file-sourced config: an out-of-set value is rejected
    /// back to the default round length instead of aborting the game.
    pub fn duration_or_default(&self) -> GameDuration {
        self.duration().unwrap_or_default()
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "blitztype") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("blitztype_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::session::GameError;
    use tempfile::tempdir;

    #[test]
    fn defaults_survive_a_disk_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn custom_settings_survive_a_disk_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config {
            duration_secs: 60,
            backend_url: Some("http://localhost:8000".into()),
            phrases: vec!["custom phrase".into()],
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn out_of_set_duration_is_rejected() {
        let cfg = Config {
            duration_secs: 45,
            ..Config::default()
        };
        assert_matches!(cfg.duration(), Err(GameError::InvalidDuration(45)));
        assert_matches!(Config::default().duration(), Ok(GameDuration::Medium));
    }

    #[test]
    fn file_with_out_of_set_duration_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"duration_secs":45,"backend_url":null,"phrases":[]}"#,
        )
        .unwrap();

        let loaded = FileConfigStore::with_path(&path).load();
        // the file parses fine, only the duration is out of set
        assert_eq!(loaded.duration_secs, 45);
        assert_eq!(loaded.duration_or_default(), GameDuration::default());
    }
}
